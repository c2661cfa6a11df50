//! DAG validation and scheduling: run these before executing a workflow.
//!
//! [`validate`] enforces, in this order, failing on the first violation:
//! 1. Node IDs must be unique within the submission.
//! 2. Every edge must reference existing node IDs (both `source` and `target`).
//! 3. No edge may connect a node to itself.
//! 4. Every node's operator must be registered.
//!
//! [`schedule`] then produces a topological execution order, rejecting cycles.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Edge, Node, WorkflowGraph, WorkflowSubmission, DEFAULT_SOURCE_PORT, DEFAULT_TARGET_PORT};
use crate::{EngineError, OperatorRegistry};

/// Validate a raw submission and build the typed graph.
///
/// Parameters are deliberately left unchecked; they are resolved against the
/// operator schema when the node executes.
///
/// # Errors
/// - [`EngineError::DuplicateNode`] if two nodes share an ID.
/// - [`EngineError::DanglingEdge`] if an edge references a missing node.
/// - [`EngineError::SelfLoop`] if an edge's source and target coincide.
/// - [`EngineError::OperatorNotFound`] if a node's operator is not registered.
pub fn validate(
    submission: &WorkflowSubmission,
    registry: &OperatorRegistry,
) -> Result<WorkflowGraph, EngineError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut index: HashMap<String, usize> = HashMap::with_capacity(submission.nodes.len());
    for (i, node) in submission.nodes.iter().enumerate() {
        if index.insert(node.id.clone(), i).is_some() {
            return Err(EngineError::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
    }

    // -----------------------------------------------------------------------
    // 2. Validate edge endpoints
    // -----------------------------------------------------------------------
    for edge in &submission.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !index.contains_key(endpoint) {
                return Err(EngineError::DanglingEdge {
                    edge: edge.to_string(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // 3. Reject self-loops
    // -----------------------------------------------------------------------
    if let Some(edge) = submission.edges.iter().find(|e| e.source == e.target) {
        return Err(EngineError::SelfLoop {
            node_id: edge.source.clone(),
        });
    }

    // -----------------------------------------------------------------------
    // 4. Resolve operators
    // -----------------------------------------------------------------------
    for node in &submission.nodes {
        if !registry.contains(&node.operator) {
            return Err(EngineError::OperatorNotFound {
                node_id: Some(node.id.clone()),
                operator_id: node.operator.clone(),
            });
        }
    }

    let nodes = submission
        .nodes
        .iter()
        .map(|n| Node {
            id: n.id.clone(),
            operator_id: n.operator.clone(),
            parameters: n.data.parameters.clone(),
        })
        .collect();

    let edges = submission
        .edges
        .iter()
        .map(|e| Edge {
            source: e.source.clone(),
            source_port: e.source_handle.unwrap_or(DEFAULT_SOURCE_PORT),
            target: e.target.clone(),
            target_port: e.target_handle.unwrap_or(DEFAULT_TARGET_PORT),
            from: index[&e.source],
            to: index[&e.target],
        })
        .collect();

    Ok(WorkflowGraph::new(nodes, edges, index))
}

/// Return the graph's nodes in topological execution order (Kahn's algorithm).
///
/// Ties are broken deterministically: nodes with no incoming edges are
/// seeded in submission order, and successors are enqueued in the order
/// their edges were submitted.
///
/// # Errors
/// [`EngineError::Cycle`] listing, in submission order, every node that could
/// not be placed.
pub fn schedule(graph: &WorkflowGraph) -> Result<Vec<String>, EngineError> {
    let nodes = graph.nodes();

    // Build adjacency list and in-degree table, indexed by submission position.
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut in_degree: Vec<usize> = vec![0; nodes.len()];
    for edge in graph.edges() {
        successors[edge.from].push(edge.to);
        in_degree[edge.to] += 1;
    }

    // Seed the queue with nodes that have no incoming edges.
    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted: Vec<String> = Vec::with_capacity(nodes.len());

    while let Some(current) = queue.pop_front() {
        sorted.push(nodes[current].id.clone());
        for &next in &successors[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    // If we didn't visit every node the graph contains a cycle.
    if sorted.len() != nodes.len() {
        let placed: HashSet<&str> = sorted.iter().map(String::as_str).collect();
        let remaining = nodes
            .iter()
            .filter(|n| !placed.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        return Err(EngineError::Cycle { remaining });
    }

    Ok(sorted)
}
