//! Workflow graph model.
//!
//! [`WorkflowSubmission`] is the raw node/edge description as submitted by the
//! editor. [`WorkflowGraph`] is the validated form produced by
//! [`validate`](crate::dag::validate); it exists for one execution and is then
//! dropped.

use std::collections::HashMap;
use std::fmt;

use operators::Channel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Raw submission
// ---------------------------------------------------------------------------

/// Per-node payload; only `parameters` is read, other editor fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A node as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    /// Unique identifier within this submission (referenced by edges).
    pub id: String,
    /// Operator id; must resolve in the registry.
    #[serde(rename = "type")]
    pub operator: String,
    #[serde(default)]
    pub data: NodeData,
}

impl RawNode {
    pub fn new(id: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operator: operator.into(),
            data: NodeData::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.data.parameters = parameters;
        self
    }
}

/// A directed edge as submitted. Handles are optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<Channel>,
    #[serde(default)]
    pub target_handle: Option<Channel>,
}

impl RawEdge {
    /// Edge using the default `output` -> `image` handles.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn handles(mut self, source: Channel, target: Channel) -> Self {
        self.source_handle = Some(source);
        self.target_handle = Some(target);
        self
    }
}

impl fmt::Display for RawEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.source, self.target)
    }
}

/// The node/edge part of an execution request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSubmission {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl WorkflowSubmission {
    pub fn new(nodes: Vec<RawNode>, edges: Vec<RawEdge>) -> Self {
        Self { nodes, edges }
    }
}

// ---------------------------------------------------------------------------
// Validated graph
// ---------------------------------------------------------------------------

/// Port a source handle falls back to when the edge does not name one.
pub const DEFAULT_SOURCE_PORT: Channel = Channel::Output;
/// Port a target handle falls back to when the edge does not name one.
pub const DEFAULT_TARGET_PORT: Channel = Channel::Image;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub operator_id: String,
    /// Unchecked until the node executes.
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub source_port: Channel,
    pub target: String,
    pub target_port: Channel,
    // Positions of the endpoints in submission order.
    pub(crate) from: usize,
    pub(crate) to: usize,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}.{}' -> '{}.{}'",
            self.source, self.source_port, self.target, self.target_port
        )
    }
}

/// A structurally valid workflow: unique node ids, no dangling edges, no
/// self-loops, every operator registered. It may still contain a cycle.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl WorkflowGraph {
    pub(crate) fn new(nodes: Vec<Node>, edges: Vec<Edge>, index: HashMap<String, usize>) -> Self {
        Self { nodes, edges, index }
    }

    /// Nodes in submission order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in submission order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Edges ending at `id`, in submission order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Nodes with no outgoing edge, in submission order.
    pub fn sinks(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.edges.iter().any(|e| e.from == *i))
            .map(|(_, n)| n)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
