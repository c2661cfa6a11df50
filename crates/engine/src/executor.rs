//! Workflow execution engine.
//!
//! `WorkflowExecutor` is the central orchestrator:
//! 1. Validates the submission and produces a topological ordering.
//! 2. Iterates through nodes in order, one operator call at a time.
//! 3. Binds each node's inputs from upstream outputs, or from the root input
//!    when the node has no incoming edges.
//! 4. Aborts on the first operator failure, discarding every output so far.
//! 5. Hands the per-node outputs to the result resolver.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use operators::{Channel, ChannelValue, Parameters, PortMap};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::dag::{schedule, validate};
use crate::models::{Node, WorkflowGraph, WorkflowSubmission};
use crate::resolver::{resolve, FinalOutput};
use crate::{EngineError, OperatorRegistry};

/// Port the root input is bound to for nodes without incoming edges.
pub const ROOT_INPUT_PORT: Channel = Channel::Image;

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Outputs produced so far in one run, keyed by node id.
///
/// Owned by a single `execute` call and never shared between runs.
#[derive(Debug, Default)]
struct ExecutionContext {
    outputs: HashMap<String, PortMap>,
}

impl ExecutionContext {
    /// Bind every incoming edge of `node` to the producer's output on the
    /// edge's source port. Later edges overwrite earlier ones on the same port.
    fn bind_inputs(&self, graph: &WorkflowGraph, node: &Node, root: &Arc<RgbImage>) -> PortMap {
        let mut inputs = PortMap::new();
        let mut has_incoming = false;

        for edge in graph.incoming(&node.id) {
            has_incoming = true;
            let produced = self
                .outputs
                .get(&edge.source)
                .and_then(|ports| ports.get(&edge.source_port));
            match produced {
                Some(value) => {
                    if inputs.insert(edge.target_port, value.clone()).is_some() {
                        warn!(node_id = %node.id, port = %edge.target_port, "port bound by more than one edge, keeping the last");
                    }
                }
                None => warn!(%edge, "producer emitted nothing on the source port, leaving it unbound"),
            }
        }

        if !has_incoming {
            inputs.insert(ROOT_INPUT_PORT, ChannelValue::Image(Arc::clone(root)));
        }
        inputs
    }
}

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// Stateless orchestrator over a shared, read-only registry.
///
/// Cheap to construct; build one per request or share one across requests.
pub struct WorkflowExecutor<'r> {
    registry: &'r OperatorRegistry,
}

impl<'r> WorkflowExecutor<'r> {
    pub fn new(registry: &'r OperatorRegistry) -> Self {
        Self { registry }
    }

    /// Validate, schedule, execute and resolve a workflow.
    ///
    /// # Errors
    /// Returns the first `EngineError` raised by any stage; no partial result
    /// is ever returned.
    #[instrument(skip_all, fields(execution_id = %Uuid::new_v4(), nodes = submission.nodes.len()))]
    pub fn run(
        &self,
        submission: &WorkflowSubmission,
        root_input: Arc<RgbImage>,
    ) -> Result<FinalOutput, EngineError> {
        let graph = validate(submission, self.registry)?;
        let order = schedule(&graph)?;
        info!(
            "DAG validated: executing {} nodes in order: {:?}",
            order.len(),
            order
        );

        let outputs = self.execute(&graph, &order, root_input)?;
        let result = resolve(&graph, &outputs, &order)?;

        info!(sink = %result.node_id, "workflow succeeded");
        Ok(result)
    }

    /// Execute `order` over `graph`, returning every node's outputs.
    ///
    /// `order` must be topological for `graph` (as produced by
    /// [`schedule`](crate::dag::schedule)); each producer is then guaranteed to
    /// have run before its consumers.
    ///
    /// # Errors
    /// [`EngineError::OperatorExecution`] for the first node whose parameters
    /// do not resolve or whose operator fails. Remaining nodes are not run.
    pub fn execute(
        &self,
        graph: &WorkflowGraph,
        order: &[String],
        root_input: Arc<RgbImage>,
    ) -> Result<HashMap<String, PortMap>, EngineError> {
        let mut ctx = ExecutionContext::default();

        for node_id in order {
            let node = graph
                .node(node_id)
                .ok_or_else(|| EngineError::UnknownNode(node_id.clone()))?;

            let entry = self.registry.lookup(&node.operator_id).map_err(|_| {
                EngineError::OperatorNotFound {
                    node_id: Some(node.id.clone()),
                    operator_id: node.operator_id.clone(),
                }
            })?;

            let inputs = ctx.bind_inputs(graph, node, &root_input);
            debug!(
                node_id = %node.id,
                ports = ?inputs.keys().collect::<Vec<_>>(),
                "inputs bound"
            );

            let started = Instant::now();
            let outcome = Parameters::resolve(&entry.descriptor.parameters, &node.parameters)
                .and_then(|params| entry.implementation.execute(&inputs, &params));

            match outcome {
                Ok(outputs) => {
                    info!(
                        node_id = %node.id,
                        operator = %node.operator_id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "node succeeded"
                    );
                    ctx.outputs.insert(node.id.clone(), outputs);
                }
                Err(cause) => {
                    error!(node_id = %node.id, operator = %node.operator_id, "node failed: {}", cause);
                    return Err(EngineError::OperatorExecution {
                        node_id: node.id.clone(),
                        cause,
                    });
                }
            }
        }

        Ok(ctx.outputs)
    }
}
