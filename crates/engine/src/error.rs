//! Engine-level error types.

use std::fmt;

use operators::OperatorError;
use serde::Serialize;
use thiserror::Error;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Registry,
    Validation,
    Scheduling,
    Execution,
    Resolution,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Registry => "registry",
            Stage::Validation => "validation",
            Stage::Scheduling => "scheduling",
            Stage::Execution => "execution",
            Stage::Resolution => "resolution",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the workflow engine (registry, validation, scheduling,
/// execution and result resolution).
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Registry errors ------

    /// An operator id was registered twice.
    #[error("operator '{0}' is already registered")]
    DuplicateOperator(String),

    /// An operator id does not resolve in the registry. `node_id` is set when
    /// the lookup was made on behalf of a node.
    #[error("operator '{operator_id}' is not registered")]
    OperatorNotFound {
        node_id: Option<String>,
        operator_id: String,
    },

    // ------ Validation errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{node_id}'")]
    DuplicateNode { node_id: String },

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("edge {edge} references unknown node '{missing}'")]
    DanglingEdge { edge: String, missing: String },

    /// An edge connects a node to itself.
    #[error("node '{node_id}' has an edge to itself")]
    SelfLoop { node_id: String },

    // ------ Scheduling errors ------

    /// Topological sort could not place these nodes; at least one cycle
    /// runs through them.
    #[error("workflow graph contains a cycle through {remaining:?}")]
    Cycle { remaining: Vec<String> },

    // ------ Execution errors ------

    /// The execution order named a node the graph does not contain.
    #[error("scheduled node '{0}' is not part of the graph")]
    UnknownNode(String),

    /// An operator failed; the run was aborted at this node.
    #[error("node '{node_id}' failed: {cause}")]
    OperatorExecution {
        node_id: String,
        #[source]
        cause: OperatorError,
    },

    // ------ Resolution errors ------

    /// The selected sink produced no image on `image` or `output`.
    #[error("node '{node_id}' produced no image output")]
    NoOutput { node_id: String },

    /// The workflow has no nodes.
    #[error("workflow has no nodes")]
    EmptyGraph,
}

impl EngineError {
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::DuplicateOperator(_) => Stage::Registry,
            EngineError::OperatorNotFound { node_id, .. } => {
                if node_id.is_some() {
                    Stage::Validation
                } else {
                    Stage::Registry
                }
            }
            EngineError::DuplicateNode { .. }
            | EngineError::DanglingEdge { .. }
            | EngineError::SelfLoop { .. } => Stage::Validation,
            EngineError::Cycle { .. } => Stage::Scheduling,
            EngineError::UnknownNode(_) | EngineError::OperatorExecution { .. } => Stage::Execution,
            EngineError::NoOutput { .. } | EngineError::EmptyGraph => Stage::Resolution,
        }
    }

    /// The node the failure is attributed to, when there is exactly one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            EngineError::OperatorNotFound { node_id, .. } => node_id.as_deref(),
            EngineError::DuplicateNode { node_id }
            | EngineError::SelfLoop { node_id }
            | EngineError::OperatorExecution { node_id, .. }
            | EngineError::NoOutput { node_id } => Some(node_id),
            EngineError::UnknownNode(node_id) => Some(node_id),
            EngineError::DuplicateOperator(_)
            | EngineError::DanglingEdge { .. }
            | EngineError::Cycle { .. }
            | EngineError::EmptyGraph => None,
        }
    }

    /// True for failures raised by an operator rather than by the shape of
    /// the submitted workflow.
    pub fn is_operator_failure(&self) -> bool {
        matches!(self, EngineError::OperatorExecution { .. })
    }
}
