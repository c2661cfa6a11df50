//! `engine` crate: operator registry, graph validation, scheduling, execution
//! and result resolution.

pub mod dag;
pub mod error;
pub mod executor;
pub mod models;
pub mod registry;
pub mod resolver;

pub use dag::{schedule, validate};
pub use error::{EngineError, Stage};
pub use executor::WorkflowExecutor;
pub use models::{RawEdge, RawNode, WorkflowGraph, WorkflowSubmission};
pub use registry::{OperatorRegistry, RegisteredOperator};
pub use resolver::{resolve, FinalOutput};
