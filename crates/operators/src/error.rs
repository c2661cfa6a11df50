//! Operator-level error type.

use thiserror::Error;

use crate::Channel;

/// Errors returned by an operator's `execute` method.
///
/// Every variant is a domain failure the engine wraps with the offending node
/// id; anything else (a panic, a poisoned lock) is a bug and is not caught.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// A port the operator needs was not bound by the executor.
    #[error("missing input on channel '{0}'")]
    MissingInput(Channel),

    /// A channel was bound, but with the wrong kind of value.
    #[error("channel '{channel}' expected {expected}")]
    WrongValueKind {
        channel: Channel,
        expected: &'static str,
    },

    /// A parameter value failed schema validation.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The transform itself could not be applied.
    #[error("{0}")]
    Failed(String),
}

impl OperatorError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
