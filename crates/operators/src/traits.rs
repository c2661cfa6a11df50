//! The `Operator` trait: the contract every image operator must fulfil.

use crate::{Channel, OperatorError, Parameters, PortMap};

/// A pure image transform.
///
/// Implementations are shared by every in-flight workflow run, so they must
/// not keep per-call state. Expensive reusable resources belong in a
/// [`ResourceCache`](crate::ResourceCache) owned by the operator.
pub trait Operator: Send + Sync {
    /// Run the transform on the bound `inputs` with schema-resolved `params`
    /// and return this node's outputs.
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError>;
}

/// Fetch the image bound on `channel`, failing with a domain error when it is
/// absent or carries text.
pub fn require_image<'a>(
    inputs: &'a PortMap,
    channel: Channel,
) -> Result<&'a image::RgbImage, OperatorError> {
    match inputs.get(&channel) {
        Some(value) => value
            .as_image()
            .map(|img| &**img)
            .ok_or(OperatorError::WrongValueKind {
                channel,
                expected: "an image",
            }),
        None => Err(OperatorError::MissingInput(channel)),
    }
}
