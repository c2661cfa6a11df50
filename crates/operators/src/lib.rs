//! `operators` crate: the `Operator` contract and the built-in image operators.
//!
//! Every operator, built-in or embedder-supplied, implements [`Operator`] and
//! is described by an [`OperatorDescriptor`]. The engine crate registers them
//! and dispatches execution through the trait object.

pub mod builtin;
pub mod cache;
pub mod channel;
pub mod descriptor;
pub mod error;
pub mod mock;
pub mod params;
pub mod traits;

pub use cache::ResourceCache;
pub use channel::{image_outputs, Channel, ChannelValue, PortMap};
pub use descriptor::{OperatorDescriptor, ParameterKind, ParameterSchema, ParameterSpec};
pub use error::OperatorError;
pub use params::{ParamValue, Parameters};
pub use traits::{require_image, Operator};
