//! `MockOperator`: a test double for `Operator`.
//!
//! Useful in engine and API tests where a real image transform is either
//! unavailable or irrelevant.

use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};

use crate::descriptor::OperatorDescriptor;
use crate::{image_outputs, Channel, ChannelValue, Operator, OperatorError, Parameters, PortMap};

/// Behaviour injected into `MockOperator` at construction time.
pub enum MockBehaviour {
    /// Return a specific output mapping.
    ReturnPorts(PortMap),
    /// Republish the bound `image` input on `image` and `output`.
    Passthrough,
    /// Fail with the given error.
    Fail(OperatorError),
}

/// A mock operator that records every call it receives and returns a
/// programmer-specified result.
pub struct MockOperator {
    /// Label written to the shared journal on every call.
    pub name: String,
    pub behaviour: MockBehaviour,
    /// All inputs seen by this operator (in call order).
    pub calls: Arc<Mutex<Vec<PortMap>>>,
    /// Optional log shared between several mocks to observe global call order.
    pub journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockOperator {
    fn with_behaviour(name: impl Into<String>, behaviour: MockBehaviour) -> Self {
        Self {
            name: name.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    /// Always succeed with `image`/`output` set to a solid 1x1 image of `shade`.
    pub fn returning_shade(name: impl Into<String>, shade: u8) -> Self {
        Self::with_behaviour(name, MockBehaviour::ReturnPorts(image_outputs(solid(shade))))
    }

    pub fn returning(name: impl Into<String>, ports: PortMap) -> Self {
        Self::with_behaviour(name, MockBehaviour::ReturnPorts(ports))
    }

    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::with_behaviour(name, MockBehaviour::Passthrough)
    }

    pub fn failing(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_behaviour(name, MockBehaviour::Fail(OperatorError::Failed(msg.into())))
    }

    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// A permissive descriptor for registering this mock under `id`.
    pub fn descriptor(id: &str) -> OperatorDescriptor {
        OperatorDescriptor::new(id, id, "test double")
    }

    /// Number of times this operator has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Inputs of the `n`th call.
    pub fn call(&self, n: usize) -> PortMap {
        self.calls.lock().unwrap()[n].clone()
    }
}

impl Operator for MockOperator {
    fn execute(&self, inputs: &PortMap, _params: &Parameters) -> Result<PortMap, OperatorError> {
        self.calls.lock().unwrap().push(inputs.clone());
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(self.name.clone());
        }

        match &self.behaviour {
            MockBehaviour::ReturnPorts(ports) => Ok(ports.clone()),
            MockBehaviour::Passthrough => {
                let img = inputs
                    .get(&Channel::Image)
                    .cloned()
                    .ok_or(OperatorError::MissingInput(Channel::Image))?;
                let mut out = PortMap::new();
                out.insert(Channel::Image, img.clone());
                out.insert(Channel::Output, img);
                Ok(out)
            }
            MockBehaviour::Fail(err) => Err(err.clone()),
        }
    }
}

/// A 1x1 image whose single pixel is `(shade, shade, shade)`.
pub fn solid(shade: u8) -> RgbImage {
    RgbImage::from_pixel(1, 1, Rgb([shade, shade, shade]))
}

/// Shade of the top-left pixel of an image value, for tracing data flow in tests.
pub fn shade_of(value: &ChannelValue) -> Option<u8> {
    value.as_image().map(|img| img.get_pixel(0, 0).0[0])
}
