//! Edge detection: canny, sobel magnitude and laplacian.

use image::{GrayImage, Luma};

use super::{gray_to_rgb, to_gray};
use crate::descriptor::{OperatorDescriptor, ParameterSpec};
use crate::{image_outputs, require_image, Channel, Operator, OperatorError, Parameters, PortMap};

pub const ID: &str = "edge_detection";

pub fn descriptor() -> OperatorDescriptor {
    OperatorDescriptor::new(ID, "Edge detection", "Detect edges in an image")
        .param(ParameterSpec::select("method", "Method", ["canny", "sobel", "laplacian"], "canny"))
        .param(ParameterSpec::number("threshold1", "Threshold 1", 50.0).min(0.0).max(255.0))
        .param(ParameterSpec::number("threshold2", "Threshold 2", 150.0).min(0.0).max(255.0))
}

pub struct EdgeDetection;

impl Operator for EdgeDetection {
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError> {
        let img = require_image(inputs, Channel::Image)?;
        let gray = to_gray(img);

        let edges = match params.choice("method")? {
            "canny" => {
                let t1 = params.integer("threshold1")? as f32;
                let t2 = params.integer("threshold2")? as f32;
                canny(&gray, t1, t2)
            }
            "sobel" => sobel(&gray),
            "laplacian" => laplacian(&gray),
            other => return Err(OperatorError::invalid_parameter("method", format!("unsupported '{other}'"))),
        };
        Ok(image_outputs(gray_to_rgb(edges)))
    }
}

/// Canny with hysteresis thresholds given in either order.
pub(crate) fn canny(gray: &GrayImage, t1: f32, t2: f32) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    imageproc::edges::canny(gray, t1.min(t2), t1.max(t2))
}

fn sobel(gray: &GrayImage) -> GrayImage {
    let magnitude = imageproc::gradients::sobel_gradients(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([magnitude.get_pixel(x, y).0[0].min(255) as u8])
    })
}

fn laplacian(gray: &GrayImage) -> GrayImage {
    let response = imageproc::filter::laplacian_filter(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([response.get_pixel(x, y).0[0].unsigned_abs().min(255) as u8])
    })
}
