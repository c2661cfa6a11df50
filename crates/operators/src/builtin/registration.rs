//! Image registration: rotation and uniform scaling about the image centre.

use image::Rgb;
use imageproc::geometric_transformations::{warp, Interpolation, Projection};

use crate::descriptor::{OperatorDescriptor, ParameterSpec};
use crate::{image_outputs, require_image, Channel, Operator, OperatorError, Parameters, PortMap};

pub const ID: &str = "image_registration";

const BORDER: Rgb<u8> = Rgb([255, 255, 255]);

pub fn descriptor() -> OperatorDescriptor {
    OperatorDescriptor::new(ID, "Image registration", "Rotate and scale an image about its centre")
        .param(ParameterSpec::number("angle", "Rotation angle", 0.0).min(-180.0).max(180.0))
        .param(ParameterSpec::number("scale", "Scale", 1.0).min(0.5).max(2.0).step(0.1))
}

pub struct ImageRegistration;

impl Operator for ImageRegistration {
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError> {
        let img = require_image(inputs, Channel::Image)?;
        let angle = params.number("angle")? as f32;
        let scale = params.number("scale")? as f32;

        if angle == 0.0 && scale == 1.0 {
            return Ok(image_outputs(img.clone()));
        }

        // Positive angles turn counter-clockwise on screen (y axis points down).
        let cx = (img.width() / 2) as f32;
        let cy = (img.height() / 2) as f32;
        let projection = Projection::translate(cx, cy)
            * Projection::rotate(-angle.to_radians())
            * Projection::scale(scale, scale)
            * Projection::translate(-cx, -cy);

        let result = warp(img, &projection, Interpolation::Bilinear, BORDER);
        Ok(image_outputs(result))
    }
}
