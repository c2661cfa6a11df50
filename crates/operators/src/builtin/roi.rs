//! Region-of-interest extraction.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::descriptor::{OperatorDescriptor, ParameterSpec};
use crate::{image_outputs, require_image, Channel, ChannelValue, Operator, OperatorError, Parameters, PortMap};

pub const ID: &str = "roi_extraction";

const MARKER: Rgb<u8> = Rgb([0, 255, 0]);

pub fn descriptor() -> OperatorDescriptor {
    OperatorDescriptor::new(ID, "ROI extraction", "Mark and crop a rectangular region of interest")
        .outputs([Channel::Image, Channel::Output, Channel::Roi])
        .param(ParameterSpec::number("x", "X", 0.0).min(0.0))
        .param(ParameterSpec::number("y", "Y", 0.0).min(0.0))
        .param(ParameterSpec::number("width", "Width", 100.0).min(1.0))
        .param(ParameterSpec::number("height", "Height", 100.0).min(1.0))
}

pub struct RoiExtraction;

impl Operator for RoiExtraction {
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError> {
        let img = require_image(inputs, Channel::Image)?;
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Ok(image_outputs(img.clone()));
        }

        // Clamp the requested rectangle into the image before narrowing.
        let x = params.integer("x")?.clamp(0, i64::from(w) - 1) as u32;
        let y = params.integer("y")?.clamp(0, i64::from(h) - 1) as u32;
        let width = params.integer("width")?.clamp(1, i64::from(w - x)) as u32;
        let height = params.integer("height")?.clamp(1, i64::from(h - y)) as u32;

        let roi = image::imageops::crop_imm(img, x, y, width, height).to_image();

        let mut marked = img.clone();
        draw_hollow_rect_mut(&mut marked, Rect::at(x as i32, y as i32).of_size(width, height), MARKER);
        if width > 2 && height > 2 {
            let inner = Rect::at(x as i32 + 1, y as i32 + 1).of_size(width - 2, height - 2);
            draw_hollow_rect_mut(&mut marked, inner, MARKER);
        }

        let mut out = image_outputs(marked);
        out.insert(Channel::Roi, ChannelValue::image(roi));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::inputs;
    use serde_json::json;

    fn run(img: RgbImage, raw: serde_json::Value) -> PortMap {
        let params = Parameters::resolve(&descriptor().parameters, raw.as_object().unwrap()).unwrap();
        RoiExtraction.execute(&inputs(img), &params).unwrap()
    }

    #[test]
    fn crops_and_marks_region() {
        let img = RgbImage::from_pixel(20, 20, Rgb([9, 9, 9]));
        let out = run(img, json!({ "x": 2, "y": 3, "width": 8, "height": 8 }));

        let roi = out[&Channel::Roi].as_image().unwrap();
        assert_eq!(roi.dimensions(), (8, 8));

        let marked = out[&Channel::Image].as_image().unwrap();
        assert_eq!(*marked.get_pixel(2, 3), MARKER);
        assert_eq!(*marked.get_pixel(3, 4), MARKER);
        assert_eq!(*marked.get_pixel(5, 6), Rgb([9, 9, 9]));
        assert_eq!(*marked.get_pixel(15, 15), Rgb([9, 9, 9]));
    }

    #[test]
    fn rectangle_is_clamped_to_image() {
        let img = RgbImage::from_pixel(10, 8, Rgb([0, 0, 0]));
        let out = run(img, json!({ "x": 50, "y": 6, "width": 100, "height": 100 }));
        let roi = out[&Channel::Roi].as_image().unwrap();
        assert_eq!(roi.dimensions(), (1, 2));
    }

    #[test]
    fn oversized_width_and_height_are_clamped_not_wrapped() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let out = run(img, json!({ "x": 3, "y": 4, "width": 4294967296u64, "height": 4294967297u64 }));
        let roi = out[&Channel::Roi].as_image().unwrap();
        assert_eq!(roi.dimensions(), (7, 6));
    }

    #[test]
    fn oversized_origin_is_clamped_to_last_pixel() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let out = run(img, json!({ "x": 4294967298u64, "y": 0, "width": 1, "height": 1 }));

        let roi = out[&Channel::Roi].as_image().unwrap();
        assert_eq!(roi.dimensions(), (1, 1));
        let marked = out[&Channel::Image].as_image().unwrap();
        assert_eq!(*marked.get_pixel(9, 0), MARKER);
        assert_eq!(*marked.get_pixel(2, 0), Rgb([0, 0, 0]));
    }
}
