//! Binary segmentation by global threshold, canny edges, or a simplified
//! watershed (inverted Otsu threshold cleaned up by a morphological opening).

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;

use super::{edge_detection, gray_to_rgb, to_gray};
use crate::descriptor::{OperatorDescriptor, ParameterSpec};
use crate::{image_outputs, require_image, Channel, Operator, OperatorError, Parameters, PortMap};

pub const ID: &str = "image_segmentation";

pub fn descriptor() -> OperatorDescriptor {
    OperatorDescriptor::new(ID, "Image segmentation", "Segment an image by thresholding or edges")
        .param(ParameterSpec::select(
            "method",
            "Method",
            ["threshold", "canny", "watershed"],
            "threshold",
        ))
        .param(ParameterSpec::number("threshold_value", "Threshold", 127.0).min(0.0).max(255.0))
}

pub struct ImageSegmentation;

impl Operator for ImageSegmentation {
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError> {
        let img = require_image(inputs, Channel::Image)?;
        let gray = to_gray(img);

        let mask = match params.choice("method")? {
            "threshold" => binarize(&gray, params.integer("threshold_value")? as u8, false),
            "canny" => edge_detection::canny(&gray, 50.0, 150.0),
            "watershed" => {
                if gray.width() == 0 || gray.height() == 0 {
                    gray
                } else {
                    let level = imageproc::contrast::otsu_level(&gray);
                    let foreground = binarize(&gray, level, true);
                    imageproc::morphology::open(&foreground, Norm::LInf, 2)
                }
            }
            other => return Err(OperatorError::invalid_parameter("method", format!("unsupported '{other}'"))),
        };
        Ok(image_outputs(gray_to_rgb(mask)))
    }
}

/// Pixels strictly above `level` become white (black when `invert`).
fn binarize(gray: &GrayImage, level: u8, invert: bool) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let above = gray.get_pixel(x, y).0[0] > level;
        Luma([if above != invert { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::fixtures::inputs;
    use image::{Rgb, RgbImage};
    use serde_json::json;

    fn run(img: RgbImage, raw: serde_json::Value) -> RgbImage {
        let params = Parameters::resolve(&descriptor().parameters, raw.as_object().unwrap()).unwrap();
        let out = ImageSegmentation.execute(&inputs(img), &params).unwrap();
        out[&Channel::Output].as_image().unwrap().as_ref().clone()
    }

    fn ramp() -> RgbImage {
        RgbImage::from_fn(256, 1, |x, _| Rgb([x as u8; 3]))
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let out = run(ramp(), json!({ "method": "threshold", "threshold_value": 100 }));
        assert_eq!(out.get_pixel(100, 0).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(101, 0).0, [255, 255, 255]);
    }

    #[test]
    fn watershed_marks_dark_blob_as_foreground() {
        let img = RgbImage::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Rgb([10, 10, 10])
            } else {
                Rgb([240, 240, 240])
            }
        });
        let out = run(img, json!({ "method": "watershed" }));
        assert_eq!(out.get_pixel(10, 10).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 0]);
    }

    #[test]
    fn watershed_opening_removes_speckles() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([240, 240, 240]));
        img.put_pixel(3, 3, Rgb([0, 0, 0]));
        let out = run(img, json!({ "method": "watershed" }));
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0]);
    }
}
