//! Built-in image operators.
//!
//! Each operator is compiled in and listed in [`builtin`], the static table the
//! engine's registry is populated from at startup.

use std::sync::Arc;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::descriptor::OperatorDescriptor;
use crate::Operator;

pub mod edge_detection;
pub mod filter;
pub mod registration;
pub mod roi;
pub mod segmentation;

/// Every built-in operator, in registration order.
pub fn builtin() -> Vec<(OperatorDescriptor, Arc<dyn Operator>)> {
    vec![
        (filter::descriptor(), Arc::new(filter::ImageFilter::new()) as Arc<dyn Operator>),
        (edge_detection::descriptor(), Arc::new(edge_detection::EdgeDetection) as Arc<dyn Operator>),
        (segmentation::descriptor(), Arc::new(segmentation::ImageSegmentation) as Arc<dyn Operator>),
        (roi::descriptor(), Arc::new(roi::RoiExtraction) as Arc<dyn Operator>),
        (registration::descriptor(), Arc::new(registration::ImageRegistration) as Arc<dyn Operator>),
    ]
}

pub(crate) fn to_gray(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

pub(crate) fn gray_to_rgb(gray: GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(gray).to_rgb8()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{Rgb, RgbImage};

    use crate::{Channel, ChannelValue, PortMap};

    /// Left half black, right half white.
    pub fn split_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    pub fn inputs(img: RgbImage) -> PortMap {
        let mut ports = PortMap::new();
        ports.insert(Channel::Image, ChannelValue::image(img));
        ports
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let table = builtin();
        let ids: HashSet<_> = table.iter().map(|(d, _)| d.id.clone()).collect();
        assert_eq!(ids.len(), table.len());
    }

    #[test]
    fn builtins_fail_without_an_image() {
        for (descriptor, op) in builtin() {
            let params = crate::Parameters::resolve(&descriptor.parameters, &Default::default()).unwrap();
            let err = op.execute(&crate::PortMap::new(), &params).unwrap_err();
            assert_eq!(err, crate::OperatorError::MissingInput(crate::Channel::Image), "{}", descriptor.id);
        }
    }
}
