//! Smoothing filters: box blur, gaussian, median and bilateral.

use image::{Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use tracing::debug;

use crate::descriptor::{OperatorDescriptor, ParameterSpec};
use crate::{image_outputs, require_image, Channel, Operator, OperatorError, Parameters, PortMap, ResourceCache};

pub const ID: &str = "image_filter";

const BILATERAL_SIGMA_COLOR: f32 = 80.0;
const BILATERAL_SIGMA_SPACE: f32 = 80.0;

pub fn descriptor() -> OperatorDescriptor {
    OperatorDescriptor::new(ID, "Image filter", "Smooth an image with a choice of filters")
        .param(ParameterSpec::select(
            "filter_type",
            "Filter type",
            ["blur", "gaussian", "median", "bilateral"],
            "gaussian",
        ))
        .param(
            ParameterSpec::number("kernel_size", "Kernel size", 5.0)
                .min(3.0)
                .max(21.0)
                .step(2.0),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KernelKind {
    Box,
    Gaussian,
    /// 2-D spatial weights for the bilateral filter.
    BilateralSpatial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KernelSpec {
    kind: KernelKind,
    size: u32,
}

/// Normalised weights; 1-D for separable kernels, `size * size` otherwise.
#[derive(Debug)]
struct Kernel {
    weights: Vec<f32>,
}

impl Kernel {
    fn build(spec: &KernelSpec) -> Result<Self, OperatorError> {
        let size = spec.size as usize;
        let radius = (size / 2) as f32;
        let weights = match spec.kind {
            KernelKind::Box => vec![1.0 / size as f32; size],
            KernelKind::Gaussian => {
                // Same sigma OpenCV derives for a zero-sigma GaussianBlur.
                let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
                let raw: Vec<f32> = (0..size)
                    .map(|i| {
                        let d = i as f32 - radius;
                        (-(d * d) / (2.0 * sigma * sigma)).exp()
                    })
                    .collect();
                let sum: f32 = raw.iter().sum();
                raw.into_iter().map(|w| w / sum).collect()
            }
            KernelKind::BilateralSpatial => {
                let two_sigma_sq = 2.0 * BILATERAL_SIGMA_SPACE * BILATERAL_SIGMA_SPACE;
                let mut w = Vec::with_capacity(size * size);
                for j in 0..size {
                    for i in 0..size {
                        let dx = i as f32 - radius;
                        let dy = j as f32 - radius;
                        w.push((-(dx * dx + dy * dy) / two_sigma_sq).exp());
                    }
                }
                w
            }
        };
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(OperatorError::Failed(format!("degenerate {:?} kernel of size {}", spec.kind, size)));
        }
        Ok(Self { weights })
    }
}

pub struct ImageFilter {
    kernels: ResourceCache<KernelSpec, Kernel>,
}

impl ImageFilter {
    pub fn new() -> Self {
        Self {
            kernels: ResourceCache::new(),
        }
    }

    fn kernel(&self, kind: KernelKind, size: u32) -> Result<std::sync::Arc<Kernel>, OperatorError> {
        self.kernels
            .get_or_try_init(&KernelSpec { kind, size }, Kernel::build)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for ImageFilter {
    fn execute(&self, inputs: &PortMap, params: &Parameters) -> Result<PortMap, OperatorError> {
        let img = require_image(inputs, Channel::Image)?;
        let filter_type = params.choice("filter_type")?;
        let mut size = params.integer("kernel_size")? as u32;
        if size % 2 == 0 {
            size += 1;
        }
        debug!(filter_type, size, "applying filter");

        if img.width() == 0 || img.height() == 0 {
            return Ok(image_outputs(img.clone()));
        }

        let result = match filter_type {
            "blur" => separable_filter_equal(img, &self.kernel(KernelKind::Box, size)?.weights),
            "gaussian" => separable_filter_equal(img, &self.kernel(KernelKind::Gaussian, size)?.weights),
            "median" => imageproc::filter::median_filter(img, size / 2, size / 2),
            "bilateral" => bilateral(img, size, &self.kernel(KernelKind::BilateralSpatial, size)?.weights),
            other => return Err(OperatorError::invalid_parameter("filter_type", format!("unsupported '{other}'"))),
        };
        Ok(image_outputs(result))
    }
}

fn clamp_index(i: i64, len: u32) -> u32 {
    i.clamp(0, len as i64 - 1) as u32
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Colour bilateral filter; imageproc's version takes grey images only.
fn bilateral(img: &RgbImage, size: u32, spatial: &[f32]) -> RgbImage {
    let (w, h) = img.dimensions();
    let r = (size / 2) as i64;
    let two_sigma_sq = 2.0 * BILATERAL_SIGMA_COLOR * BILATERAL_SIGMA_COLOR;

    RgbImage::from_fn(w, h, |x, y| {
        let centre = img.get_pixel(x, y).0;
        let mut acc = [0f32; 3];
        let mut norm = 0f32;
        for j in 0..size as i64 {
            for i in 0..size as i64 {
                let sx = clamp_index(x as i64 + i - r, w);
                let sy = clamp_index(y as i64 + j - r, h);
                let p = img.get_pixel(sx, sy).0;
                let colour_dist: f32 = (0..3).map(|c| (p[c] as f32 - centre[c] as f32).abs()).sum();
                let weight = spatial[(j * size as i64 + i) as usize] * (-(colour_dist * colour_dist) / two_sigma_sq).exp();
                for c in 0..3 {
                    acc[c] += weight * p[c] as f32;
                }
                norm += weight;
            }
        }
        Rgb(acc.map(|v| to_u8(v / norm)))
    })
}
