//! Image resource codec: `data:` URLs with base64 payloads <-> RGB buffers.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("data URL is not base64 encoded")]
    NotBase64DataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a `data:image/...;base64,<payload>` URL, or a bare base64 payload,
/// into an RGB image.
pub fn decode_data_url(resource: &str) -> Result<RgbImage, CodecError> {
    let resource = resource.trim();
    let payload = match resource.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest.split_once(',').ok_or(CodecError::NotBase64DataUrl)?;
            if !meta.ends_with(";base64") {
                return Err(CodecError::NotBase64DataUrl);
            }
            payload
        }
        None => resource,
    };
    let bytes = STANDARD.decode(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgb8())
}

/// Encode `img` as PNG inside a `data:image/png;base64,` URL.
pub fn encode_png_data_url(img: &RgbImage) -> Result<String, CodecError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
