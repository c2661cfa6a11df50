//! Canonical channel names and the values that flow along them.
//!
//! Node outputs are not open-ended dictionaries: every port is one of a fixed
//! set of [`Channel`]s and carries a [`ChannelValue`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A named input or output slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Primary image slot. `input` is accepted on the wire as a synonym.
    #[serde(alias = "input")]
    Image,
    /// Conventional output slot; built-in operators mirror `image` here.
    Output,
    /// Recognised text.
    Text,
    /// Cropped region of interest.
    Roi,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Image => "image",
            Channel::Output => "output",
            Channel::Text => "text",
            Channel::Roi => "roi",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value carried on a channel.
///
/// Image buffers are reference counted so one output can feed several
/// downstream nodes without copying pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    Image(Arc<RgbImage>),
    Text(String),
}

impl ChannelValue {
    pub fn image(img: RgbImage) -> Self {
        Self::Image(Arc::new(img))
    }

    pub fn as_image(&self) -> Option<&Arc<RgbImage>> {
        match self {
            ChannelValue::Image(img) => Some(img),
            ChannelValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ChannelValue::Text(text) => Some(text),
            ChannelValue::Image(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChannelValue::Image(_) => "image",
            ChannelValue::Text(_) => "text",
        }
    }
}

/// Inputs bound to, or outputs produced by, one node.
pub type PortMap = BTreeMap<Channel, ChannelValue>;

/// Convenience for operators that publish the same image on `image` and `output`.
pub fn image_outputs(img: RgbImage) -> PortMap {
    let value = ChannelValue::image(img);
    let mut out = PortMap::new();
    out.insert(Channel::Image, value.clone());
    out.insert(Channel::Output, value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_an_alias_for_image() {
        let parsed: Channel = serde_json::from_str("\"input\"").unwrap();
        assert_eq!(parsed, Channel::Image);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"image\"");
    }

    #[test]
    fn unknown_channel_is_rejected() {
        assert!(serde_json::from_str::<Channel>("\"mask\"").is_err());
    }

    #[test]
    fn image_outputs_share_one_buffer() {
        let out = image_outputs(RgbImage::new(2, 2));
        let a = out[&Channel::Image].as_image().unwrap();
        let b = out[&Channel::Output].as_image().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }
}
