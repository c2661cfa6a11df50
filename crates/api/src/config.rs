//! Server configuration.

/// Tuning knobs for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Largest accepted request body. Root images travel base64-encoded
    /// inside the JSON body, so this bounds the input image size.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".into(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}
