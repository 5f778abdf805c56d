//! Loader configuration.

/// Options controlling how a payload is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Payloads longer than this many bytes are refused before parsing.
    pub max_input_len: Option<usize>,
    /// Decode buffers embedded as `data:` URIs so data-dependent rules can run.
    pub decode_embedded_buffers: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_input_len: None,
            decode_embedded_buffers: true,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse payloads longer than `limit` bytes.
    pub fn with_max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    pub fn with_decode_embedded_buffers(mut self, decode: bool) -> Self {
        self.decode_embedded_buffers = decode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = LoadOptions::new()
            .with_max_input_len(1024)
            .with_decode_embedded_buffers(false);
        assert_eq!(options.max_input_len, Some(1024));
        assert!(!options.decode_embedded_buffers);
        assert!(LoadOptions::default().decode_embedded_buffers);
    }
}
