//! Buffer bytes behind a document.
//!
//! The parser never touches the filesystem or the network. Embedded base64
//! `data:` URIs are decoded here; every other URI is handed to a
//! [`UriResolver`] supplied by the caller.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gltf_core::{Document, FetchError};
use tracing::debug;

use crate::uri::{is_data_uri, parse_data_uri};

/// Fetches the bytes behind a non-`data:` URI.
pub trait UriResolver {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F> UriResolver for F
where
    F: Fn(&str) -> Result<Vec<u8>, FetchError>,
{
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        self(uri)
    }
}

/// Resolver that refuses every external URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedOnly;

impl UriResolver for EmbeddedOnly {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Unsupported {
            uri: uri.to_string(),
        })
    }
}

/// Decode a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, FetchError> {
    let parsed = parse_data_uri(uri).ok_or_else(|| FetchError::InvalidDataUri {
        reason: "expected data:[<mediatype>][;base64],<data>".to_string(),
    })?;
    if !parsed.base64 {
        return Err(FetchError::InvalidDataUri {
            reason: "only base64 payloads are supported".to_string(),
        });
    }
    STANDARD
        .decode(parsed.payload)
        .map_err(|e| FetchError::Base64(e.to_string()))
}

/// A buffer whose bytes could not be gathered.
#[derive(Debug)]
pub struct BufferFailure {
    pub buffer: usize,
    pub error: FetchError,
}

/// Bytes of a document's buffers, indexed like `Document::buffers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferStore {
    buffers: Vec<Option<Vec<u8>>>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the bytes of buffer `index`, replacing any previous bytes.
    pub fn insert(&mut self, index: usize, bytes: Vec<u8>) {
        if index >= self.buffers.len() {
            self.buffers.resize_with(index + 1, || None);
        }
        self.buffers[index] = Some(bytes);
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.buffers.get(index)?.as_deref()
    }

    /// Number of buffers with bytes available.
    pub fn available(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Decode only the buffers embedded as `data:` URIs.
    pub fn embedded(doc: &Document) -> Self {
        Self::load(doc, None, &EmbeddedOnly).0
    }

    /// Gather the bytes of every buffer in `doc`.
    ///
    /// Buffer 0 without a uri takes `bin_chunk`. `data:` URIs are decoded in
    /// process and the rest go through `resolver`. Failures are returned
    /// alongside the store; buffers that fail are simply absent from it.
    pub fn load(
        doc: &Document,
        bin_chunk: Option<Vec<u8>>,
        resolver: &dyn UriResolver,
    ) -> (Self, Vec<BufferFailure>) {
        let mut store = Self::new();
        let mut failures = Vec::new();
        let mut bin_chunk = bin_chunk;

        for (index, buffer) in doc.buffers.iter().enumerate() {
            let fetched = match buffer.uri.as_deref() {
                None if index == 0 => bin_chunk.take().ok_or(FetchError::MissingBinaryChunk),
                None => Err(FetchError::MissingBinaryChunk),
                Some(uri) if is_data_uri(uri) => decode_data_uri(uri),
                Some(uri) => resolver.fetch(uri),
            };

            match fetched {
                Ok(bytes) => {
                    if bytes.len() < buffer.byte_length {
                        debug!(buffer = index, actual = bytes.len(), declared = buffer.byte_length, "buffer shorter than declared");
                        failures.push(BufferFailure {
                            buffer: index,
                            error: FetchError::TooShort {
                                actual: bytes.len(),
                                declared: buffer.byte_length,
                            },
                        });
                    }
                    store.insert(index, bytes);
                }
                Err(error) => {
                    debug!(buffer = index, %error, "buffer bytes unavailable");
                    failures.push(BufferFailure {
                        buffer: index,
                        error,
                    });
                }
            }
        }

        (store, failures)
    }

    /// The bytes covered by buffer view `view`, if its buffer is loaded and
    /// the range lies inside the loaded bytes.
    pub fn view<'a>(&'a self, doc: &Document, view: usize) -> Option<&'a [u8]> {
        let view = doc.buffer_views.get(view)?;
        let bytes = self.get(view.buffer)?;
        let end = view.byte_offset.checked_add(view.byte_length)?;
        bytes.get(view.byte_offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_core::{Buffer, BufferView, Extensions};

    fn buffer(uri: Option<&str>, byte_length: usize) -> Buffer {
        Buffer {
            uri: uri.map(str::to_string),
            byte_length,
            name: None,
            extensions: Extensions::new(),
            extras: None,
        }
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AgED").unwrap();
        assert_eq!(bytes, vec![2, 1, 3]);
    }

    #[test]
    fn test_decode_rejects_plain_payload() {
        let err = decode_data_uri("data:,abc").unwrap_err();
        assert!(matches!(err, FetchError::InvalidDataUri { .. }));
        let err = decode_data_uri("data:;base64,@@@").unwrap_err();
        assert!(matches!(err, FetchError::Base64(_)));
    }

    #[test]
    fn test_load_mixed_sources() {
        let doc = Document {
            buffers: vec![
                buffer(None, 2),
                buffer(Some("data:application/octet-stream;base64,AgED"), 3),
                buffer(Some("external.bin"), 4),
                buffer(Some("missing.bin"), 4),
            ],
            ..Default::default()
        };
        let resolver = |uri: &str| -> Result<Vec<u8>, FetchError> {
            match uri {
                "external.bin" => Ok(vec![9; 4]),
                other => Err(FetchError::Unavailable {
                    uri: other.to_string(),
                    reason: "not found".to_string(),
                }),
            }
        };

        let (store, failures) = BufferStore::load(&doc, Some(vec![7, 7]), &resolver);
        assert_eq!(store.get(0), Some(&[7u8, 7][..]));
        assert_eq!(store.get(1), Some(&[2u8, 1, 3][..]));
        assert_eq!(store.get(2), Some(&[9u8; 4][..]));
        assert_eq!(store.get(3), None);
        assert_eq!(store.available(), 3);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].buffer, 3);
    }

    #[test]
    fn test_bin_chunk_only_for_first_buffer() {
        let doc = Document {
            buffers: vec![buffer(Some("data:;base64,AA=="), 1), buffer(None, 1)],
            ..Default::default()
        };
        let (store, failures) = BufferStore::load(&doc, Some(vec![1]), &EmbeddedOnly);
        assert_eq!(store.get(0), Some(&[0u8][..]));
        assert_eq!(store.get(1), None);
        assert!(matches!(failures[0].error, FetchError::MissingBinaryChunk));
    }

    #[test]
    fn test_short_buffer_is_kept_and_reported() {
        let doc = Document {
            buffers: vec![buffer(Some("data:;base64,AgED"), 8)],
            ..Default::default()
        };
        let (store, failures) = BufferStore::load(&doc, None, &EmbeddedOnly);
        assert_eq!(store.get(0).map(<[u8]>::len), Some(3));
        assert!(matches!(
            failures[0].error,
            FetchError::TooShort {
                actual: 3,
                declared: 8
            }
        ));
    }

    #[test]
    fn test_view_slices_buffer() {
        let doc = Document {
            buffers: vec![buffer(Some("data:;base64,AAECAwQF"), 6)],
            buffer_views: vec![BufferView {
                buffer: 0,
                byte_offset: 2,
                byte_length: 3,
                byte_stride: None,
                target: None,
                name: None,
                extensions: Extensions::new(),
                extras: None,
            }],
            ..Default::default()
        };
        let store = BufferStore::embedded(&doc);
        assert_eq!(store.view(&doc, 0), Some(&[2u8, 3, 4][..]));
        assert_eq!(store.view(&doc, 1), None);
    }
}
