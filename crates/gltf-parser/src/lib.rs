//! glTF 2.0 JSON parser.
//!
//! Turns a JSON payload into a [`Document`] in two steps: serde_json reads the
//! payload into the wire records of [`wire`], then lowering checks required
//! fields and enum values and applies defaults. The reverse direction,
//! [`serialize`], writes canonical JSON.
//!
//! # Example
//!
//! ```
//! use gltf_parser::parse;
//!
//! let doc = parse(br#"{"asset":{"version":"2.0"},"nodes":[{}]}"#).unwrap();
//! assert_eq!(doc.nodes.len(), 1);
//! ```

pub mod buffers;
mod lower;
pub mod uri;
pub mod wire;
mod writer;

pub use buffers::{decode_data_uri, BufferFailure, BufferStore, EmbeddedOnly, UriResolver};
pub use uri::{parse_data_uri, parse_version, DataUri, Version};
pub use writer::{serialize, serialize_pretty};

use gltf_core::{Document, GltfError, ParseError};
use serde_json::error::Category;
use tracing::debug;

use crate::wire::WireDocument;

/// Parse a glTF JSON payload into a document.
pub fn parse(bytes: &[u8]) -> Result<Document, ParseError> {
    let wire: WireDocument = serde_json::from_slice(bytes).map_err(json_error)?;
    let doc = lower::lower_document(wire)?;
    debug!(
        bytes = bytes.len(),
        entities = doc.entity_count(),
        "parsed glTF document"
    );
    Ok(doc)
}

/// Parse, refusing payloads longer than `limit` bytes.
pub fn parse_with_limit(bytes: &[u8], limit: Option<usize>) -> Result<Document, ParseError> {
    if let Some(limit) = limit {
        if bytes.len() > limit {
            return Err(ParseError::InputTooLarge {
                len: bytes.len(),
                limit,
            });
        }
    }
    parse(bytes)
}

/// Parse and re-serialize, yielding the canonical form of a payload.
pub fn canonicalize(bytes: &[u8]) -> Result<Vec<u8>, GltfError> {
    let doc = parse(bytes)?;
    serialize(&doc)
}

fn json_error(err: serde_json::Error) -> ParseError {
    let line = err.line();
    let column = err.column();
    let message = err.to_string();
    // serde_json appends the position; it is reported separately.
    let message = match message.rsplit_once(" at line ") {
        Some((head, _)) => head.to_string(),
        None => message,
    };
    match err.classify() {
        Category::Eof => ParseError::Truncated { line, column },
        Category::Data => ParseError::TypeMismatch {
            message,
            line,
            column,
        },
        Category::Syntax | Category::Io => ParseError::Syntax {
            message,
            line,
            column,
        },
    }
}
