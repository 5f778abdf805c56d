//! glTF 2.0 document loader.
//!
//! Runs the three stages in order and stops at the first that reports
//! problems:
//! 1. Parse: JSON into the typed schema model
//! 2. References: index ranges and the node hierarchy
//! 3. Validation: cross-field semantic rules
//!
//! # Example
//!
//! ```
//! use gltf_loader::{LoadOptions, Loader};
//!
//! let loader = Loader::new(LoadOptions::default());
//! let validated = loader
//!     .load(br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{}]}"#)
//!     .unwrap();
//! assert_eq!(validated.document().scenes[0].nodes, vec![0]);
//! ```

mod options;
mod pipeline;

pub use options::LoadOptions;
pub use pipeline::{LoadFailure, Parsed, ReferenceChecked, Unparsed, Validated};

pub use gltf_core::{
    Diagnostic, Document, EntityKind, ErrorKind, FetchError, GltfError, ParseError,
    ReferenceError, ReportEntry, Stage, ValidationError,
};
pub use gltf_parser::{
    canonicalize, parse, serialize, serialize_pretty, BufferFailure, BufferStore, EmbeddedOnly,
    UriResolver,
};
pub use gltf_resolver::{check_references, ReferenceReport};
pub use gltf_validator::{validate, validate_with_buffers, ValidationReport};

use tracing::debug;

/// Runs the full pipeline with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load a JSON payload through every stage.
    pub fn load(&self, bytes: &[u8]) -> Result<Validated, LoadFailure> {
        let checked = self.check(bytes)?;
        if self.options.decode_embedded_buffers {
            checked.validate()
        } else {
            checked.validate_with_buffers(&BufferStore::new())
        }
    }

    /// Load a JSON payload, validating against caller-supplied buffer bytes.
    pub fn load_with_buffers(
        &self,
        bytes: &[u8],
        buffers: &BufferStore,
    ) -> Result<Validated, LoadFailure> {
        self.check(bytes)?.validate_with_buffers(buffers)
    }

    fn check(&self, bytes: &[u8]) -> Result<ReferenceChecked, LoadFailure> {
        debug!(bytes = bytes.len(), "loading glTF document");
        Unparsed::new(bytes)
            .parse(self.options.max_input_len)?
            .check_references()
    }
}

/// Load with default options.
pub fn load(bytes: &[u8]) -> Result<Validated, LoadFailure> {
    Loader::default().load(bytes)
}
