//! Typestate pipeline: `Unparsed -> Parsed -> ReferenceChecked -> Validated`.
//!
//! Each transition consumes the previous stage and either yields the next one
//! or a [`LoadFailure`] holding every diagnostic of the stage that failed.

use gltf_core::{Diagnostic, Document, ReportEntry, Stage};
use gltf_parser::BufferStore;
use gltf_resolver::{check_references, ReferenceReport};
use gltf_validator::{validate, validate_with_buffers, ValidationReport};
use thiserror::Error;
use tracing::debug;

/// The first stage that reported problems, with its flattened diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} stage failed with {} error(s)", .entries.len())]
pub struct LoadFailure {
    pub stage: Stage,
    pub entries: Vec<ReportEntry>,
}

impl LoadFailure {
    fn new(stage: Stage, entries: Vec<ReportEntry>) -> Self {
        debug!(%stage, errors = entries.len(), "load failed");
        Self { stage, entries }
    }
}

/// Raw bytes, not yet parsed.
#[derive(Debug, Clone, Copy)]
pub struct Unparsed<'a> {
    bytes: &'a [u8],
}

impl<'a> Unparsed<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Parse, refusing payloads longer than `max_input_len`.
    pub fn parse(self, max_input_len: Option<usize>) -> Result<Parsed, LoadFailure> {
        gltf_parser::parse_with_limit(self.bytes, max_input_len)
            .map(|document| Parsed { document })
            .map_err(|err| LoadFailure::new(Stage::Parse, vec![err.to_entry(Stage::Parse)]))
    }
}

/// A syntactically well-formed document whose references are unchecked.
#[derive(Debug, Clone)]
pub struct Parsed {
    document: Document,
}

impl Parsed {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn check_references(self) -> Result<ReferenceChecked, LoadFailure> {
        let references = check_references(&self.document);
        if !references.is_clean() {
            return Err(LoadFailure::new(Stage::References, references.to_entries()));
        }
        Ok(ReferenceChecked {
            document: self.document,
            references,
        })
    }
}

/// A document whose indices are all in range and whose hierarchy is a forest.
#[derive(Debug, Clone)]
pub struct ReferenceChecked {
    document: Document,
    references: ReferenceReport,
}

impl ReferenceChecked {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn references(&self) -> &ReferenceReport {
        &self.references
    }

    /// Validate, decoding buffers embedded as `data:` URIs.
    pub fn validate(self) -> Result<Validated, LoadFailure> {
        let report = validate(&self.document, &self.references);
        self.finish(report)
    }

    /// Validate against buffer bytes supplied by the caller.
    pub fn validate_with_buffers(self, buffers: &BufferStore) -> Result<Validated, LoadFailure> {
        let report = validate_with_buffers(&self.document, &self.references, buffers);
        self.finish(report)
    }

    fn finish(self, report: ValidationReport) -> Result<Validated, LoadFailure> {
        if !report.is_valid() {
            return Err(LoadFailure::new(Stage::Validation, report.to_entries()));
        }
        Ok(Validated {
            document: self.document,
            references: self.references,
            skipped_checks: report.skipped(),
        })
    }
}

/// A document that passed every stage. Read-only from here on.
#[derive(Debug, Clone)]
pub struct Validated {
    document: Document,
    references: ReferenceReport,
    skipped_checks: usize,
}

impl Validated {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Parent of `node` in the validated hierarchy.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.references.parent(node)
    }

    /// Data-dependent checks that were skipped because buffer bytes were unavailable.
    pub fn skipped_checks(&self) -> usize {
        self.skipped_checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_core::ErrorKind;

    #[test]
    fn test_stages_in_order() {
        let bytes = br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{"children":[1]},{}]}"#;
        let parsed = Unparsed::new(bytes).parse(None).unwrap();
        assert_eq!(parsed.document().nodes.len(), 2);
        let checked = parsed.check_references().unwrap();
        assert!(checked.references().is_clean());
        let validated = checked.validate().unwrap();
        assert_eq!(validated.parent(1), Some(0));
        assert_eq!(validated.parent(0), None);
    }

    #[test]
    fn test_parse_failure_has_single_entry() {
        let failure = Unparsed::new(b"{").parse(None).unwrap_err();
        assert_eq!(failure.stage, Stage::Parse);
        assert_eq!(failure.entries.len(), 1);
        assert_eq!(failure.entries[0].error_kind, ErrorKind::MalformedDocument);
        assert_eq!(failure.to_string(), "parse stage failed with 1 error(s)");
    }

    #[test]
    fn test_validation_failure_stage() {
        let bytes = br#"{"asset":{"version":"2.0"},"extensionsRequired":["EXT_x"]}"#;
        let failure = Unparsed::new(bytes)
            .parse(None)
            .and_then(Parsed::check_references)
            .and_then(ReferenceChecked::validate)
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Validation);
        assert_eq!(
            failure.entries[0].error_kind,
            ErrorKind::UndeclaredRequiredExtension
        );
    }
}
