//! Shared plumbing for validation rules.

use gltf_core::{Document, ValidationError};
use gltf_parser::BufferStore;
use gltf_resolver::ReferenceReport;

/// Everything a rule may look at. Indices in `doc` are known to be in range.
pub(crate) struct Context<'a> {
    pub doc: &'a Document,
    pub references: &'a ReferenceReport,
    pub buffers: &'a BufferStore,
}

/// Violations found so far, plus a count of checks skipped for lack of data.
#[derive(Default)]
pub(crate) struct Findings {
    pub errors: Vec<ValidationError>,
    pub skipped: usize,
}

impl Findings {
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }
}

pub(crate) type Rule = fn(&Context<'_>, &mut Findings);
