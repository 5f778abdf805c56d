//! Cross-field validation for glTF documents.
//!
//! Runs after reference resolution and enforces the constraints that the
//! schema shape alone cannot express:
//! - Node transforms (matrix vs. TRS, unit rotations)
//! - Skins (skinning attributes, joint counts, skeleton ancestry)
//! - Morph targets (weight counts, consistent target counts)
//! - Sparse accessors (strictly increasing, in-range indices)
//! - Layout (accessor bounds, buffer view ranges)
//! - Animations, cameras, asset version, and extension declarations
//!
//! Rules that need buffer bytes are skipped when the bytes are unavailable.

mod animation;
mod asset;
mod camera;
mod layout;
mod morph;
mod rules;
mod skinning;
mod sparse;
mod transform;

pub use transform::ROTATION_TOLERANCE;

use gltf_core::{Diagnostic, Document, ReportEntry, Stage, ValidationError};
use gltf_parser::BufferStore;
use gltf_resolver::ReferenceReport;
use tracing::{debug, trace};

use crate::rules::{Context, Findings, Rule};

const RULES: &[(&str, Rule)] = &[
    ("conflicting transform", transform::conflicting_transform),
    ("unit rotation", transform::unit_rotation),
    ("skinning attributes", skinning::skinning_attributes),
    ("skin joint count", skinning::joint_count),
    ("skeleton root", skinning::skeleton_root),
    ("morph weight count", morph::weight_counts),
    ("consistent morph targets", morph::consistent_targets),
    ("sparse indices", sparse::sparse_indices),
    ("accessor bounds", layout::accessor_bounds),
    ("buffer view range", layout::buffer_view_range),
    ("animated matrix", animation::animated_matrix),
    ("unique channel targets", animation::unique_targets),
    ("camera projection", camera::projection),
    ("asset version", asset::version),
    ("required extensions", asset::required_extensions),
];

/// Outcome of cross-field validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    skipped: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of data-dependent checks skipped because buffer bytes were unavailable.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Flatten into report entries.
    pub fn to_entries(&self) -> Vec<ReportEntry> {
        self.errors
            .iter()
            .map(|err| err.to_entry(Stage::Validation))
            .collect()
    }
}

/// Validate `doc`, decoding any buffers embedded as `data:` URIs.
pub fn validate(doc: &Document, references: &ReferenceReport) -> ValidationReport {
    if !references.is_clean() {
        return unresolved(references);
    }
    let buffers = BufferStore::embedded(doc);
    validate_with_buffers(doc, references, &buffers)
}

/// Validate `doc` against buffer bytes supplied by the caller.
pub fn validate_with_buffers(
    doc: &Document,
    references: &ReferenceReport,
    buffers: &BufferStore,
) -> ValidationReport {
    if !references.is_clean() {
        return unresolved(references);
    }

    let ctx = Context {
        doc,
        references,
        buffers,
    };
    let mut findings = Findings::default();
    for (name, rule) in RULES {
        let before = findings.errors.len();
        rule(&ctx, &mut findings);
        trace!(rule = name, violations = findings.errors.len() - before, "applied rule");
    }

    debug!(
        violations = findings.errors.len(),
        skipped = findings.skipped,
        buffers = buffers.available(),
        "validated document"
    );
    ValidationReport {
        errors: findings.errors,
        skipped: findings.skipped,
    }
}

fn unresolved(references: &ReferenceReport) -> ValidationReport {
    debug!(
        errors = references.len(),
        "reference errors present, skipping validation"
    );
    ValidationReport {
        errors: vec![ValidationError::ReferencesUnresolved {
            count: references.len(),
        }],
        skipped: 0,
    }
}
