//! Checking one document on disk and rendering the outcome.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use gltf_core::{Document, ReportEntry, Stage};
use gltf_loader::{BufferStore, LoadFailure, Unparsed};
use serde::Serialize;
use tracing::{info, warn};

use crate::resolver::FileResolver;

/// What to check and how.
#[derive(Debug, Clone, Default)]
pub struct CheckConfig {
    pub path: PathBuf,
    /// Binary payload standing in for buffer 0 when it has no uri.
    pub bin: Option<PathBuf>,
    pub max_size: Option<usize>,
}

impl CheckConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Result of checking one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub file: String,
    pub valid: bool,
    pub failed_stage: Option<Stage>,
    pub entries: Vec<ReportEntry>,
    /// Buffers whose bytes could not be gathered.
    pub buffer_warnings: Vec<String>,
    pub skipped_checks: usize,
    #[serde(skip)]
    pub document: Option<Document>,
}

impl CheckOutcome {
    fn failed(file: String, failure: LoadFailure, buffer_warnings: Vec<String>) -> Self {
        Self {
            file,
            valid: false,
            failed_stage: Some(failure.stage),
            entries: failure.entries,
            buffer_warnings,
            skipped_checks: 0,
            document: None,
        }
    }
}

/// Run every stage over the document at `config.path`.
///
/// I/O problems with the document itself are errors; problems with the
/// document's contents are reported in the outcome.
pub fn check_file(config: &CheckConfig) -> Result<CheckOutcome> {
    let file = config.path.display().to_string();
    let bytes =
        fs::read(&config.path).with_context(|| format!("Failed to read {}", file))?;
    let bin_chunk = config
        .bin
        .as_deref()
        .map(|path| {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;

    let checked = match Unparsed::new(&bytes)
        .parse(config.max_size)
        .and_then(|parsed| parsed.check_references())
    {
        Ok(checked) => checked,
        Err(failure) => return Ok(CheckOutcome::failed(file, failure, Vec::new())),
    };

    let resolver = FileResolver::for_document(&config.path);
    let (buffers, failures) = BufferStore::load(checked.document(), bin_chunk, &resolver);
    let buffer_warnings: Vec<String> = failures
        .iter()
        .map(|failure| {
            warn!(buffer = failure.buffer, error = %failure.error, "buffer unavailable");
            format!("buffer {}: {}", failure.buffer, failure.error)
        })
        .collect();

    match checked.validate_with_buffers(&buffers) {
        Ok(validated) => {
            info!(file = %file, skipped = validated.skipped_checks(), "document is valid");
            Ok(CheckOutcome {
                file,
                valid: true,
                failed_stage: None,
                entries: Vec::new(),
                buffer_warnings,
                skipped_checks: validated.skipped_checks(),
                document: Some(validated.into_document()),
            })
        }
        Err(failure) => Ok(CheckOutcome::failed(file, failure, buffer_warnings)),
    }
}

/// Human-readable rendering, one diagnostic per line.
pub fn render_text(outcome: &CheckOutcome) -> String {
    outcome.to_string()
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.buffer_warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        match self.failed_stage {
            Some(stage) => writeln!(
                f,
                "{}: invalid ({} error(s) in {} stage)",
                self.file,
                self.entries.len(),
                stage
            ),
            None if self.skipped_checks > 0 => writeln!(
                f,
                "{}: valid ({} check(s) skipped, buffer data unavailable)",
                self.file, self.skipped_checks
            ),
            None => writeln!(f, "{}: valid", self.file),
        }
    }
}

pub fn render_json(outcome: &CheckOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("Failed to serialize report")
}

/// Canonical JSON of a valid document.
pub fn canonical_json(outcome: &CheckOutcome) -> Result<Option<Vec<u8>>> {
    outcome
        .document
        .as_ref()
        .map(|doc| gltf_loader::serialize(doc).context("Failed to write canonical form"))
        .transpose()
}

