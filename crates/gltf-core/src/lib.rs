//! Core types for glTF 2.0 documents.
//!
//! This crate provides the foundational types used across the other gltf crates:
//! - The schema model: every glTF entity as a plain record with defaults applied
//! - Closed enumerations for the wire-level codes and names
//! - Error types for every pipeline stage
//! - Flattened report records shared by the loader and the CLI

pub mod document;
pub mod errors;
pub mod report;
pub mod types;

pub use document::*;
pub use errors::*;
pub use report::*;
pub use types::*;
