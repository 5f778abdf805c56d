//! gltf-check library: the pieces of the command-line checker that do not
//! depend on argument parsing.

pub mod check;
pub mod resolver;

pub use check::{canonical_json, check_file, render_json, render_text, CheckConfig, CheckOutcome};
pub use resolver::FileResolver;
