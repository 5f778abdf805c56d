//! Asset metadata and extension declaration rules.

use gltf_core::ValidationError;
use gltf_parser::parse_version;

use crate::rules::{Context, Findings};

/// Major version this validator understands.
const SUPPORTED_MAJOR: u32 = 2;

pub(crate) fn version(ctx: &Context<'_>, findings: &mut Findings) {
    let asset = &ctx.doc.asset;
    let Some(version) = parse_version(&asset.version) else {
        findings.push(unsupported(&asset.version, "not a <major>.<minor> version".to_string()));
        return;
    };
    if version.major != SUPPORTED_MAJOR {
        findings.push(unsupported(
            &asset.version,
            format!("only glTF {}.x assets are supported", SUPPORTED_MAJOR),
        ));
    }

    let Some(min_version) = &asset.min_version else {
        return;
    };
    match parse_version(min_version) {
        Some(min) if min > version => findings.push(unsupported(
            &asset.version,
            format!("minVersion {} is newer than the asset version", min),
        )),
        Some(_) => {}
        None => findings.push(unsupported(
            min_version,
            "minVersion is not a <major>.<minor> version".to_string(),
        )),
    }
}

fn unsupported(version: &str, reason: String) -> ValidationError {
    ValidationError::UnsupportedVersion {
        version: version.to_string(),
        reason,
    }
}

/// Every required extension must also be listed as used.
pub(crate) fn required_extensions(ctx: &Context<'_>, findings: &mut Findings) {
    let doc = ctx.doc;
    for name in &doc.extensions_required {
        if !doc.extensions_used.contains(name) {
            findings.push(ValidationError::UndeclaredRequiredExtension { name: name.clone() });
        }
    }
}
