//! Node transform rules.

use glam::Quat;
use gltf_core::ValidationError;

use crate::rules::{Context, Findings};

/// Largest accepted deviation of a rotation quaternion's length from 1.
pub const ROTATION_TOLERANCE: f32 = 0.001;

/// A node with `matrix` must not also declare translation, rotation, or scale.
pub(crate) fn conflicting_transform(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, node) in ctx.doc.nodes.iter().enumerate() {
        if node.has_conflicting_transform() {
            findings.push(ValidationError::ConflictingTransform {
                node: index,
                components: node.trs_components().to_vec(),
            });
        }
    }
}

pub(crate) fn unit_rotation(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, node) in ctx.doc.nodes.iter().enumerate() {
        let Some(rotation) = node.rotation else {
            continue;
        };
        let length = Quat::from_array(rotation).length();
        if (length - 1.0).abs() > ROTATION_TOLERANCE {
            findings.push(ValidationError::NonUnitRotation {
                node: index,
                length,
            });
        }
    }
}
