//! Morph target rules.

use gltf_core::{EntityKind, ValidationError};

use crate::rules::{Context, Findings};

/// All primitives of a mesh must declare the same number of morph targets.
pub(crate) fn consistent_targets(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, mesh) in ctx.doc.meshes.iter().enumerate() {
        let expected = mesh.morph_target_count();
        for (p, primitive) in mesh.primitives.iter().enumerate().skip(1) {
            if primitive.targets.len() != expected {
                findings.push(ValidationError::InconsistentMorphTargets {
                    mesh: index,
                    primitive: p,
                    expected,
                    found: primitive.targets.len(),
                });
            }
        }
    }
}

pub(crate) fn weight_counts(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, mesh) in ctx.doc.meshes.iter().enumerate() {
        if let Some(weights) = &mesh.weights {
            let targets = mesh.morph_target_count();
            if weights.len() != targets {
                findings.push(ValidationError::MorphWeightCountMismatch {
                    entity_kind: EntityKind::Mesh,
                    index,
                    weights: weights.len(),
                    targets,
                });
            }
        }
    }

    for (index, node) in ctx.doc.nodes.iter().enumerate() {
        let Some(weights) = &node.weights else {
            continue;
        };
        let Some(mesh_index) = node.mesh else {
            findings.push(ValidationError::WeightsWithoutMesh { node: index });
            continue;
        };
        let Some(mesh) = ctx.doc.meshes.get(mesh_index) else {
            continue;
        };
        let targets = mesh.morph_target_count();
        if weights.len() != targets {
            findings.push(ValidationError::MorphWeightCountMismatch {
                entity_kind: EntityKind::Node,
                index,
                weights: weights.len(),
                targets,
            });
        }
    }
}
