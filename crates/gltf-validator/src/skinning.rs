//! Skin rules.

use gltf_core::ValidationError;

use crate::rules::{Context, Findings};

const SKINNING_ATTRIBUTES: [&str; 2] = ["JOINTS_0", "WEIGHTS_0"];

/// Every primitive of a skinned node's mesh needs joint indices and weights.
pub(crate) fn skinning_attributes(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, node) in ctx.doc.nodes.iter().enumerate() {
        let (Some(_), Some(mesh_index)) = (node.skin, node.mesh) else {
            continue;
        };
        let Some(mesh) = ctx.doc.meshes.get(mesh_index) else {
            continue;
        };
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let missing: Vec<&'static str> = SKINNING_ATTRIBUTES
                .into_iter()
                .filter(|name| !primitive.attributes.contains_key(*name))
                .collect();
            if !missing.is_empty() {
                findings.push(ValidationError::MissingSkinningAttributes {
                    node: index,
                    mesh: mesh_index,
                    primitive: p,
                    missing,
                });
            }
        }
    }
}

pub(crate) fn joint_count(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, skin) in ctx.doc.skins.iter().enumerate() {
        let Some(accessor_index) = skin.inverse_bind_matrices else {
            continue;
        };
        let Some(accessor) = ctx.doc.accessors.get(accessor_index) else {
            continue;
        };
        if accessor.count != skin.joints.len() {
            findings.push(ValidationError::SkinJointCountMismatch {
                skin: index,
                joints: skin.joints.len(),
                accessor: accessor_index,
                count: accessor.count,
            });
        }
    }
}

/// `skeleton`, when set, must be a joint's ancestor or the joint itself.
pub(crate) fn skeleton_root(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, skin) in ctx.doc.skins.iter().enumerate() {
        let Some(skeleton) = skin.skeleton else {
            continue;
        };
        for &joint in &skin.joints {
            let reachable =
                joint == skeleton || ctx.references.ancestors(joint).any(|a| a == skeleton);
            if !reachable {
                findings.push(ValidationError::SkeletonNotAncestor {
                    skin: index,
                    skeleton,
                    joint,
                });
            }
        }
    }
}
