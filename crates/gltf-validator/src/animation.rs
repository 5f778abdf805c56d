//! Animation channel rules.

use std::collections::HashMap;

use gltf_core::{TargetPath, ValidationError};

use crate::rules::{Context, Findings};

/// Animated nodes must use TRS, not `matrix`.
pub(crate) fn animated_matrix(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, animation) in ctx.doc.animations.iter().enumerate() {
        for (c, channel) in animation.channels.iter().enumerate() {
            let Some(node) = channel.target.node else {
                continue;
            };
            if ctx.doc.nodes.get(node).is_some_and(|n| n.matrix.is_some()) {
                findings.push(ValidationError::AnimatedMatrixNode {
                    animation: index,
                    channel: c,
                    node,
                });
            }
        }
    }
}

pub(crate) fn unique_targets(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, animation) in ctx.doc.animations.iter().enumerate() {
        let mut first_channel: HashMap<(usize, TargetPath), usize> = HashMap::new();
        for (c, channel) in animation.channels.iter().enumerate() {
            let Some(node) = channel.target.node else {
                continue;
            };
            let path = channel.target.path;
            match first_channel.get(&(node, path)) {
                Some(&first) => findings.push(ValidationError::DuplicateChannelTarget {
                    animation: index,
                    channel: c,
                    first,
                    node,
                    path,
                }),
                None => {
                    first_channel.insert((node, path), c);
                }
            }
        }
    }
}
