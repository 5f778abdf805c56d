//! Sparse accessor rules. These read index data from buffers.

use gltf_core::{Accessor, Sparse, ValidationError};
use tracing::debug;

use crate::rules::{Context, Findings};

/// Sparse indices must strictly increase and stay below the accessor's count.
///
/// Only the first offending position of each kind is reported per accessor.
pub(crate) fn sparse_indices(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, accessor) in ctx.doc.accessors.iter().enumerate() {
        let Some(sparse) = &accessor.sparse else {
            continue;
        };
        match read_indices(ctx, sparse) {
            Some(indices) => check_indices(index, accessor, &indices, findings),
            None => {
                debug!(
                    accessor = index,
                    buffer_view = sparse.indices.buffer_view,
                    "sparse index data unavailable, skipping"
                );
                findings.skip();
            }
        }
    }
}

fn read_indices(ctx: &Context<'_>, sparse: &Sparse) -> Option<Vec<u32>> {
    let bytes = ctx.buffers.view(ctx.doc, sparse.indices.buffer_view)?;
    let bytes = bytes.get(sparse.indices.byte_offset..)?;
    let size = sparse.indices.component_type.size();
    (0..sparse.count)
        .map(|position| {
            let start = position.checked_mul(size)?;
            sparse.indices.component_type.read(bytes.get(start..)?)
        })
        .collect()
}

fn check_indices(index: usize, accessor: &Accessor, indices: &[u32], findings: &mut Findings) {
    if let Some(position) = indices.windows(2).position(|pair| pair[1] <= pair[0]) {
        findings.push(ValidationError::NonMonotonicSparseIndices {
            accessor: index,
            position: position + 1,
            previous: indices[position],
            current: indices[position + 1],
        });
    }
    if let Some((position, &value)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &value)| value as usize >= accessor.count)
    {
        findings.push(ValidationError::SparseIndexOutOfRange {
            accessor: index,
            position,
            index: value,
            count: accessor.count,
        });
    }
}
