//! Accessor and buffer view layout rules.

use gltf_core::{Bounds, ValidationError};

use crate::rules::{Context, Findings};

pub(crate) fn accessor_bounds(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, accessor) in ctx.doc.accessors.iter().enumerate() {
        let expected = accessor.accessor_type.component_count();
        let bounds: [(&'static str, Option<&Bounds>); 2] =
            [("min", accessor.min.as_ref()), ("max", accessor.max.as_ref())];
        for (field, values) in bounds {
            if let Some(values) = values {
                if values.len() != expected {
                    findings.push(ValidationError::AccessorBoundsMismatch {
                        accessor: index,
                        field,
                        expected,
                        found: values.len(),
                    });
                }
            }
        }
    }
}

pub(crate) fn buffer_view_range(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, view) in ctx.doc.buffer_views.iter().enumerate() {
        let Some(buffer) = ctx.doc.buffers.get(view.buffer) else {
            continue;
        };
        let end = view.byte_offset.saturating_add(view.byte_length);
        if end > buffer.byte_length {
            findings.push(ValidationError::BufferViewOutOfRange {
                buffer_view: index,
                end,
                buffer: view.buffer,
                byte_length: buffer.byte_length,
            });
        }
    }
}
