//! Camera projection rules.

use gltf_core::{Projection, ValidationError};

use crate::rules::{Context, Findings};

pub(crate) fn projection(ctx: &Context<'_>, findings: &mut Findings) {
    for (index, camera) in ctx.doc.cameras.iter().enumerate() {
        for reason in projection_problems(&camera.projection) {
            findings.push(ValidationError::InvalidCamera {
                camera: index,
                reason,
            });
        }
    }
}

fn projection_problems(projection: &Projection) -> Vec<String> {
    let mut problems = Vec::new();
    match projection {
        Projection::Perspective(p) => {
            if p.yfov <= 0.0 {
                problems.push(format!("yfov must be positive, found {}", p.yfov));
            }
            if p.znear <= 0.0 {
                problems.push(format!("znear must be positive, found {}", p.znear));
            }
            if let Some(aspect_ratio) = p.aspect_ratio {
                if aspect_ratio <= 0.0 {
                    problems.push(format!("aspectRatio must be positive, found {}", aspect_ratio));
                }
            }
            if let Some(zfar) = p.zfar {
                if zfar <= p.znear {
                    problems.push(format!("zfar {} must be greater than znear {}", zfar, p.znear));
                }
            }
        }
        Projection::Orthographic(o) => {
            if o.xmag == 0.0 {
                problems.push("xmag must not be zero".to_string());
            }
            if o.ymag == 0.0 {
                problems.push("ymag must not be zero".to_string());
            }
            if o.znear < 0.0 {
                problems.push(format!("znear must not be negative, found {}", o.znear));
            }
            if o.zfar <= o.znear {
                problems.push(format!("zfar {} must be greater than znear {}", o.zfar, o.znear));
            }
        }
    }
    problems
}
