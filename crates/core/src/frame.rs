//! Orthonormal frames aligned with a requested target direction.
//!
//! The envelope solvers need every thruster orientation re-expressed in a
//! basis whose first axis is the target direction, so that "thrust along the
//! target" is simply the first component.

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Error when a direction vector is too short to normalize.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("degenerate direction: |v| = {norm:.6e}")]
pub struct DegenerateDirectionError {
    pub norm: f64,
}

const NORM_EPSILON: f64 = 1e-12;

/// Orthonormal basis whose first axis is the normalized target direction.
///
/// Holds the world→frame mapping; the basis is a pure rotation, so the
/// mapping introduces no scaling.
#[derive(Debug, Clone)]
pub struct TargetFrame {
    target: Vector3<f64>,
    world_to_frame: Matrix3<f64>,
}

impl TargetFrame {
    /// Build the frame for `target`, which need not be pre-normalized.
    pub fn new(target: Vector3<f64>) -> Result<Self, DegenerateDirectionError> {
        let norm = target.norm();
        if norm < NORM_EPSILON {
            return Err(DegenerateDirectionError { norm });
        }
        let target = target / norm;

        // cross(target, x̂) collapses when the target is parallel to x̂
        let reference = if target.y == 0.0 && target.z == 0.0 {
            Vector3::y()
        } else {
            Vector3::x()
        };
        let second = target.cross(&reference).normalize();
        let third = target.cross(&second).normalize();

        // Columns map the canonical frame onto the new one; the solvers need
        // the inverse mapping. Orthonormal columns, so the inverse exists.
        let frame_to_world = Matrix3::from_columns(&[target, second, third]);
        let world_to_frame = frame_to_world
            .try_inverse()
            .ok_or(DegenerateDirectionError { norm })?;

        Ok(Self {
            target,
            world_to_frame,
        })
    }

    /// The normalized target direction (the frame's first axis).
    pub fn target(&self) -> Vector3<f64> {
        self.target
    }

    /// Express a world-frame vector in this frame.
    pub fn world_to_frame(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.world_to_frame * v
    }
}
