//! Foundational math shared across the thruster arrangement utility:
//! spherical-angle conversions and target-aligned orthonormal frames.
//!
//! Deliberately restricted to `nalgebra`'s fixed-size `Vector3`/`Matrix3`
//! types so the numeric behavior of the core stays small and auditable.

pub mod frame;
pub mod sphere;

pub use frame::{DegenerateDirectionError, TargetFrame};
