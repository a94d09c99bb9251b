//! Thrust-envelope core: the per-direction allocation pipeline and the
//! spherical sweep that turns it into a capability surface.
//!
//! For one direction the pipeline runs the target-frame transform, the
//! max-thrust linear program, the min-current allocation, and current
//! derating, in that order. The sampler repeats it over a
//! longitude/colatitude grid.

pub mod allocation;
pub mod derate;
pub mod rotational;
pub mod sampler;

use nalgebra::Vector3;
use tau_core::{DegenerateDirectionError, TargetFrame};
use tau_lp::LpError;
use tau_thruster::Thruster;
use thiserror::Error;

pub use derate::{CurrentInfeasibleError, DeratingQuadratic};
pub use rotational::{AxisTorque, RotationalEnvelope, rotational_envelope};
pub use sampler::{
    EnvelopeMesh, EnvelopeRequest, FailedSample, SweepError, SweepOutcome, sample_envelope,
};

/// Failure of the single-direction pipeline.
///
/// Solver failures are terminal: an infeasible or unbounded program on a
/// well-posed layout indicates a configuration or numerical problem, so
/// they propagate instead of being retried or defaulted.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("degenerate target direction: {0}")]
    Degenerate(#[from] DegenerateDirectionError),
    #[error("max-thrust program failed: {0}")]
    MaxThrust(#[source] LpError),
    #[error("min-current program failed: {0}")]
    MinCurrent(#[source] LpError),
    #[error("torque program failed: {0}")]
    Rotational(#[source] LpError),
    #[error(transparent)]
    CurrentInfeasible(#[from] CurrentInfeasibleError),
}

/// Fully solved single direction.
#[derive(Debug, Clone)]
pub struct DirectionSolution {
    /// Signed per-thruster thrusts from the min-current allocation, before
    /// derating is applied.
    pub thrusts: Vec<f64>,
    /// Net thrust along the target axis produced by `thrusts`.
    pub raw_magnitude: f64,
    /// Aggregate current draw as a quadratic in the shared derating scale.
    pub quadratic: DeratingQuadratic,
    /// Derating scale in [0, 1].
    pub scale: f64,
    /// Achievable thrust along the target direction after derating.
    pub magnitude: f64,
}

/// Run the whole pipeline for one target direction.
///
/// `direction` need not be normalized; a zero vector is a degenerate-input
/// error, never silently replaced with a default axis.
pub fn solve_direction(
    thrusters: &[Thruster],
    direction: Vector3<f64>,
    max_current: f64,
) -> Result<DirectionSolution, SolveError> {
    let frame = TargetFrame::new(direction)?;
    let orientations = allocation::transformed_orientations(thrusters, &frame);

    let target = allocation::max_thrust_along(thrusters, &orientations)?;
    let thrusts = allocation::min_current_allocation(thrusters, &orientations, target)?;

    let quadratic = DeratingQuadratic::aggregate(thrusters, &thrusts);
    let scale = quadratic.scale_for_budget(max_current)?;

    let raw_magnitude: f64 = thrusts
        .iter()
        .zip(&orientations)
        .map(|(thrust, orientation)| thrust * orientation.x)
        .sum();

    Ok(DirectionSolution {
        thrusts,
        raw_magnitude,
        quadratic,
        scale,
        magnitude: (raw_magnitude * scale).max(0.0),
    })
}
