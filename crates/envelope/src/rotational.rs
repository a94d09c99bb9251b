//! Torque capability about the principal axes.
//!
//! The same linear-program pattern as the force envelope with objective and
//! constraint roles swapped: net torque about one axis is maximized while
//! the other two torque axes and all three force axes are held at zero. No
//! basis transform is needed since the principal axes are already the
//! frame, and no current derating is applied on this path.

use tau_lp::LpProblem;
use tau_thruster::Thruster;

use crate::SolveError;

/// Net torque capability about one principal axis, in kgf·m.
#[derive(Debug, Clone, Copy)]
pub struct AxisTorque {
    /// Maximum torque in the positive rotation sense.
    pub positive: f64,
    /// Maximum torque magnitude in the negative sense, reported ≥ 0.
    pub negative: f64,
}

/// Torque capability about x (roll), y (pitch), z (yaw).
#[derive(Debug, Clone, Copy)]
pub struct RotationalEnvelope {
    pub roll: AxisTorque,
    pub pitch: AxisTorque,
    pub yaw: AxisTorque,
}

/// Solve all six torque programs (both senses per axis).
pub fn rotational_envelope(thrusters: &[Thruster]) -> Result<RotationalEnvelope, SolveError> {
    let mut axes = [AxisTorque {
        positive: 0.0,
        negative: 0.0,
    }; 3];
    for (axis, entry) in axes.iter_mut().enumerate() {
        *entry = AxisTorque {
            positive: solve_axis(thrusters, axis, 1.0)?,
            negative: solve_axis(thrusters, axis, -1.0)?,
        };
    }
    Ok(RotationalEnvelope {
        roll: axes[0],
        pitch: axes[1],
        yaw: axes[2],
    })
}

fn solve_axis(thrusters: &[Thruster], axis: usize, sense: f64) -> Result<f64, SolveError> {
    let mut lp = LpProblem::new();
    for thruster in thrusters {
        let (min, max) = thruster.thrust_bounds();
        // maximize sense-signed torque by minimizing its negation
        lp.add_variable(-sense * thruster.torque_arm()[axis], min, max);
    }

    for other in 0..3 {
        if other == axis {
            continue;
        }
        lp.add_equality(
            thrusters.iter().map(|t| t.torque_arm()[other]).collect(),
            0.0,
        );
    }
    for force_axis in 0..3 {
        lp.add_equality(
            thrusters
                .iter()
                .map(|t| t.orientation()[force_axis])
                .collect(),
            0.0,
        );
    }

    let solution = lp.solve().map_err(SolveError::Rotational)?;
    Ok(-solution.objective)
}
