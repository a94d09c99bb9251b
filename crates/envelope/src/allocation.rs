//! The two sequential linear programs at the heart of the envelope:
//! maximum constrained thrust along the target axis, then the minimum
//! summed-magnitude allocation that reproduces it.

use nalgebra::Vector3;
use tau_core::TargetFrame;
use tau_lp::LpProblem;
use tau_thruster::Thruster;

use crate::SolveError;

/// Fraction of the raw max-thrust optimum carried into the allocator's
/// equality target. Handing the allocator the literal optimum occasionally
/// lands infeasible on floating-point residue.
pub const TARGET_SHAVE: f64 = 0.999;

/// Every thruster orientation re-expressed in the target frame, first
/// component along the target axis.
pub fn transformed_orientations(
    thrusters: &[Thruster],
    frame: &TargetFrame,
) -> Vec<Vector3<f64>> {
    thrusters
        .iter()
        .map(|thruster| frame.world_to_frame(&thruster.orientation()))
        .collect()
}

/// Maximum net thrust along the frame's target axis with zero net off-axis
/// force and zero net torque, shaved by [`TARGET_SHAVE`].
///
/// One variable per thruster (signed thrust along its own axis) bounded by
/// its thrust limits. The torque rows use the world-frame torque arms:
/// torque constraints are direction-independent.
pub fn max_thrust_along(
    thrusters: &[Thruster],
    orientations: &[Vector3<f64>],
) -> Result<f64, SolveError> {
    let mut lp = LpProblem::new();
    for (thruster, orientation) in thrusters.iter().zip(orientations) {
        let (min, max) = thruster.thrust_bounds();
        // the backend minimizes, so the along-axis objective is negated
        lp.add_variable(-orientation.x, min, max);
    }

    lp.add_equality(orientations.iter().map(|o| o.y).collect(), 0.0);
    lp.add_equality(orientations.iter().map(|o| o.z).collect(), 0.0);
    for axis in 0..3 {
        lp.add_equality(
            thrusters.iter().map(|t| t.torque_arm()[axis]).collect(),
            0.0,
        );
    }

    let solution = lp.solve().map_err(SolveError::MaxThrust)?;
    Ok(-TARGET_SHAVE * solution.objective)
}

/// Signed per-thruster allocation achieving `target_thrust` along the frame
/// axis with minimum total thrust magnitude.
///
/// Minimizing Σ|t_i| is linearized with the half-thruster split: each
/// thruster becomes a forward variable in [0, max] and a reverse variable
/// in [0, −min], net thrust forward − reverse, objective the unweighted sum
/// of all halves. The optimum never loads both halves of a pair, so the
/// recombination is lossless.
pub fn min_current_allocation(
    thrusters: &[Thruster],
    orientations: &[Vector3<f64>],
    target_thrust: f64,
) -> Result<Vec<f64>, SolveError> {
    let mut lp = LpProblem::new();
    for thruster in thrusters {
        let (min, max) = thruster.thrust_bounds();
        lp.add_variable(1.0, 0.0, max);
        lp.add_variable(1.0, 0.0, -min);
    }

    lp.add_equality(half_row(orientations.iter().map(|o| o.x)), target_thrust);
    lp.add_equality(half_row(orientations.iter().map(|o| o.y)), 0.0);
    lp.add_equality(half_row(orientations.iter().map(|o| o.z)), 0.0);
    for axis in 0..3 {
        lp.add_equality(
            half_row(thrusters.iter().map(|t| t.torque_arm()[axis])),
            0.0,
        );
    }

    let solution = lp.solve().map_err(SolveError::MinCurrent)?;
    Ok(solution
        .values
        .chunks_exact(2)
        .map(|pair| pair[0] - pair[1])
        .collect())
}

/// Duplicate each coefficient with its negation for the reverse half.
fn half_row(coefficients: impl Iterator<Item = f64>) -> Vec<f64> {
    coefficients.flat_map(|c| [c, -c]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tau_thruster::ThrusterDefaults;

    fn t200(position: Vector3<f64>, orientation: Vector3<f64>) -> Thruster {
        let d = ThrusterDefaults::default();
        Thruster::new(
            position,
            orientation,
            (d.max_thrusts[0], d.max_thrusts[1]),
            d.fwd_current.into(),
            d.rev_current.into(),
        )
        .unwrap()
    }

    #[test]
    fn single_thruster_reaches_forward_bound() {
        let thrusters = vec![t200(Vector3::zeros(), Vector3::x())];
        let frame = TargetFrame::new(Vector3::x()).unwrap();
        let orientations = transformed_orientations(&thrusters, &frame);
        let max = max_thrust_along(&thrusters, &orientations).unwrap();
        assert_relative_eq!(max, TARGET_SHAVE * 3.71, epsilon = 1e-6);
    }

    #[test]
    fn allocation_reproduces_target_without_overlap() {
        let thrusters = vec![
            t200(Vector3::new(0.0, 1.0, 0.0), Vector3::x()),
            t200(Vector3::new(0.0, -1.0, 0.0), Vector3::x()),
        ];
        let frame = TargetFrame::new(Vector3::x()).unwrap();
        let orientations = transformed_orientations(&thrusters, &frame);
        let target = max_thrust_along(&thrusters, &orientations).unwrap();
        let thrusts = min_current_allocation(&thrusters, &orientations, target).unwrap();

        let achieved: f64 = thrusts
            .iter()
            .zip(&orientations)
            .map(|(t, o)| t * o.x)
            .sum();
        assert_relative_eq!(achieved, target, epsilon = 1e-6);
        // symmetric surge pair: both thrusters forward, equal share
        assert_relative_eq!(thrusts[0], thrusts[1], epsilon = 1e-6);
        assert!(thrusts.iter().all(|&t| t >= -1e-9));
    }

    #[test]
    fn off_axis_and_torque_stay_zero() {
        // L-shaped layout that could torque if unconstrained
        let thrusters = vec![
            t200(Vector3::new(1.0, 1.0, 0.0), Vector3::x()),
            t200(Vector3::new(-1.0, -1.0, 0.0), Vector3::x()),
            t200(Vector3::new(1.0, -1.0, 0.0), Vector3::y()),
            t200(Vector3::new(-1.0, 1.0, 0.0), Vector3::y()),
        ];
        let frame = TargetFrame::new(Vector3::new(1.0, 1.0, 0.0)).unwrap();
        let orientations = transformed_orientations(&thrusters, &frame);
        let target = max_thrust_along(&thrusters, &orientations).unwrap();
        let thrusts = min_current_allocation(&thrusters, &orientations, target).unwrap();

        let off_y: f64 = thrusts.iter().zip(&orientations).map(|(t, o)| t * o.y).sum();
        let off_z: f64 = thrusts.iter().zip(&orientations).map(|(t, o)| t * o.z).sum();
        assert_relative_eq!(off_y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(off_z, 0.0, epsilon = 1e-6);

        for axis in 0..3 {
            let torque: f64 = thrusts
                .iter()
                .zip(&thrusters)
                .map(|(t, thruster)| t * thruster.torque_arm()[axis])
                .sum();
            assert_relative_eq!(torque, 0.0, epsilon = 1e-6);
        }
    }
}
