use approx::assert_relative_eq;
use nalgebra::Vector3;
use tau::envelope::{EnvelopeRequest, SolveError, sample_envelope, solve_direction};
use tau::thruster::{CurrentCurve, Thruster, ThrusterDefaults};

fn t200(position: [f64; 3], orientation: [f64; 3]) -> Thruster {
    let d = ThrusterDefaults::default();
    Thruster::new(
        Vector3::new(position[0], position[1], position[2]),
        Vector3::new(orientation[0], orientation[1], orientation[2]),
        (d.max_thrusts[0], d.max_thrusts[1]),
        d.fwd_current.into(),
        d.rev_current.into(),
    )
    .unwrap()
}

/// Vectored quad in the x-y plane, mirror-symmetric through the x-z plane.
fn vectored_quad() -> Vec<Thruster> {
    vec![
        t200([1.0, 1.0, 0.0], [1.0, -1.0, 0.0]),
        t200([1.0, -1.0, 0.0], [1.0, 1.0, 0.0]),
        t200([-1.0, 1.0, 0.0], [-1.0, -1.0, 0.0]),
        t200([-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0]),
    ]
}

#[test]
fn single_origin_thruster_reaches_its_forward_bound() {
    // torque arm is zero, so the torque constraints are vacuous and only
    // the bollard bound limits the solve
    let thrusters = vec![t200([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])];
    let solution = solve_direction(&thrusters, Vector3::x(), 1_000.0).unwrap();
    assert_relative_eq!(solution.raw_magnitude, 0.999 * 3.71, epsilon = 1e-6);
    assert_relative_eq!(solution.scale, 1.0, epsilon = 1e-12);
    assert_relative_eq!(solution.magnitude, 0.999 * 3.71, epsilon = 1e-6);
}

#[test]
fn twin_surge_pair_sums_bounds_and_derates_under_budget() {
    let thrusters = vec![
        t200([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        t200([0.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    // generous budget: the full 2 x 3.71 kgf pair is available
    let unlimited = solve_direction(&thrusters, Vector3::x(), 1_000.0).unwrap();
    assert_relative_eq!(unlimited.raw_magnitude, 0.999 * 7.42, epsilon = 1e-6);
    assert_relative_eq!(unlimited.scale, 1.0, epsilon = 1e-12);

    // the stock 22 A budget cannot sustain both thrusters at bollard
    let derated = solve_direction(&thrusters, Vector3::x(), 22.0).unwrap();
    assert!(derated.scale < 1.0, "scale = {}", derated.scale);
    assert!(derated.magnitude < unlimited.magnitude);

    // shrinking the budget keeps shrinking the result
    let tighter = solve_direction(&thrusters, Vector3::x(), 15.0).unwrap();
    assert!(tighter.magnitude < derated.magnitude);
}

#[test]
fn achievable_thrust_is_monotonic_in_budget() {
    let thrusters = vectored_quad();
    let direction = Vector3::new(1.0, 0.3, 0.0);
    let mut previous = 0.0;
    for budget in [6.0, 10.0, 16.0, 22.0, 40.0, 200.0] {
        let solution = solve_direction(&thrusters, direction, budget).unwrap();
        assert!(
            solution.magnitude >= previous - 1e-9,
            "budget {budget}: {} < {previous}",
            solution.magnitude
        );
        previous = solution.magnitude;
    }
}

#[test]
fn mirror_symmetric_layout_gives_mirror_symmetric_envelope() {
    let thrusters = vectored_quad();
    for (a, b) in [
        (
            Vector3::new(0.5, 0.7, 0.0),
            Vector3::new(0.5, -0.7, 0.0),
        ),
        (
            Vector3::new(1.0, 0.2, 0.0),
            Vector3::new(1.0, -0.2, 0.0),
        ),
    ] {
        let lhs = solve_direction(&thrusters, a, 22.0).unwrap();
        let rhs = solve_direction(&thrusters, b, 22.0).unwrap();
        assert_relative_eq!(lhs.magnitude, rhs.magnitude, epsilon = 1e-6);
    }
}

#[test]
fn aggregate_draw_matches_per_thruster_sum() {
    let thrusters = vectored_quad();
    let solution = solve_direction(&thrusters, Vector3::new(1.0, 0.4, 0.0), 22.0).unwrap();
    let independent: f64 = solution
        .thrusts
        .iter()
        .zip(&thrusters)
        .map(|(&thrust, thruster)| thruster.current_draw(thrust))
        .sum();
    assert_relative_eq!(solution.quadratic.amps_at(1.0), independent, epsilon = 1e-9);
}

#[test]
fn zero_direction_is_a_degenerate_input() {
    let thrusters = vec![t200([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])];
    let err = solve_direction(&thrusters, Vector3::zeros(), 22.0).unwrap_err();
    assert!(matches!(err, SolveError::Degenerate(_)));
}

/// Layout whose constant current draw exceeds any budget: every sample
/// fails the derating stage.
fn hungry_layout() -> Vec<Thruster> {
    vec![
        Thruster::new(
            Vector3::zeros(),
            Vector3::x(),
            (-2.9, 3.71),
            CurrentCurve {
                a: 0.0,
                b: 0.0,
                c: 50.0,
            },
            CurrentCurve {
                a: 0.0,
                b: 0.0,
                c: 50.0,
            },
        )
        .unwrap(),
    ]
}

#[test]
fn sweep_failure_aborts_with_sample_context() {
    let thrusters = hungry_layout();
    let request = EnvelopeRequest {
        thrusters: &thrusters,
        resolution: 6,
        max_current: 22.0,
        keep_partial: false,
    };
    let err = sample_envelope(&request).unwrap_err();
    assert_eq!((err.lon_index, err.colat_index), (0, 0));
    assert!(matches!(err.source, SolveError::CurrentInfeasible(_)));
}

#[test]
fn partial_mode_marks_failed_cells_invalid_not_zero() {
    let thrusters = hungry_layout();
    let request = EnvelopeRequest {
        thrusters: &thrusters,
        resolution: 6,
        max_current: 22.0,
        keep_partial: true,
    };
    let outcome = sample_envelope(&request).unwrap();
    let cells = outcome.mesh.lon_count * outcome.mesh.colat_count;
    assert_eq!(outcome.failures.len(), cells);
    assert!(outcome.mesh.magnitude.iter().all(|m| m.is_nan()));
}
