//! Current derating: total electrical draw expressed as a quadratic in one
//! shared scale factor, solved against the global current budget.

use tau_thruster::Thruster;
use thiserror::Error;

/// No real, non-negative derating scale satisfies the current budget.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "no feasible derating scale for budget {budget} A (aggregate {a:.4}·s² + {b:.4}·s + {c:.4})"
)]
pub struct CurrentInfeasibleError {
    pub budget: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

const COEFF_EPSILON: f64 = 1e-12;

/// Aggregate current draw of an allocation as a quadratic in a scale `s`
/// applied uniformly to every thruster's thrust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeratingQuadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl DeratingQuadratic {
    /// Collect each thruster's sign-matched curve at its allocated thrust:
    /// `a·(s·t)² + b·(s·|t|) + c`, summed and re-grouped per power of `s`.
    /// This is a pure algebraic regrouping: evaluated at s = 1 it equals
    /// the sum of the per-thruster draws exactly.
    pub fn aggregate(thrusters: &[Thruster], thrusts: &[f64]) -> Self {
        let mut a = 0.0;
        let mut b = 0.0;
        let mut c = 0.0;
        for (thruster, &thrust) in thrusters.iter().zip(thrusts) {
            let curve = thruster.current_curve(thrust);
            let magnitude = thrust.abs();
            a += curve.a * magnitude * magnitude;
            b += curve.b * magnitude;
            c += curve.c;
        }
        Self { a, b, c }
    }

    /// Total draw in amps at scale `s`.
    pub fn amps_at(&self, s: f64) -> f64 {
        self.a * s * s + self.b * s + self.c
    }

    /// Largest scale in [0, 1] whose draw stays within `budget`.
    ///
    /// Solves `a·s² + b·s + (c − budget) = 0` and takes the larger real
    /// root. A negative discriminant, or a largest root below zero, means
    /// no non-negative scale meets the budget and is an error, never a
    /// silent zero that would be indistinguishable from a real result.
    /// The scale is clamped to 1.0: an allocation is derated, never
    /// amplified past the optimizer's solution.
    pub fn scale_for_budget(&self, budget: f64) -> Result<f64, CurrentInfeasibleError> {
        let shifted_c = self.c - budget;
        let infeasible = || CurrentInfeasibleError {
            budget,
            a: self.a,
            b: self.b,
            c: self.c,
        };

        let root = if self.a.abs() < COEFF_EPSILON {
            if self.b.abs() < COEFF_EPSILON {
                // constant draw: within budget at every scale or at none
                if shifted_c <= 0.0 {
                    return Ok(1.0);
                }
                return Err(infeasible());
            }
            -shifted_c / self.b
        } else {
            let discriminant = self.b * self.b - 4.0 * self.a * shifted_c;
            if discriminant < 0.0 {
                return Err(infeasible());
            }
            (-self.b + discriminant.sqrt()) / (2.0 * self.a)
        };

        if root < 0.0 {
            return Err(infeasible());
        }
        Ok(root.min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use tau_thruster::ThrusterDefaults;

    fn t200(orientation: Vector3<f64>) -> Thruster {
        let d = ThrusterDefaults::default();
        Thruster::new(
            Vector3::zeros(),
            orientation,
            (d.max_thrusts[0], d.max_thrusts[1]),
            d.fwd_current.into(),
            d.rev_current.into(),
        )
        .unwrap()
    }

    #[test]
    fn aggregate_at_unit_scale_matches_independent_sum() {
        let thrusters = vec![t200(Vector3::x()), t200(Vector3::y()), t200(Vector3::z())];
        let thrusts = [3.1, -1.7, 0.4];
        let quadratic = DeratingQuadratic::aggregate(&thrusters, &thrusts);

        let independent: f64 = thrusters
            .iter()
            .zip(&thrusts)
            .map(|(thruster, &t)| thruster.current_draw(t))
            .sum();
        assert_relative_eq!(quadratic.amps_at(1.0), independent, epsilon = 1e-12);
    }

    #[test]
    fn generous_budget_clamps_to_one() {
        let thrusters = vec![t200(Vector3::x())];
        let quadratic = DeratingQuadratic::aggregate(&thrusters, &[1.0]);
        let scale = quadratic.scale_for_budget(1_000.0).unwrap();
        assert_relative_eq!(scale, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn tight_budget_derates_below_one() {
        let thrusters = vec![t200(Vector3::x())];
        let thrusts = [3.71];
        let quadratic = DeratingQuadratic::aggregate(&thrusters, &thrusts);
        let full_draw = quadratic.amps_at(1.0);

        let scale = quadratic.scale_for_budget(full_draw * 0.5).unwrap();
        assert!(scale < 1.0 && scale > 0.0, "scale = {scale}");
        assert_relative_eq!(quadratic.amps_at(scale), full_draw * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn scale_is_monotonic_in_budget() {
        let thrusters = vec![t200(Vector3::x()), t200(Vector3::x())];
        let thrusts = [3.71, 3.71];
        let quadratic = DeratingQuadratic::aggregate(&thrusters, &thrusts);

        let mut previous = 0.0;
        for budget in [4.0, 8.0, 12.0, 16.0, 20.0] {
            let scale = quadratic.scale_for_budget(budget).unwrap();
            assert!(scale >= previous, "budget {budget}: {scale} < {previous}");
            previous = scale;
        }
    }

    #[test]
    fn zero_allocation_within_budget_needs_no_derating() {
        let thrusters = vec![t200(Vector3::x())];
        let quadratic = DeratingQuadratic::aggregate(&thrusters, &[0.0]);
        // T200 curves have negative constant terms, so the zero allocation
        // draws "nothing" and any budget is enough
        assert_relative_eq!(quadratic.scale_for_budget(0.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn impossible_budget_is_an_error() {
        // constant-only quadratic over budget: no scale can help
        let quadratic = DeratingQuadratic {
            a: 0.0,
            b: 0.0,
            c: 5.0,
        };
        let err = quadratic.scale_for_budget(1.0).unwrap_err();
        assert_relative_eq!(err.budget, 1.0, epsilon = 1e-12);
    }
}
