//! Runtime thruster model used by the envelope solvers.
//!
//! A [`Thruster`] is immutable once built: the torque arm is derived from
//! position and orientation in the constructor and cached for every
//! directional sample afterwards.

use nalgebra::Vector3;
use tau_config::ThrusterRecord;
use tau_core::sphere;
use thiserror::Error;

/// Quadratic approximation of current draw as a function of thrust
/// magnitude: `a·|t|² + b·|t| + c` amps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CurrentCurve {
    /// Draw in amps at the given thrust magnitude.
    pub fn amps(&self, thrust_magnitude: f64) -> f64 {
        self.a * thrust_magnitude * thrust_magnitude + self.b * thrust_magnitude + self.c
    }
}

impl From<[f64; 3]> for CurrentCurve {
    fn from([a, b, c]: [f64; 3]) -> Self {
        Self { a, b, c }
    }
}

/// Defaults applied when a record omits optional fields.
///
/// The stock values are lifted from the BlueRobotics T200 public
/// performance data (kgf thrust, amps at 16 V).
#[derive(Debug, Clone)]
pub struct ThrusterDefaults {
    pub max_thrusts: [f64; 2],
    pub fwd_current: [f64; 3],
    pub rev_current: [f64; 3],
}

impl Default for ThrusterDefaults {
    fn default() -> Self {
        Self {
            max_thrusts: [-2.9, 3.71],
            fwd_current: [0.741, 1.89, -0.278],
            rev_current: [1.36, 2.04, -0.231],
        }
    }
}

/// Semantic violations in a single thruster's parameters.
#[derive(Debug, Error)]
pub enum ThrusterError {
    #[error("orientation vector has zero length")]
    DegenerateOrientation,
    #[error("thrust bounds ({min}, {max}) must satisfy min <= 0 <= max and min < max")]
    InvalidBounds { min: f64, max: f64 },
}

/// Layout-level conversion failure, carrying the offending record index.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout contains no thrusters")]
    Empty,
    #[error("thruster {index}: {source}")]
    Thruster {
        index: usize,
        #[source]
        source: ThrusterError,
    },
}

/// Immutable per-thruster geometry and electrical parameters.
#[derive(Debug, Clone)]
pub struct Thruster {
    position: Vector3<f64>,
    orientation: Vector3<f64>,
    min_thrust: f64,
    max_thrust: f64,
    fwd_current: CurrentCurve,
    rev_current: CurrentCurve,
    torque_arm: Vector3<f64>,
}

impl Thruster {
    /// Build a thruster from raw vectors. The orientation is normalized;
    /// a zero-length orientation or inverted bounds are rejected.
    pub fn new(
        position: Vector3<f64>,
        orientation: Vector3<f64>,
        thrust_bounds: (f64, f64),
        fwd_current: CurrentCurve,
        rev_current: CurrentCurve,
    ) -> Result<Self, ThrusterError> {
        let norm = orientation.norm();
        if norm < 1e-12 {
            return Err(ThrusterError::DegenerateOrientation);
        }
        let orientation = orientation / norm;

        let (min, max) = thrust_bounds;
        if !(min <= 0.0 && 0.0 <= max && min < max) {
            return Err(ThrusterError::InvalidBounds { min, max });
        }

        // Torque per unit thrust about the vehicle origin; fixed for the
        // life of the layout, so derived once here.
        let torque_arm = position.cross(&orientation);

        Ok(Self {
            position,
            orientation,
            min_thrust: min,
            max_thrust: max,
            fwd_current,
            rev_current,
            torque_arm,
        })
    }

    /// Convert a parsed record, filling omitted fields from `defaults`.
    pub fn from_record(
        record: &ThrusterRecord,
        defaults: &ThrusterDefaults,
    ) -> Result<Self, ThrusterError> {
        let [min, max] = record.max_thrusts.unwrap_or(defaults.max_thrusts);
        Self::new(
            Vector3::new(record.x, record.y, record.z),
            sphere::orientation_from_degrees(record.theta, record.phi),
            (min, max),
            record.fwd_current.unwrap_or(defaults.fwd_current).into(),
            record.rev_current.unwrap_or(defaults.rev_current).into(),
        )
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    /// Unit vector along positive (forward) thrust.
    pub fn orientation(&self) -> Vector3<f64> {
        self.orientation
    }

    /// (min, max) signed thrust limits in kgf.
    pub fn thrust_bounds(&self) -> (f64, f64) {
        (self.min_thrust, self.max_thrust)
    }

    /// Cached `position × orientation`.
    pub fn torque_arm(&self) -> Vector3<f64> {
        self.torque_arm
    }

    /// Current curve matching the sign of `thrust`.
    pub fn current_curve(&self, thrust: f64) -> &CurrentCurve {
        if thrust >= 0.0 {
            &self.fwd_current
        } else {
            &self.rev_current
        }
    }

    /// Electrical draw in amps for a signed thrust value.
    pub fn current_draw(&self, thrust: f64) -> f64 {
        self.current_curve(thrust).amps(thrust.abs())
    }
}

/// Convert a whole layout, reporting the first invalid record by index.
pub fn layout_from_records(
    records: &[ThrusterRecord],
    defaults: &ThrusterDefaults,
) -> Result<Vec<Thruster>, LayoutError> {
    if records.is_empty() {
        return Err(LayoutError::Empty);
    }
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Thruster::from_record(record, defaults)
                .map_err(|source| LayoutError::Thruster { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn t200(position: Vector3<f64>, orientation: Vector3<f64>) -> Thruster {
        let defaults = ThrusterDefaults::default();
        Thruster::new(
            position,
            orientation,
            (defaults.max_thrusts[0], defaults.max_thrusts[1]),
            defaults.fwd_current.into(),
            defaults.rev_current.into(),
        )
        .unwrap()
    }

    #[test]
    fn torque_arm_is_position_cross_orientation() {
        let thruster = t200(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let arm = thruster.torque_arm();
        assert_relative_eq!(arm.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arm.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arm.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn origin_mounted_thruster_has_zero_arm() {
        let thruster = t200(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(thruster.torque_arm().norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn current_curve_selection_by_sign() {
        let thruster = t200(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0));
        // T200 data: forward and reverse draws differ at the same magnitude
        let fwd = thruster.current_draw(1.0);
        let rev = thruster.current_draw(-1.0);
        assert_relative_eq!(fwd, 0.741 + 1.89 - 0.278, epsilon = 1e-12);
        assert_relative_eq!(rev, 1.36 + 2.04 - 0.231, epsilon = 1e-12);
    }

    #[test]
    fn record_defaults_apply_per_field() {
        let record = tau_config::ThrusterRecord {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            theta: 0.0,
            phi: 90.0,
            max_thrusts: Some([-1.0, 2.0]),
            fwd_current: None,
            rev_current: None,
        };
        let thruster = Thruster::from_record(&record, &ThrusterDefaults::default()).unwrap();
        assert_eq!(thruster.thrust_bounds(), (-1.0, 2.0));
        assert_relative_eq!(thruster.current_curve(1.0).a, 0.741, epsilon = 1e-12);
    }

    #[test]
    fn inverted_bounds_are_rejected_with_index() {
        let good = tau_config::ThrusterRecord {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            theta: 0.0,
            phi: 90.0,
            max_thrusts: None,
            fwd_current: None,
            rev_current: None,
        };
        let mut bad = good.clone();
        bad.max_thrusts = Some([1.0, -1.0]);
        let err = layout_from_records(&[good, bad], &ThrusterDefaults::default()).unwrap_err();
        match err {
            LayoutError::Thruster { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_layout_is_rejected() {
        let err = layout_from_records(&[], &ThrusterDefaults::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Empty));
    }
}
