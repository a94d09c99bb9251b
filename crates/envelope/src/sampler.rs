//! Spherical sweep driving the per-direction pipeline over a grid.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;
use tau_core::sphere;
use tau_thruster::Thruster;
use thiserror::Error;

use crate::{SolveError, solve_direction};

/// Inputs for a full envelope sweep.
///
/// Runtime is O(resolution²): every grid cell costs a basis transform and
/// two linear programs, so doubling the resolution quadruples the work.
#[derive(Debug, Clone)]
pub struct EnvelopeRequest<'a> {
    pub thrusters: &'a [Thruster],
    /// Longitude sample count; colatitude uses half as many (minimum 2).
    pub resolution: usize,
    /// Global electrical budget in amps.
    pub max_current: f64,
    /// Mark failed cells invalid and keep sweeping instead of aborting.
    pub keep_partial: bool,
}

/// Sampled thrust-envelope surface.
///
/// Grids are row-major, longitude-major: cell (i, j) lives at index
/// `i * colat_count + j`. Each cell holds the sample direction scaled by
/// the achievable magnitude. Cells that failed in partial-results mode
/// hold NaN, never zero: zero is a valid thrust value.
#[derive(Debug, Clone)]
pub struct EnvelopeMesh {
    pub lon_count: usize,
    pub colat_count: usize,
    /// Longitude of each column, [0, 2π), open at the seam.
    pub lons: Vec<f64>,
    /// Colatitude of each row, [0, π] inclusive, measured from +x.
    pub colats: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub magnitude: Vec<f64>,
    /// Running maximum over all valid cells.
    pub max_magnitude: f64,
}

impl EnvelopeMesh {
    fn zeroed(lons: Vec<f64>, colats: Vec<f64>) -> Self {
        let cells = lons.len() * colats.len();
        Self {
            lon_count: lons.len(),
            colat_count: colats.len(),
            lons,
            colats,
            x: vec![0.0; cells],
            y: vec![0.0; cells],
            z: vec![0.0; cells],
            magnitude: vec![0.0; cells],
            max_magnitude: 0.0,
        }
    }

    /// Flat index of grid cell (lon_index, colat_index).
    pub fn index(&self, lon_index: usize, colat_index: usize) -> usize {
        lon_index * self.colat_count + colat_index
    }
}

/// A failed grid cell retained in partial-results mode.
#[derive(Debug)]
pub struct FailedSample {
    pub lon_index: usize,
    pub colat_index: usize,
    pub direction: Vector3<f64>,
    pub error: SolveError,
}

/// A sweep abort carrying the grid cell and direction that triggered it, so
/// failures can be correlated with specific vehicle orientations.
#[derive(Debug, Error)]
#[error(
    "sample ({lon_index}, {colat_index}) toward ({dir_x:.4}, {dir_y:.4}, {dir_z:.4}): {source}"
)]
pub struct SweepError {
    pub lon_index: usize,
    pub colat_index: usize,
    pub dir_x: f64,
    pub dir_y: f64,
    pub dir_z: f64,
    #[source]
    pub source: SolveError,
}

/// Mesh plus the failures collected in partial-results mode (empty when the
/// sweep was clean or aborting).
#[derive(Debug)]
pub struct SweepOutcome {
    pub mesh: EnvelopeMesh,
    pub failures: Vec<FailedSample>,
}

/// Sweep the envelope over the spherical grid.
///
/// Aborts on the first failed sample unless `keep_partial` was requested,
/// in which case the failed cells are NaN and reported in the outcome.
pub fn sample_envelope(request: &EnvelopeRequest<'_>) -> Result<SweepOutcome, SweepError> {
    let lon_count = request.resolution.max(1);
    let colat_count = (request.resolution / 2).max(2);

    let lons: Vec<f64> = (0..lon_count)
        .map(|i| i as f64 * TAU / lon_count as f64)
        .collect();
    let colats: Vec<f64> = (0..colat_count)
        .map(|j| j as f64 * PI / (colat_count - 1) as f64)
        .collect();

    let mut mesh = EnvelopeMesh::zeroed(lons, colats);
    let mut failures = Vec::new();

    for i in 0..mesh.lon_count {
        for j in 0..mesh.colat_count {
            let direction = sphere::grid_direction(mesh.lons[i], mesh.colats[j]);
            let k = mesh.index(i, j);
            match solve_direction(request.thrusters, direction, request.max_current) {
                Ok(solution) => {
                    mesh.x[k] = direction.x * solution.magnitude;
                    mesh.y[k] = direction.y * solution.magnitude;
                    mesh.z[k] = direction.z * solution.magnitude;
                    mesh.magnitude[k] = solution.magnitude;
                    mesh.max_magnitude = mesh.max_magnitude.max(solution.magnitude);
                }
                Err(error) if request.keep_partial => {
                    mesh.x[k] = f64::NAN;
                    mesh.y[k] = f64::NAN;
                    mesh.z[k] = f64::NAN;
                    mesh.magnitude[k] = f64::NAN;
                    failures.push(FailedSample {
                        lon_index: i,
                        colat_index: j,
                        direction,
                        error,
                    });
                }
                Err(source) => {
                    return Err(SweepError {
                        lon_index: i,
                        colat_index: j,
                        dir_x: direction.x,
                        dir_y: direction.y,
                        dir_z: direction.z,
                        source,
                    });
                }
            }
        }
    }

    Ok(SweepOutcome { mesh, failures })
}
