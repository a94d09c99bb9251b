//! Spherical-angle conversions for thruster orientations and grid directions.

use nalgebra::Vector3;

/// Unit orientation vector from spherical angles given in degrees.
///
/// `theta` is the azimuth in the x-y plane measured from +x, `phi` the polar
/// angle measured from +z. This is the convention thruster record files use.
pub fn orientation_from_degrees(theta_deg: f64, phi_deg: f64) -> Vector3<f64> {
    let theta = theta_deg.to_radians();
    let phi = phi_deg.to_radians();
    Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

/// Unit sample direction for an envelope grid cell.
///
/// `lon` sweeps [0, 2π) around the surge axis and `colat` runs [0, π]
/// measured from +x, so the envelope poles sit on the surge axis.
pub fn grid_direction(lon: f64, colat: f64) -> Vector3<f64> {
    Vector3::new(colat.cos(), lon.sin() * colat.sin(), lon.cos() * colat.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn orientation_axes() {
        let up = orientation_from_degrees(0.0, 0.0);
        assert_relative_eq!(up.z, 1.0, epsilon = 1e-12);

        let surge = orientation_from_degrees(0.0, 90.0);
        assert_relative_eq!(surge.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(surge.y, 0.0, epsilon = 1e-12);

        let sway = orientation_from_degrees(90.0, 90.0);
        assert_relative_eq!(sway.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn orientation_is_unit_length() {
        for &(theta, phi) in &[(12.0, 34.0), (123.0, 77.0), (-45.0, 160.0)] {
            assert_relative_eq!(
                orientation_from_degrees(theta, phi).norm(),
                1.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn grid_poles_lie_on_surge_axis() {
        let fwd = grid_direction(1.234, 0.0);
        assert_relative_eq!(fwd.x, 1.0, epsilon = 1e-12);
        let aft = grid_direction(0.567, std::f64::consts::PI);
        assert_relative_eq!(aft.x, -1.0, epsilon = 1e-12);
    }
}
