//! Math primitives for 3D odometry.
//!
//! Thin helpers over nalgebra's rotation types. Euler angles follow the
//! roll/pitch/yaw (ZYX) convention throughout the crate, so decomposing a
//! rotation and rebuilding it from the same angles is the identity.

use nalgebra::{UnitQuaternion, Vector3};

/// Normalize an angle to the [-π, π] range.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > std::f64::consts::PI {
        a -= 2.0 * std::f64::consts::PI;
    }
    while a < -std::f64::consts::PI {
        a += 2.0 * std::f64::consts::PI;
    }
    a
}

/// Shortest signed difference between two angles.
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(a - b)
}

/// Decompose a rotation into roll/pitch/yaw as a vector.
#[inline]
pub fn rpy(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// Magnitude of a rotation measured as the norm of its roll/pitch/yaw vector.
///
/// This matches the thresholding convention of the motion check: small
/// rotations about any single axis reduce to the absolute angle.
#[inline]
pub fn rpy_norm(rotation: &UnitQuaternion<f64>) -> f64 {
    rpy(rotation).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-2.0 * PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_diff_wraparound() {
        let d = angle_diff(PI - 0.05, -PI + 0.05);
        assert_relative_eq!(d.abs(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_rpy_round_trip() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, 0.3);
        let angles = rpy(&q);
        let rebuilt = UnitQuaternion::from_euler_angles(angles.x, angles.y, angles.z);
        assert_relative_eq!(q.angle_to(&rebuilt), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rpy_norm_single_axis() {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2);
        assert_relative_eq!(rpy_norm(&q), FRAC_PI_2, epsilon = 1e-12);
    }
}
