//! Rigid-body transform type for 3D odometry.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::Point3D;
use crate::core::math;

/// A rigid-body transform in 3D: translation plus rotation.
///
/// Used for both incremental (scan-to-scan) and integrated (start-to-current)
/// estimates. The rotation is stored as a unit quaternion, which keeps the
/// rotation block orthonormal across arbitrarily long composition chains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Translation in meters
    pub translation: Vector3<f64>,
    /// Rotation as a unit quaternion
    pub rotation: UnitQuaternion<f64>,
}

impl Transform3D {
    /// Create a new transform from translation and rotation.
    #[inline]
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Identity transform at the origin.
    #[inline]
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pure translation.
    #[inline]
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pure rotation from roll/pitch/yaw (radians, ZYX convention).
    #[inline]
    pub fn from_euler_angles(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        }
    }

    /// Compose two transforms: self ∘ other.
    ///
    /// Applies `other` in the frame defined by `self`. Pose integration uses
    /// this as `integrated = integrated.compose(&incremental)`.
    #[inline]
    pub fn compose(&self, other: &Transform3D) -> Transform3D {
        Transform3D {
            translation: self.translation + self.rotation * other.translation,
            rotation: self.rotation * other.rotation,
        }
    }

    /// Inverse of this transform.
    #[inline]
    pub fn inverse(&self) -> Transform3D {
        let inv_rotation = self.rotation.inverse();
        Transform3D {
            translation: -(inv_rotation * self.translation),
            rotation: inv_rotation,
        }
    }

    /// Transform a point from the local frame to the parent frame.
    #[inline]
    pub fn transform_point(&self, point: &Point3D) -> Point3D {
        let v = self.rotation * point.to_vector() + self.translation;
        Point3D::from_vector(&v)
    }

    /// Roll/pitch/yaw decomposition of the rotation (radians).
    #[inline]
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.rotation.euler_angles()
    }

    /// Euclidean norm of the translation.
    #[inline]
    pub fn translation_norm(&self) -> f64 {
        self.translation.norm()
    }

    /// Norm of the roll/pitch/yaw vector of the rotation.
    #[inline]
    pub fn rotation_norm(&self) -> f64 {
        math::rpy_norm(&self.rotation)
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_compose_identity() {
        let t = Transform3D::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let result = t.compose(&Transform3D::identity());
        assert_relative_eq!(result.translation, t.translation, epsilon = 1e-12);
        assert_relative_eq!(result.rotation.angle_to(&t.rotation), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform3D::new(
            Vector3::new(1.0, -2.0, 0.5),
            UnitQuaternion::from_euler_angles(0.3, -0.1, 0.7),
        );
        let result = t.compose(&t.inverse());
        assert_relative_eq!(result.translation.norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.rotation.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_composition_rotates_translation() {
        // Yaw 90° then move forward: motion ends up along +Y.
        let rotate = Transform3D::from_euler_angles(0.0, 0.0, FRAC_PI_2);
        let forward = Transform3D::from_translation(1.0, 0.0, 0.0);
        let result = rotate.compose(&forward);
        assert_relative_eq!(result.translation.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.translation.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.translation.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_point() {
        let t = Transform3D::new(
            Vector3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, FRAC_PI_2),
        );
        let p = t.transform_point(&Point3D::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_norm_single_axis() {
        let t = Transform3D::from_euler_angles(0.0, 0.0, 0.25);
        assert_relative_eq!(t.rotation_norm(), 0.25, epsilon = 1e-12);
    }
}
