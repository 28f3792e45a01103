//! Magnitude validation of incremental transforms.
//!
//! A failed registration can report an arbitrarily large motion between two
//! scans. Rather than detecting the failure itself, the pipeline rejects any
//! increment whose translation or rotation magnitude exceeds the configured
//! limits, keeping the integrated trajectory intact for one bad cycle.

use serde::{Deserialize, Serialize};

use crate::core::types::Transform3D;

/// Configuration for the motion check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionCheckConfig {
    /// Whether incremental transforms are thresholded at all.
    pub enabled: bool,

    /// Maximum accepted translation norm (meters).
    pub max_translation: f64,

    /// Maximum accepted rotation norm (radians), measured as the norm of the
    /// roll/pitch/yaw vector.
    pub max_rotation: f64,
}

impl Default for MotionCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_translation: 0.5,
            max_rotation: 0.35,
        }
    }
}

/// Reason for rejecting an incremental transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionRejection {
    /// Translation norm exceeds the limit.
    ExcessiveTranslation,
    /// Rotation norm exceeds the limit.
    ExcessiveRotation,
}

impl std::fmt::Display for MotionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExcessiveTranslation => write!(f, "excessive translation"),
            Self::ExcessiveRotation => write!(f, "excessive rotation"),
        }
    }
}

/// Result of checking one incremental transform.
#[derive(Debug, Clone, Copy)]
pub struct MotionCheckResult {
    /// Whether the increment may enter the integrated trajectory.
    pub accepted: bool,
    /// Translation norm of the increment (meters).
    pub translation_norm: f64,
    /// Rotation norm of the increment (radians).
    pub rotation_norm: f64,
    /// Reason for rejection (if rejected).
    pub rejection: Option<MotionRejection>,
}

/// Validates incremental transforms against magnitude limits.
#[derive(Debug, Clone)]
pub struct MotionValidator {
    config: MotionCheckConfig,
}

impl MotionValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: MotionCheckConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MotionCheckConfig {
        &self.config
    }

    /// Check an incremental transform.
    ///
    /// With thresholding disabled every increment is accepted; the norms are
    /// still reported for diagnostics.
    pub fn validate(&self, increment: &Transform3D) -> MotionCheckResult {
        let translation_norm = increment.translation_norm();
        let rotation_norm = increment.rotation_norm();

        if self.config.enabled {
            if translation_norm > self.config.max_translation {
                return MotionCheckResult {
                    accepted: false,
                    translation_norm,
                    rotation_norm,
                    rejection: Some(MotionRejection::ExcessiveTranslation),
                };
            }
            if rotation_norm > self.config.max_rotation {
                return MotionCheckResult {
                    accepted: false,
                    translation_norm,
                    rotation_norm,
                    rejection: Some(MotionRejection::ExcessiveRotation),
                };
            }
        }

        MotionCheckResult {
            accepted: true,
            translation_norm,
            rotation_norm,
            rejection: None,
        }
    }
}

impl Default for MotionValidator {
    fn default() -> Self {
        Self::new(MotionCheckConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accepts_small_motion() {
        let validator = MotionValidator::default();
        let increment = Transform3D::from_translation(0.1, 0.05, 0.0);

        let result = validator.validate(&increment);
        assert!(result.accepted);
        assert!(result.rejection.is_none());
    }

    #[test]
    fn test_rejects_excessive_translation() {
        let validator = MotionValidator::new(MotionCheckConfig {
            enabled: true,
            max_translation: 2.0,
            max_rotation: 1.0,
        });
        let increment = Transform3D::from_translation(1.5, 2.0, 0.0); // norm 2.5

        let result = validator.validate(&increment);
        assert!(!result.accepted);
        assert_eq!(result.rejection, Some(MotionRejection::ExcessiveTranslation));
        assert_relative_eq!(result.translation_norm, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_excessive_rotation() {
        let validator = MotionValidator::default();
        let increment = Transform3D::from_euler_angles(0.0, 0.0, 0.5);

        let result = validator.validate(&increment);
        assert!(!result.accepted);
        assert_eq!(result.rejection, Some(MotionRejection::ExcessiveRotation));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let validator = MotionValidator::new(MotionCheckConfig {
            enabled: false,
            max_translation: 0.01,
            max_rotation: 0.01,
        });
        let increment = Transform3D::from_translation(100.0, 0.0, 0.0);

        let result = validator.validate(&increment);
        assert!(result.accepted);
        assert_relative_eq!(result.translation_norm, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let validator = MotionValidator::new(MotionCheckConfig {
            enabled: true,
            max_translation: 1.0,
            max_rotation: 1.0,
        });
        let increment = Transform3D::from_translation(1.0, 0.0, 0.0);
        assert!(validator.validate(&increment).accepted);
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(
            format!("{}", MotionRejection::ExcessiveTranslation),
            "excessive translation"
        );
        assert_eq!(
            format!("{}", MotionRejection::ExcessiveRotation),
            "excessive rotation"
        );
    }
}
