//! Configuration loading for the odometry node.
//!
//! Frame identifiers and the algorithm sections are required: a missing key
//! fails at load time, before any cycle runs. Only the initial pose is
//! optional and defaults to identity at the origin.

use std::path::Path;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::algorithms::registration::RegistrationConfig;
use crate::core::types::Transform3D;
use crate::engine::{FusionConfig, MotionCheckConfig, ScanOdometryConfig};
use crate::error::{Error, Result};

/// Coordinate frame identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Fixed (world) frame id
    pub fixed: String,
    /// Odometry frame id
    pub odometry: String,
}

/// Optional initial pose of the platform in the fixed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialPoseConfig {
    /// Position [x, y, z] in meters
    pub position: [f64; 3],
    /// Orientation quaternion [x, y, z, w]
    pub orientation: [f64; 4],
}

impl InitialPoseConfig {
    /// Convert to a transform, normalizing the quaternion.
    pub fn to_transform(&self) -> Transform3D {
        let [x, y, z] = self.position;
        let [qx, qy, qz, qw] = self.orientation;
        Transform3D::new(
            Vector3::new(x, y, z),
            UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz)),
        )
    }
}

/// Full configuration of the odometry node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdometryConfig {
    /// Frame identifiers
    pub frames: FrameConfig,
    /// Initial pose (identity at origin when absent)
    pub initial_pose: Option<InitialPoseConfig>,
    /// Registration engine parameters
    pub registration: RegistrationConfig,
    /// Motion check parameters
    pub motion: MotionCheckConfig,
    /// Attitude fusion parameters
    pub fusion: FusionConfig,
}

impl OdometryConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing required parameters are fatal here, before any cycle runs.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: OdometryConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the initial pose, warning when it is absent.
    pub fn initial_transform(&self) -> Transform3D {
        match &self.initial_pose {
            Some(pose) => pose.to_transform(),
            None => {
                log::warn!("no initial pose configured, starting at origin");
                Transform3D::identity()
            }
        }
    }

    /// Build the engine configuration from this file configuration.
    pub fn pipeline_config(&self) -> ScanOdometryConfig {
        ScanOdometryConfig {
            initial_pose: self.initial_transform(),
            registration: self.registration.clone(),
            motion: self.motion.clone(),
            fusion: self.fusion.clone(),
        }
    }
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            frames: FrameConfig {
                fixed: "world".to_string(),
                odometry: "odom".to_string(),
            },
            initial_pose: None,
            registration: RegistrationConfig::default(),
            motion: MotionCheckConfig::default(),
            fusion: FusionConfig::default(),
        }
    }
}
