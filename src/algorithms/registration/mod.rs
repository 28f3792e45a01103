//! Scan registration: estimating the rigid transform between two clouds.
//!
//! The odometry pipeline only depends on the [`ScanRegistration`] trait and
//! treats the returned transform as authoritative; plausibility is checked
//! downstream by the motion validator, never here.

mod icp;

pub use icp::PointToPointIcp;

use serde::{Deserialize, Serialize};

use crate::core::types::{PointCloud3D, Transform3D};

/// Configuration for a registration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Convergence threshold on the incremental transform magnitude.
    ///
    /// Iteration stops once both the translation step (meters) and the
    /// rotation step (radians) fall below this value.
    pub epsilon: f64,

    /// Maximum correspondence distance (meters).
    ///
    /// Point pairs farther apart than this are rejected as outliers.
    pub max_correspondence_distance: f64,

    /// Maximum number of iterations.
    pub max_iterations: u32,

    /// Minimum number of valid correspondences required.
    ///
    /// If fewer correspondences are found, the registration fails.
    #[serde(default = "default_min_correspondences")]
    pub min_correspondences: usize,
}

fn default_min_correspondences() -> usize {
    10
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            max_correspondence_distance: 1.0,
            max_iterations: 50,
            min_correspondences: default_min_correspondences(),
        }
    }
}

/// Result of a registration operation.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    /// Estimated transform aligning the query cloud to the reference cloud.
    pub transform: Transform3D,

    /// Whether the engine converged.
    pub converged: bool,

    /// Number of iterations performed.
    pub iterations: u32,

    /// Mean squared error of the final correspondences.
    pub mse: f64,
}

impl Default for RegistrationResult {
    fn default() -> Self {
        Self {
            transform: Transform3D::identity(),
            converged: false,
            iterations: 0,
            mse: f64::MAX,
        }
    }
}

impl RegistrationResult {
    /// Create a failed result with an identity transform.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Create a successful result.
    pub fn success(transform: Transform3D, iterations: u32, mse: f64) -> Self {
        Self {
            transform,
            converged: true,
            iterations,
            mse,
        }
    }
}

/// Trait for scan registration engines.
pub trait ScanRegistration {
    /// Estimate the rigid transform that aligns `query` to `reference`.
    fn register(&self, query: &PointCloud3D, reference: &PointCloud3D) -> RegistrationResult;
}
