//! Message types for streaming odometry output.
//!
//! Wire-friendly mirrors of the engine types: fixed-size arrays instead of
//! nalgebra structures so clients in any language can decode the JSON.

use serde::{Deserialize, Serialize};

use crate::core::types::{PointCloud3D, Transform3D};
use crate::engine::{CycleDiagnostics, OdometryUpdate};

/// A stamped pose in a named frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseMessage {
    /// Timestamp in microseconds
    pub timestamp_us: u64,
    /// Frame the pose is expressed in
    pub frame_id: String,
    /// Position [x, y, z] in meters
    pub position: [f64; 3],
    /// Orientation quaternion [x, y, z, w]
    pub orientation: [f64; 4],
}

impl PoseMessage {
    /// Build from a transform.
    pub fn from_transform(transform: &Transform3D, frame_id: &str, timestamp_us: u64) -> Self {
        let q = transform.rotation.quaternion();
        Self {
            timestamp_us,
            frame_id: frame_id.to_string(),
            position: [
                transform.translation.x,
                transform.translation.y,
                transform.translation.z,
            ],
            orientation: [q.i, q.j, q.k, q.w],
        }
    }
}

/// Cycle diagnostics payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsMessage {
    /// Signed attitude/scan timestamp gap in seconds
    pub time_gap_s: Option<f64>,
    /// Roll/pitch/yaw from registration only
    pub registration_rpy: [f64; 3],
    /// Roll/pitch/yaw from the inertial delta only
    pub attitude_rpy: Option<[f64; 3]>,
    /// Whether inertial data was blended this cycle
    pub fusion_active: bool,
    /// Whether registration converged
    pub registration_converged: bool,
    /// Registration iterations
    pub registration_iterations: u32,
}

impl DiagnosticsMessage {
    /// Build from engine diagnostics.
    pub fn from_diagnostics(diagnostics: &CycleDiagnostics) -> Self {
        Self {
            time_gap_s: diagnostics.time_gap_s,
            registration_rpy: [
                diagnostics.registration_rpy.x,
                diagnostics.registration_rpy.y,
                diagnostics.registration_rpy.z,
            ],
            attitude_rpy: diagnostics.attitude_rpy.map(|v| [v.x, v.y, v.z]),
            fusion_active: diagnostics.fusion_active,
            registration_converged: diagnostics.registration_converged,
            registration_iterations: diagnostics.registration_iterations,
        }
    }
}

/// Summary of a buffered scan, for lightweight visualization feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSummaryMessage {
    /// Frame the cloud is expressed in
    pub frame_id: String,
    /// Number of points
    pub num_points: usize,
    /// Cloud centroid [x, y, z]
    pub centroid: [f64; 3],
}

impl CloudSummaryMessage {
    /// Build from a cloud.
    pub fn from_cloud(cloud: &PointCloud3D, frame_id: &str) -> Self {
        let c = cloud.centroid();
        Self {
            frame_id: frame_id.to_string(),
            num_points: cloud.len(),
            centroid: [c.x, c.y, c.z],
        }
    }
}

/// One streamed odometry update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdometryMessage {
    /// Scan timestamp in microseconds
    pub timestamp_us: u64,
    /// Motion since the previous scan
    pub incremental: PoseMessage,
    /// Accumulated pose since start
    pub integrated: PoseMessage,
    /// Whether the increment entered the integrated trajectory
    pub accepted: bool,
    /// Cycle diagnostics
    pub diagnostics: DiagnosticsMessage,
}

impl OdometryMessage {
    /// Build from an engine update.
    pub fn from_update(update: &OdometryUpdate, fixed_frame_id: &str) -> Self {
        Self {
            timestamp_us: update.timestamp_us,
            incremental: PoseMessage::from_transform(
                &update.incremental,
                fixed_frame_id,
                update.timestamp_us,
            ),
            integrated: PoseMessage::from_transform(
                &update.integrated,
                fixed_frame_id,
                update.timestamp_us,
            ),
            accepted: update.accepted,
            diagnostics: DiagnosticsMessage::from_diagnostics(&update.diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point3D;
    use approx::assert_relative_eq;

    #[test]
    fn test_pose_message_round_trip() {
        let t = Transform3D::from_translation(1.0, 2.0, 3.0);
        let msg = PoseMessage::from_transform(&t, "world", 42);

        let json = serde_json::to_string(&msg).unwrap();
        let decoded: PoseMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.frame_id, "world");
        assert_eq!(decoded.timestamp_us, 42);
        assert_relative_eq!(decoded.position[2], 3.0);
        assert_relative_eq!(decoded.orientation[3], 1.0); // identity w
    }

    #[test]
    fn test_cloud_summary() {
        let mut cloud = PointCloud3D::new();
        cloud.push(Point3D::new(0.0, 0.0, 0.0));
        cloud.push(Point3D::new(2.0, 0.0, 0.0));

        let msg = CloudSummaryMessage::from_cloud(&cloud, "odom");
        assert_eq!(msg.num_points, 2);
        assert_relative_eq!(msg.centroid[0], 1.0);
    }
}
