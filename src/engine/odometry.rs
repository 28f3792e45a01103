//! Scan-to-scan odometry pipeline.
//!
//! Orchestrates one processing cycle per incoming scan: attitude alignment,
//! registration against the previous scan, fusion, motion validation and
//! pose integration. The attitude producer runs on its own thread and only
//! touches the shared buffer; everything else in this module is owned by the
//! consumer path.
//!
//! # Warm-up
//!
//! The first scan is stored as the query cloud and produces no estimate.
//! With fusion enabled the pipeline additionally waits until at least one
//! attitude sample has ever been received, so the previous-attitude chain
//! can be seeded before the first Ready cycle. Returning `Ok(None)` during
//! warm-up means "no estimate yet", not failure.

use nalgebra::Vector3;

use crate::algorithms::registration::{RegistrationConfig, ScanRegistration};
use crate::core::types::{PointCloud3D, Transform3D};
use crate::engine::fusion::{AttitudeFusion, FusionConfig};
use crate::engine::motion_check::{MotionCheckConfig, MotionValidator};
use crate::error::Result;
use crate::sensors::attitude::{AttitudeAligner, SharedAttitudeBuffer};

/// Configuration for the odometry pipeline.
#[derive(Debug, Clone, Default)]
pub struct ScanOdometryConfig {
    /// Pose the integrated estimate starts from.
    pub initial_pose: Transform3D,

    /// Registration engine configuration.
    pub registration: RegistrationConfig,

    /// Motion check configuration.
    pub motion: MotionCheckConfig,

    /// Attitude fusion configuration.
    pub fusion: FusionConfig,
}

/// Per-cycle diagnostics published alongside the estimates.
#[derive(Debug, Clone)]
pub struct CycleDiagnostics {
    /// Signed gap between the aligned attitude sample and the scan (seconds).
    pub time_gap_s: Option<f64>,
    /// Roll/pitch/yaw derived purely from registration.
    pub registration_rpy: Vector3<f64>,
    /// Roll/pitch/yaw derived purely from the inertial delta.
    pub attitude_rpy: Option<Vector3<f64>>,
    /// Whether inertial roll/pitch were blended this cycle.
    pub fusion_active: bool,
    /// Whether the registration engine converged.
    pub registration_converged: bool,
    /// Registration iteration count.
    pub registration_iterations: u32,
}

/// One odometry estimate, produced per scan once the pipeline is Ready.
#[derive(Debug, Clone)]
pub struct OdometryUpdate {
    /// Scan timestamp in microseconds.
    pub timestamp_us: u64,
    /// Motion since the previous scan.
    pub incremental: Transform3D,
    /// Accumulated pose since start.
    pub integrated: Transform3D,
    /// Whether the increment entered the integrated trajectory. A rejected
    /// increment is still reported here for diagnostics.
    pub accepted: bool,
    /// Cycle diagnostics.
    pub diagnostics: CycleDiagnostics,
}

/// Scan-to-scan odometry with inertial attitude fusion.
///
/// Generic over the registration engine; the pipeline only calls
/// [`ScanRegistration::register`] and consumes its result.
#[derive(Debug)]
pub struct ScanOdometry<R: ScanRegistration> {
    registration: R,
    fusion: AttitudeFusion,
    validator: MotionValidator,
    aligner: AttitudeAligner,
    attitude: SharedAttitudeBuffer,

    query: PointCloud3D,
    reference: PointCloud3D,
    incremental: Transform3D,
    integrated: Transform3D,
    initialized: bool,

    cycle_count: u64,
    rejected_count: u64,
}

impl<R: ScanRegistration> ScanOdometry<R> {
    /// Create a new pipeline.
    ///
    /// `attitude` is the consumer-side handle of the shared buffer; clone the
    /// same handle into the inertial producer thread.
    pub fn new(config: ScanOdometryConfig, registration: R, attitude: SharedAttitudeBuffer) -> Self {
        Self {
            registration,
            fusion: AttitudeFusion::new(config.fusion),
            validator: MotionValidator::new(config.motion),
            aligner: AttitudeAligner::new(),
            attitude,
            query: PointCloud3D::new(),
            reference: PointCloud3D::new(),
            incremental: Transform3D::identity(),
            integrated: config.initial_pose,
            initialized: false,
            cycle_count: 0,
            rejected_count: 0,
        }
    }

    /// Process one incoming scan.
    ///
    /// Returns `Ok(None)` while warming up, `Ok(Some(update))` once the
    /// pipeline is Ready. Scan buffers rotate on every Ready cycle, also when
    /// the motion check rejects the increment.
    pub fn process(
        &mut self,
        cloud: PointCloud3D,
        timestamp_us: u64,
    ) -> Result<Option<OdometryUpdate>> {
        if !self.initialized {
            return Ok(self.try_initialize(cloud));
        }

        // Attitude alignment happens against a point-in-time snapshot so the
        // producer can keep appending mid-cycle.
        let aligned = if self.fusion.config().enabled {
            let snapshot = self.attitude.snapshot();
            let aligned = self.aligner.align(timestamp_us, &snapshot)?;
            self.fusion.push_delta(aligned.delta);
            Some(aligned)
        } else {
            None
        };
        let time_gap_s = aligned.map(|a| a.time_gap_s);

        // Rotate scan buffers: last cycle's query becomes the reference.
        std::mem::swap(&mut self.reference, &mut self.query);
        self.query = cloud;

        let registration = self.registration.register(&self.query, &self.reference);
        let decision = self.fusion.decide(time_gap_s);
        let outcome = self.fusion.combine(&registration.transform, &decision);
        self.incremental = outcome.transform;

        let check = self.validator.validate(&self.incremental);
        if check.accepted {
            self.integrated = self.integrated.compose(&self.incremental);
        } else {
            self.rejected_count += 1;
            log::warn!(
                "discarding incremental transform (t: {:.3} m, r: {:.3} rad): {}",
                check.translation_norm,
                check.rotation_norm,
                check
                    .rejection
                    .map(|r| r.to_string())
                    .unwrap_or_default()
            );
        }

        self.cycle_count += 1;

        Ok(Some(OdometryUpdate {
            timestamp_us,
            incremental: self.incremental,
            integrated: self.integrated,
            accepted: check.accepted,
            diagnostics: CycleDiagnostics {
                time_gap_s,
                registration_rpy: outcome.registration_rpy,
                attitude_rpy: outcome.attitude_rpy,
                fusion_active: outcome.fused,
                registration_converged: registration.converged,
                registration_iterations: registration.iterations,
            },
        }))
    }

    /// Handle a scan while uninitialized. Always yields no estimate.
    fn try_initialize(&mut self, cloud: PointCloud3D) -> Option<OdometryUpdate> {
        self.query = cloud;

        if self.fusion.config().enabled {
            match self.attitude.first() {
                Some(first) => {
                    self.aligner.prime(first.rotation);
                    self.initialized = true;
                    log::info!("odometry initialized with seeded attitude chain");
                }
                None => {
                    log::debug!("waiting for first attitude sample before initializing");
                }
            }
        } else {
            self.initialized = true;
            log::info!("odometry initialized (fusion disabled)");
        }

        None
    }

    /// Motion estimated for the most recent cycle.
    #[inline]
    pub fn incremental(&self) -> &Transform3D {
        &self.incremental
    }

    /// Accumulated pose since start.
    #[inline]
    pub fn integrated(&self) -> &Transform3D {
        &self.integrated
    }

    /// Most recent scan (query cloud), if the pipeline has seen one.
    pub fn query(&self) -> Option<&PointCloud3D> {
        if self.query.is_empty() {
            None
        } else {
            Some(&self.query)
        }
    }

    /// Previous scan (reference cloud), if a full cycle has run.
    pub fn reference(&self) -> Option<&PointCloud3D> {
        if self.reference.is_empty() {
            None
        } else {
            Some(&self.reference)
        }
    }

    /// Whether warm-up has completed.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of Ready cycles processed.
    #[inline]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Number of increments rejected by the motion check.
    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count
    }

    /// Fusion stage statistics access.
    pub fn fusion(&self) -> &AttitudeFusion {
        &self.fusion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::registration::RegistrationResult;
    use crate::core::types::{AttitudeSample, Point3D};
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Registration stub returning scripted transforms.
    struct ScriptedRegistration {
        results: RefCell<VecDeque<Transform3D>>,
    }

    impl ScriptedRegistration {
        fn new(transforms: Vec<Transform3D>) -> Self {
            Self {
                results: RefCell::new(transforms.into()),
            }
        }
    }

    impl ScanRegistration for ScriptedRegistration {
        fn register(&self, _query: &PointCloud3D, _reference: &PointCloud3D) -> RegistrationResult {
            let transform = self
                .results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(Transform3D::identity);
            RegistrationResult::success(transform, 1, 0.0)
        }
    }

    fn cloud(tag: f64) -> PointCloud3D {
        let mut c = PointCloud3D::new();
        c.push(Point3D::new(tag, 0.0, 0.0));
        c
    }

    fn config_without_fusion() -> ScanOdometryConfig {
        ScanOdometryConfig {
            fusion: FusionConfig {
                enabled: false,
                ..FusionConfig::default()
            },
            ..ScanOdometryConfig::default()
        }
    }

    #[test]
    fn test_first_scan_produces_no_estimate() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![]);
        let mut odom = ScanOdometry::new(config_without_fusion(), registration, buffer);

        let update = odom.process(cloud(0.0), 0).unwrap();
        assert!(update.is_none());
        assert!(odom.is_initialized());
        assert!(odom.query().is_some());
    }

    #[test]
    fn test_fusion_enabled_waits_for_attitude() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![]);
        let mut odom = ScanOdometry::new(ScanOdometryConfig::default(), registration, buffer.clone());

        // No attitude samples: both the first and second scan leave the
        // pipeline uninitialized.
        assert!(odom.process(cloud(0.0), 0).unwrap().is_none());
        assert!(!odom.is_initialized());
        assert!(odom.process(cloud(1.0), 100_000).unwrap().is_none());
        assert!(!odom.is_initialized());

        // Once a sample arrives, the next scan completes warm-up.
        buffer.push(AttitudeSample::new(UnitQuaternion::identity(), 150_000));
        assert!(odom.process(cloud(2.0), 200_000).unwrap().is_none());
        assert!(odom.is_initialized());
    }

    #[test]
    fn test_integration_composes_increments() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![
            Transform3D::from_translation(1.0, 0.0, 0.0),
            Transform3D::from_translation(0.0, 1.0, 0.0),
            Transform3D::from_translation(0.0, 0.0, 1.0),
        ]);
        let mut odom = ScanOdometry::new(config_without_fusion(), registration, buffer);

        odom.process(cloud(0.0), 0).unwrap();
        for i in 1..=3u64 {
            let update = odom.process(cloud(i as f64), i * 100_000).unwrap().unwrap();
            assert!(update.accepted);
        }

        let integrated = odom.integrated();
        assert_relative_eq!(integrated.translation.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(integrated.translation.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(integrated.translation.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejected_increment_leaves_integrated_unchanged() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![
            Transform3D::from_translation(0.1, 0.0, 0.0),
            Transform3D::from_translation(1.5, 2.0, 0.0), // norm 2.5
            Transform3D::from_translation(0.1, 0.0, 0.0),
        ]);
        let mut config = config_without_fusion();
        config.motion.max_translation = 2.0;
        config.motion.max_rotation = 10.0;
        let mut odom = ScanOdometry::new(config, registration, buffer);

        odom.process(cloud(0.0), 0).unwrap();
        let u1 = odom.process(cloud(1.0), 100_000).unwrap().unwrap();
        assert!(u1.accepted);

        let u2 = odom.process(cloud(2.0), 200_000).unwrap().unwrap();
        assert!(!u2.accepted);
        // Discarded from the trajectory but still reported.
        assert_relative_eq!(u2.incremental.translation_norm(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(u2.integrated.translation.x, 0.1, epsilon = 1e-12);
        assert_eq!(odom.rejected_count(), 1);

        // Scan buffers rotated regardless: the next cycle proceeds normally.
        let u3 = odom.process(cloud(3.0), 300_000).unwrap().unwrap();
        assert!(u3.accepted);
        assert_relative_eq!(u3.integrated.translation.x, 0.2, epsilon = 1e-12);
        assert_relative_eq!(odom.reference().unwrap().points[0].x, 2.0);
        assert_relative_eq!(odom.query().unwrap().points[0].x, 3.0);
    }

    #[test]
    fn test_initial_pose_offsets_trajectory() {
        let buffer = SharedAttitudeBuffer::new();
        let registration =
            ScriptedRegistration::new(vec![Transform3D::from_translation(1.0, 0.0, 0.0)]);
        let mut config = config_without_fusion();
        config.initial_pose = Transform3D::from_translation(10.0, 0.0, 0.0);
        let mut odom = ScanOdometry::new(config, registration, buffer);

        odom.process(cloud(0.0), 0).unwrap();
        let update = odom.process(cloud(1.0), 100_000).unwrap().unwrap();

        assert_relative_eq!(update.integrated.translation.x, 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fusion_cycle_blends_attitude_delta() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![
            Transform3D::new(
                Vector3::new(0.2, 0.0, 0.0),
                UnitQuaternion::from_euler_angles(0.001, 0.001, 0.1),
            );
            2
        ]);
        let mut odom = ScanOdometry::new(ScanOdometryConfig::default(), registration, buffer.clone());

        // Warm-up: seed attitude chain with an identity sample.
        buffer.push(AttitudeSample::new(UnitQuaternion::identity(), 0));
        odom.process(cloud(0.0), 10_000).unwrap();
        assert!(odom.is_initialized());

        // Platform tilts by (0.03, -0.02) between scans.
        let tilted = UnitQuaternion::from_euler_angles(0.03, -0.02, 0.0);
        buffer.push(AttitudeSample::new(tilted, 95_000));

        let update = odom.process(cloud(1.0), 100_000).unwrap().unwrap();
        assert!(update.diagnostics.fusion_active);
        assert_relative_eq!(update.diagnostics.time_gap_s.unwrap(), -0.005, epsilon = 1e-9);

        let (roll, pitch, yaw) = update.incremental.euler_angles();
        assert_relative_eq!(roll, 0.03, epsilon = 1e-6);
        assert_relative_eq!(pitch, -0.02, epsilon = 1e-6);
        assert_relative_eq!(yaw, 0.1, epsilon = 1e-6);
        assert_relative_eq!(update.incremental.translation.x, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_stale_attitude_degrades_single_cycle() {
        let buffer = SharedAttitudeBuffer::new();
        let registration = ScriptedRegistration::new(vec![
            Transform3D::from_euler_angles(0.0, 0.0, 0.05);
            2
        ]);
        let mut odom = ScanOdometry::new(ScanOdometryConfig::default(), registration, buffer.clone());

        buffer.push(AttitudeSample::new(UnitQuaternion::identity(), 0));
        odom.process(cloud(0.0), 10_000).unwrap();

        // Sample far from the scan: gate rejects this cycle.
        let tilted = UnitQuaternion::from_euler_angles(0.1, 0.0, 0.0);
        buffer.push(AttitudeSample::new(tilted, 500_000));
        let u1 = odom.process(cloud(1.0), 1_000_000).unwrap().unwrap();
        assert!(!u1.diagnostics.fusion_active);
        let (roll, _, _) = u1.incremental.euler_angles();
        assert_relative_eq!(roll, 0.0, epsilon = 1e-9); // pure registration

        // Fresh sample: fusion recovers on the very next cycle.
        let tilted2 = UnitQuaternion::from_euler_angles(0.12, 0.0, 0.0);
        buffer.push(AttitudeSample::new(tilted2, 1_995_000));
        let u2 = odom.process(cloud(2.0), 2_000_000).unwrap().unwrap();
        assert!(u2.diagnostics.fusion_active);
    }
}
