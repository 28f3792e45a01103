//! Attitude fusion: blending inertial roll/pitch into registration output.
//!
//! Inertial sensors are locally accurate for tilt but drift in heading over
//! the scan-to-scan interval, while registration pins down yaw well in most
//! environments. When fusion is active the output rotation therefore takes
//! roll and pitch from the inertial delta and yaw from registration;
//! translation always comes from registration.
//!
//! The attitude delta is produced by the aligner in one cycle and consumed by
//! the fusion step of the next registration result: the delta describes the
//! motion the registration engine has just measured. The queue between the
//! two stages makes that one-step lag explicit, and it is popped exactly once
//! per cycle so a gated cycle can never leak a stale delta into a later one.

use std::collections::VecDeque;

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::core::math;
use crate::core::types::Transform3D;

/// Upper bound on queued deltas. Steady state holds at most one entry; the
/// bound only guards against a caller that aligns without combining.
const DELTA_QUEUE_BOUND: usize = 8;

/// Configuration for attitude fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Whether inertial data is fused at all.
    pub enabled: bool,

    /// Whether to gate fusion on the scan/attitude timestamp gap.
    pub check_timestamps: bool,

    /// Maximum tolerated |gap| between the aligned attitude sample and the
    /// scan timestamp (seconds).
    pub max_time_gap_s: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_timestamps: true,
            max_time_gap_s: 0.05,
        }
    }
}

/// Per-cycle fusion decision.
///
/// Computed fresh every cycle and consumed immediately by
/// [`AttitudeFusion::combine`]; never persisted. A rejected cycle degrades to
/// pure registration output and the next cycle decides again.
#[derive(Debug, Clone, Copy)]
pub struct FusionDecision {
    /// Whether the inertial delta should be blended this cycle.
    pub active: bool,
    /// Signed scan/attitude gap the decision was based on (seconds).
    pub time_gap_s: Option<f64>,
}

impl FusionDecision {
    fn inactive(time_gap_s: Option<f64>) -> Self {
        Self {
            active: false,
            time_gap_s,
        }
    }
}

/// Outcome of combining registration output with the inertial delta.
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    /// The incremental transform to feed into integration.
    pub transform: Transform3D,
    /// Whether inertial roll/pitch were actually blended in.
    pub fused: bool,
    /// Roll/pitch/yaw of the raw registration rotation (diagnostics).
    pub registration_rpy: Vector3<f64>,
    /// Roll/pitch/yaw of the consumed inertial delta, if one was queued.
    pub attitude_rpy: Option<Vector3<f64>>,
}

/// Gate and combiner for inertial attitude fusion.
#[derive(Debug, Clone)]
pub struct AttitudeFusion {
    config: FusionConfig,
    delta_queue: VecDeque<UnitQuaternion<f64>>,
    fused_count: u64,
    passthrough_count: u64,
}

impl AttitudeFusion {
    /// Create a new fusion stage with the given configuration.
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            delta_queue: VecDeque::with_capacity(2),
            fused_count: 0,
            passthrough_count: 0,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Queue an attitude delta produced by the aligner this cycle.
    pub fn push_delta(&mut self, delta: UnitQuaternion<f64>) {
        if self.delta_queue.len() >= DELTA_QUEUE_BOUND {
            log::warn!("attitude delta queue full, dropping oldest entry");
            self.delta_queue.pop_front();
        }
        self.delta_queue.push_back(delta);
    }

    /// Decide whether this cycle's inertial delta is trustworthy.
    ///
    /// The check only applies when fusion is enabled and timestamp checking
    /// is configured: the aligned sample must be within `max_time_gap_s` of
    /// the scan. Rejection affects this cycle only.
    pub fn decide(&self, time_gap_s: Option<f64>) -> FusionDecision {
        if !self.config.enabled {
            return FusionDecision::inactive(time_gap_s);
        }
        let Some(gap) = time_gap_s else {
            return FusionDecision::inactive(None);
        };
        if self.config.check_timestamps && gap.abs() >= self.config.max_time_gap_s {
            log::warn!(
                "attitude sample {:+.3} s from scan exceeds {:.3} s gap limit, \
                 using registration only this cycle",
                gap,
                self.config.max_time_gap_s
            );
            return FusionDecision::inactive(Some(gap));
        }
        FusionDecision {
            active: true,
            time_gap_s: Some(gap),
        }
    }

    /// Merge the registration transform with the queued inertial delta.
    ///
    /// Pops the delta queue exactly once whether or not the decision is
    /// active. When active, roll and pitch come from the delta and yaw from
    /// registration; otherwise the registration transform passes through
    /// unchanged.
    pub fn combine(&mut self, registration: &Transform3D, decision: &FusionDecision) -> FusionOutcome {
        let delta = self.delta_queue.pop_front();
        let registration_rpy = math::rpy(&registration.rotation);
        let attitude_rpy = delta.as_ref().map(math::rpy);

        if decision.active {
            if let Some(rpy) = attitude_rpy {
                let rotation = UnitQuaternion::from_euler_angles(rpy.x, rpy.y, registration_rpy.z);
                self.fused_count += 1;
                return FusionOutcome {
                    transform: Transform3D::new(registration.translation, rotation),
                    fused: true,
                    registration_rpy,
                    attitude_rpy,
                };
            }
            log::warn!("fusion active but no attitude delta queued, passing registration through");
        }

        self.passthrough_count += 1;
        FusionOutcome {
            transform: *registration,
            fused: false,
            registration_rpy,
            attitude_rpy,
        }
    }

    /// Number of cycles that blended inertial data.
    #[inline]
    pub fn fused_count(&self) -> u64 {
        self.fused_count
    }

    /// Number of cycles that passed registration through unchanged.
    #[inline]
    pub fn passthrough_count(&self) -> u64 {
        self.passthrough_count
    }
}
