//! Timestamp alignment of attitude samples to scan times.
//!
//! For each scan the aligner picks the buffered sample closest in time and
//! computes the relative rotation since the previously aligned sample. The
//! search prefers past-dated samples: among samples with a non-positive gap
//! the one closest to zero wins, and a future-dated sample is selected only
//! when no past-dated sample exists at all.

use nalgebra::UnitQuaternion;

use crate::core::types::AttitudeSample;
use crate::error::{Error, Result};

/// Result of aligning the attitude stream to one scan timestamp.
#[derive(Debug, Clone, Copy)]
pub struct AlignedAttitude {
    /// Orientation of the selected sample
    pub rotation: UnitQuaternion<f64>,
    /// Relative rotation since the previously aligned sample
    pub delta: UnitQuaternion<f64>,
    /// Signed gap between the selected sample and the scan time (seconds,
    /// negative when the sample predates the scan)
    pub time_gap_s: f64,
}

/// Aligns buffered attitude samples to scan timestamps and tracks the
/// previous aligned attitude for delta computation.
#[derive(Debug, Clone, Default)]
pub struct AttitudeAligner {
    previous: Option<UnitQuaternion<f64>>,
}

impl AttitudeAligner {
    /// Create a new aligner with no history.
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Seed the previous-attitude chain.
    ///
    /// The pipeline calls this once during warm-up with the first attitude
    /// sample ever received, so the first Ready cycle has a valid reference.
    pub fn prime(&mut self, rotation: UnitQuaternion<f64>) {
        self.previous = Some(rotation);
    }

    /// Whether the previous-attitude chain has been seeded.
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Align the snapshot to a scan timestamp and advance the delta chain.
    ///
    /// The relative delta is `current · previous⁻¹`: the rotation that
    /// carries the previous aligned attitude into the current one. The order
    /// is load-bearing; reversing it yields the inverse motion.
    ///
    /// # Errors
    ///
    /// [`Error::NoAttitudeData`] when the snapshot is empty and
    /// [`Error::NotInitialized`] when the chain was never primed. The
    /// pipeline's warm-up gate makes both unreachable in a Ready cycle.
    pub fn align(
        &mut self,
        scan_timestamp_us: u64,
        snapshot: &[AttitudeSample],
    ) -> Result<AlignedAttitude> {
        let previous = self.previous.ok_or(Error::NotInitialized)?;
        let (sample, time_gap_s) = Self::nearest(scan_timestamp_us, snapshot)?;

        let delta = sample.rotation * previous.inverse();
        self.previous = Some(sample.rotation);

        Ok(AlignedAttitude {
            rotation: sample.rotation,
            delta,
            time_gap_s,
        })
    }

    /// Find the sample nearest to the scan time, preferring past-dated ones.
    fn nearest(
        scan_timestamp_us: u64,
        snapshot: &[AttitudeSample],
    ) -> Result<(AttitudeSample, f64)> {
        let first = snapshot.first().ok_or(Error::NoAttitudeData)?;

        let mut best = *first;
        let mut best_gap = first.gap_seconds(scan_timestamp_us);
        let mut have_past = best_gap <= 0.0;

        for sample in &snapshot[1..] {
            let gap = sample.gap_seconds(scan_timestamp_us);
            if gap <= 0.0 {
                if !have_past || gap.abs() < best_gap.abs() {
                    best = *sample;
                    best_gap = gap;
                    have_past = true;
                }
            } else if !have_past && gap.abs() < best_gap.abs() {
                // No past-dated candidate yet: let the nearest future-dated
                // sample win instead of keeping an arbitrary default.
                best = *sample;
                best_gap = gap;
            }
        }

        Ok((best, best_gap))
    }
}
