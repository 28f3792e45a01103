//! Inertial attitude sample type.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// A single timestamped attitude estimate from the inertial sensor.
///
/// Timestamps are in microseconds since epoch, matching the scan stream.
/// Samples are immutable once created; the buffer hands out copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttitudeSample {
    /// Platform orientation at the sample time
    pub rotation: UnitQuaternion<f64>,
    /// Timestamp in microseconds since epoch
    pub timestamp_us: u64,
}

impl AttitudeSample {
    /// Create a new sample.
    #[inline]
    pub fn new(rotation: UnitQuaternion<f64>, timestamp_us: u64) -> Self {
        Self {
            rotation,
            timestamp_us,
        }
    }

    /// Signed gap in seconds from a reference timestamp to this sample.
    ///
    /// Negative when the sample predates the reference (the usual case for
    /// scan alignment, where the inertial stream runs ahead of scan arrival).
    #[inline]
    pub fn gap_seconds(&self, reference_us: u64) -> f64 {
        (self.timestamp_us as i64 - reference_us as i64) as f64 / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gap_is_signed() {
        let sample = AttitudeSample::new(UnitQuaternion::identity(), 1_000_000);
        assert_relative_eq!(sample.gap_seconds(1_500_000), -0.5);
        assert_relative_eq!(sample.gap_seconds(900_000), 0.1);
        assert_relative_eq!(sample.gap_seconds(1_000_000), 0.0);
    }
}
