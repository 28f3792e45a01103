//! Inertial attitude buffering and scan-time alignment.

mod aligner;
mod buffer;

pub use aligner::{AlignedAttitude, AttitudeAligner};
pub use buffer::{AttitudeBuffer, SharedAttitudeBuffer, DEFAULT_ATTITUDE_CAPACITY};
