//! I/O infrastructure: configuration and output streaming.

pub mod config;
pub mod messages;
pub mod publisher;

pub use config::{FrameConfig, InitialPoseConfig, OdometryConfig};
pub use messages::{CloudSummaryMessage, DiagnosticsMessage, OdometryMessage, PoseMessage};
pub use publisher::UdpPublisher;
