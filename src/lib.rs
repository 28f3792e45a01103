//! GatiOdometry - Scan-to-scan point cloud odometry with inertial fusion
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │            (config, messages, publisher)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │        (odometry, fusion, motion check)             │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │                  (registration)                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │              (attitude buffering)                   │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, math)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline
//!
//! Per scan, [`ScanOdometry::process`] runs one cycle:
//!
//! 1. Align the buffered inertial attitude stream to the scan timestamp and
//!    compute the relative rotation since the previous aligned sample
//! 2. Register the scan against the previous one
//! 3. Gate on the attitude/scan timestamp gap; when trusted, blend inertial
//!    roll/pitch with registration yaw and translation
//! 4. Reject implausibly large increments
//! 5. Compose the accepted increment onto the integrated pose and rotate the
//!    scan buffers
//!
//! The inertial producer appends samples from its own thread through
//! [`SharedAttitudeBuffer`]; each cycle works on a point-in-time snapshot.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms (depends on core)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 4: Odometry engine (depends on core, sensors, algorithms)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 5: I/O infrastructure (depends on all layers)
// ============================================================================
pub mod io;

pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::math;
pub use core::types::{AttitudeSample, Point3D, PointCloud3D, Transform3D};

// Sensors
pub use sensors::attitude::{
    AlignedAttitude, AttitudeAligner, AttitudeBuffer, SharedAttitudeBuffer,
};

// Algorithms
pub use algorithms::registration::{
    PointToPointIcp, RegistrationConfig, RegistrationResult, ScanRegistration,
};

// Engine
pub use engine::{
    AttitudeFusion, CycleDiagnostics, FusionConfig, FusionDecision, MotionCheckConfig,
    MotionRejection, MotionValidator, OdometryUpdate, ScanOdometry, ScanOdometryConfig,
};

// I/O
pub use io::{OdometryConfig, OdometryMessage, UdpPublisher};

// Errors
pub use error::{Error, Result};
