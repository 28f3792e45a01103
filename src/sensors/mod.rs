//! Sensor processing: inertial attitude handling.

pub mod attitude;
