//! Core data types for the odometry pipeline.
//!
//! - [`Transform3D`]: rigid-body transform (translation + unit quaternion)
//! - [`Point3D`], [`PointCloud3D`]: scan geometry
//! - [`AttitudeSample`]: timestamped inertial orientation

mod attitude;
mod cloud;
mod transform;

pub use attitude::AttitudeSample;
pub use cloud::{Point3D, PointCloud3D};
pub use transform::Transform3D;
