//! Point cloud types.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::Transform3D;

/// A 3D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
    /// Z coordinate in meters
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert to a nalgebra vector.
    #[inline]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Build from a nalgebra vector.
    #[inline]
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3D) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl Default for Point3D {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Collection of 3D points in Cartesian coordinates.
///
/// One scan from the range sensor. The odometry pipeline owns its query and
/// reference clouds exclusively; nothing else aliases them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud3D {
    /// The points in this cloud
    pub points: Vec<Point3D>,
}

impl PointCloud3D {
    /// Create an empty cloud.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create an empty cloud with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: Point3D) {
        self.points.push(point);
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Apply a rigid transform to every point, returning a new cloud.
    pub fn transform(&self, transform: &Transform3D) -> PointCloud3D {
        PointCloud3D {
            points: self
                .points
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
        }
    }

    /// Centroid of the cloud, or the origin for an empty cloud.
    pub fn centroid(&self) -> Point3D {
        if self.points.is_empty() {
            return Point3D::default();
        }
        let mut sum = Vector3::zeros();
        for p in &self.points {
            sum += p.to_vector();
        }
        Point3D::from_vector(&(sum / self.points.len() as f64))
    }
}
