//! Point-to-Point Iterative Closest Point registration.
//!
//! Classic ICP for aligning two 3D point clouds by iteratively:
//! 1. Finding nearest neighbor correspondences
//! 2. Computing the optimal rigid transform via SVD
//! 3. Applying the transform and repeating until convergence
//!
//! Suitable for the small scan-to-scan motions of an odometry front-end.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use super::{RegistrationConfig, RegistrationResult, ScanRegistration};
use crate::core::types::{PointCloud3D, Transform3D};

/// Point-to-Point ICP registration engine.
///
/// Uses a k-d tree over the reference cloud for nearest neighbor queries.
#[derive(Debug, Clone)]
pub struct PointToPointIcp {
    config: RegistrationConfig,
}

impl PointToPointIcp {
    /// Create a new engine with the given configuration.
    pub fn new(config: RegistrationConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Build a k-d tree from a point cloud.
    fn build_kdtree(cloud: &PointCloud3D) -> KdTree<f64, 3> {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, point) in cloud.points.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], i as u64);
        }
        tree
    }

    /// Find correspondences between the transformed query and the reference.
    ///
    /// Returns (query_idx, reference_idx) pairs within the correspondence
    /// distance limit.
    fn find_correspondences(
        &self,
        query: &PointCloud3D,
        reference_tree: &KdTree<f64, 3>,
        transform: &Transform3D,
    ) -> Vec<(usize, usize)> {
        let max_dist_sq = self.config.max_correspondence_distance.powi(2);
        let mut correspondences = Vec::with_capacity(query.len());

        for (i, point) in query.points.iter().enumerate() {
            let p = transform.transform_point(point);
            let nearest = reference_tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z]);
            if nearest.distance <= max_dist_sq {
                correspondences.push((i, nearest.item as usize));
            }
        }

        correspondences
    }

    /// Compute the optimal incremental transform for the correspondence set.
    ///
    /// Closed-form point-to-point solution: centroids are removed, the 3×3
    /// cross-covariance is decomposed with SVD and the rotation is
    /// `V·D·Uᵀ` with `D = diag(1, 1, det(VUᵀ))` to rule out reflections.
    fn compute_step(
        &self,
        query: &PointCloud3D,
        reference: &PointCloud3D,
        correspondences: &[(usize, usize)],
        current: &Transform3D,
    ) -> Option<Transform3D> {
        if correspondences.len() < 3 {
            return None;
        }

        let n = correspondences.len() as f64;
        let mut query_centroid = Vector3::zeros();
        let mut reference_centroid = Vector3::zeros();
        for &(qi, ri) in correspondences {
            query_centroid += current.transform_point(&query.points[qi]).to_vector();
            reference_centroid += reference.points[ri].to_vector();
        }
        query_centroid /= n;
        reference_centroid /= n;

        let mut h = Matrix3::zeros();
        for &(qi, ri) in correspondences {
            let q = current.transform_point(&query.points[qi]).to_vector() - query_centroid;
            let r = reference.points[ri].to_vector() - reference_centroid;
            h += q * r.transpose();
        }

        let svd = h.svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return None;
        };
        let mut v = v_t.transpose();
        let mut rotation = v * u.transpose();
        if rotation.determinant() < 0.0 {
            let flipped = -v.column(2).clone_owned();
            v.set_column(2, &flipped);
            rotation = v * u.transpose();
        }

        let rotation = UnitQuaternion::from_matrix(&rotation);
        let translation = reference_centroid - rotation * query_centroid;
        Some(Transform3D::new(translation, rotation))
    }

    /// Mean squared correspondence error under a transform.
    fn compute_mse(
        &self,
        query: &PointCloud3D,
        reference: &PointCloud3D,
        correspondences: &[(usize, usize)],
        transform: &Transform3D,
    ) -> f64 {
        if correspondences.is_empty() {
            return f64::MAX;
        }

        let mut sum_sq = 0.0;
        for &(qi, ri) in correspondences {
            let p = transform.transform_point(&query.points[qi]);
            sum_sq += p.distance_squared(&reference.points[ri]);
        }
        sum_sq / correspondences.len() as f64
    }
}

impl ScanRegistration for PointToPointIcp {
    fn register(&self, query: &PointCloud3D, reference: &PointCloud3D) -> RegistrationResult {
        if query.is_empty() || reference.is_empty() {
            return RegistrationResult::failed();
        }

        let reference_tree = Self::build_kdtree(reference);

        let mut current = Transform3D::identity();
        let mut iterations = 0u32;
        let mut last_mse = f64::MAX;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;

            let correspondences = self.find_correspondences(query, &reference_tree, &current);
            if correspondences.len() < self.config.min_correspondences {
                return RegistrationResult::failed();
            }

            let Some(step) = self.compute_step(query, reference, &correspondences, &current) else {
                return RegistrationResult::failed();
            };

            // The step aligns the already-transformed query, so it composes
            // on the outside.
            current = step.compose(&current);

            let mse = self.compute_mse(query, reference, &correspondences, &current);

            if step.translation_norm() < self.config.epsilon
                && step.rotation.angle() < self.config.epsilon
            {
                return RegistrationResult::success(current, iterations, mse);
            }

            if mse > last_mse * 1.1 {
                // Diverging; keep the best estimate found so far.
                break;
            }
            last_mse = mse;
        }

        let correspondences = self.find_correspondences(query, &reference_tree, &current);
        let final_mse = self.compute_mse(query, reference, &correspondences, &current);

        RegistrationResult {
            transform: current,
            converged: false,
            iterations,
            mse: final_mse,
        }
    }
}
