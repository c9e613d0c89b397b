// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid axis inference from point-to-point displacements.
//!
//! Scan-line point exports step along a dominant direction with a fixed
//! spacing. Clustering the planar displacement between consecutive points
//! by direction and taking the most frequent cluster recovers that
//! stepping vector without any neighbour search.

use nalgebra::{Point2, Vector2};

use crate::mesh::Vertex;

/// Default tolerance for treating two unit directions as equal
pub const DEFAULT_DIRECTION_TOLERANCE: f64 = 0.1;

/// Displacements shorter than this are treated as coincident points
const MIN_STEP_LENGTH: f64 = 1e-9;

/// Project a vertex onto the map (x, y) plane
#[inline]
pub fn planar(v: &Vertex) -> Point2<f64> {
    Point2::new(v.x, v.y)
}

/// Split a displacement into unit direction and length
#[inline]
pub fn unit_direction(displacement: &Vector2<f64>) -> Option<(Vector2<f64>, f64)> {
    let length = displacement.norm();
    if length > MIN_STEP_LENGTH && length.is_finite() {
        Some((displacement / length, length))
    } else {
        None
    }
}

/// Fuzzy equality of two unit directions
#[inline]
pub fn directions_match(a: &Vector2<f64>, b: &Vector2<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// One direction cluster: representative unit direction, number of
/// displacements that fell into it and the shortest of them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionCluster {
    pub direction: Vector2<f64>,
    pub count: usize,
    pub min_length: f64,
}

impl DirectionCluster {
    /// Stepping vector: the representative direction at its shortest observed length
    #[inline]
    pub fn axis(&self) -> Vector2<f64> {
        self.direction * self.min_length
    }
}

/// Incremental clustering of displacement directions.
///
/// Clusters keep first-seen order, which is also the tie-break when two
/// clusters have the same count.
#[derive(Debug, Clone)]
pub struct DirectionClusters {
    clusters: Vec<DirectionCluster>,
    tolerance: f64,
    last_hit: usize,
}

impl DirectionClusters {
    /// Create an empty clustering with the given direction tolerance
    pub fn new(tolerance: f64) -> Self {
        Self {
            clusters: Vec::new(),
            tolerance,
            last_hit: 0,
        }
    }

    /// Add one displacement. Returns false if it was too short to have a direction.
    pub fn add(&mut self, displacement: Vector2<f64>) -> bool {
        let Some((direction, length)) = unit_direction(&displacement) else {
            return false;
        };

        // Consecutive steps usually repeat the previous direction
        let hit = match self.clusters.get(self.last_hit) {
            Some(c) if directions_match(&c.direction, &direction, self.tolerance) => {
                Some(self.last_hit)
            }
            _ => self
                .clusters
                .iter()
                .position(|c| directions_match(&c.direction, &direction, self.tolerance)),
        };

        match hit {
            Some(index) => {
                let cluster = &mut self.clusters[index];
                cluster.count += 1;
                cluster.min_length = cluster.min_length.min(length);
                self.last_hit = index;
            }
            None => {
                self.clusters.push(DirectionCluster {
                    direction,
                    count: 1,
                    min_length: length,
                });
                self.last_hit = self.clusters.len() - 1;
            }
        }
        true
    }

    /// Number of distinct directions seen
    #[inline]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters ordered by count, most frequent first (stable for ties)
    pub fn ranked(&self) -> Vec<DirectionCluster> {
        let mut ranked = self.clusters.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// The dominant stepping vector, if any displacement was recorded
    pub fn primary_axis(&self) -> Option<Vector2<f64>> {
        // max_by_key returns the last maximum; iterate in reverse to keep the first-seen one
        self.clusters
            .iter()
            .rev()
            .max_by_key(|c| c.count)
            .map(DirectionCluster::axis)
    }
}

/// Infer the primary axis of an ordered point sequence
pub fn infer_primary_axis(points: &[Vertex], tolerance: f64) -> Option<Vector2<f64>> {
    let mut clusters = DirectionClusters::new(tolerance);
    for pair in points.windows(2) {
        clusters.add(planar(&pair[1]) - planar(&pair[0]));
    }
    clusters.primary_axis()
}

/// Number of whole axis steps a displacement spans, if it points along the axis.
///
/// Returns `None` for displacements in any other direction (including the
/// reverse direction) and for zero-length displacements.
pub fn steps_along(displacement: &Vector2<f64>, axis: &Vector2<f64>, tolerance: f64) -> Option<usize> {
    let (direction, length) = unit_direction(displacement)?;
    let (axis_direction, axis_length) = unit_direction(axis)?;
    if !directions_match(&direction, &axis_direction, tolerance) {
        return None;
    }
    Some(((length / axis_length).round() as usize).max(1))
}

/// Signed offset of `point` from `origin`, in axis steps, measured along the axis.
///
/// This places `point` on the reference line through `origin` extended
/// infinitely along the axis.
pub fn projected_steps(origin: &Point2<f64>, point: &Point2<f64>, axis: &Vector2<f64>) -> i64 {
    let axis_length_sq = axis.norm_squared();
    if axis_length_sq <= 0.0 || !axis_length_sq.is_finite() {
        return 0;
    }
    let steps = (point - origin).dot(axis) / axis_length_sq;
    if steps.is_finite() {
        steps.round() as i64
    } else {
        0
    }
}

/// Row/column stride that brings the native spacing up to the preferred distance
pub fn decimation_stride(preferred_point_distance: f64, axis: &Vector2<f64>) -> usize {
    let ratio = preferred_point_distance / axis.norm();
    if ratio.is_finite() && ratio >= 1.0 {
        ratio as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clusters_collapse_near_duplicates() {
        let mut clusters = DirectionClusters::new(DEFAULT_DIRECTION_TOLERANCE);
        assert!(clusters.add(Vector2::new(10.0, 0.0)));
        assert!(clusters.add(Vector2::new(10.0, 0.2)));
        assert!(clusters.add(Vector2::new(9.0, 0.0)));
        assert!(clusters.add(Vector2::new(0.0, 25.0)));
        assert!(!clusters.add(Vector2::new(0.0, 0.0)));

        assert_eq!(clusters.len(), 2);
        let ranked = clusters.ranked();
        assert_eq!(ranked[0].count, 3);
        assert_relative_eq!(ranked[0].min_length, 9.0);
        assert_eq!(ranked[1].count, 1);
    }

    #[test]
    fn test_opposite_directions_are_distinct() {
        let mut clusters = DirectionClusters::new(DEFAULT_DIRECTION_TOLERANCE);
        clusters.add(Vector2::new(1.0, 0.0));
        clusters.add(Vector2::new(-1.0, 0.0));
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_primary_axis_uses_shortest_step() {
        let points: Vec<Vertex> = [0.0, 5.0, 10.0, 12.5, 17.5]
            .iter()
            .map(|&x| Vertex::new(x, 100.0, -1.0))
            .collect();
        let axis = infer_primary_axis(&points, DEFAULT_DIRECTION_TOLERANCE).unwrap();
        assert_relative_eq!(axis.x, 2.5);
        assert_relative_eq!(axis.y, 0.0);
    }

    #[test]
    fn test_primary_axis_tie_keeps_first_seen() {
        let mut clusters = DirectionClusters::new(DEFAULT_DIRECTION_TOLERANCE);
        clusters.add(Vector2::new(0.0, 2.0));
        clusters.add(Vector2::new(3.0, 0.0));
        let axis = clusters.primary_axis().unwrap();
        assert_relative_eq!(axis.y, 2.0);
        assert_relative_eq!(axis.x, 0.0);
    }

    #[test]
    fn test_no_axis_for_single_point() {
        assert!(infer_primary_axis(&[Vertex::origin()], 0.1).is_none());
        assert!(DirectionClusters::new(0.1).is_empty());
    }

    #[test]
    fn test_steps_along() {
        let axis = Vector2::new(2.0, 0.0);
        assert_eq!(steps_along(&Vector2::new(2.0, 0.0), &axis, 0.1), Some(1));
        assert_eq!(steps_along(&Vector2::new(6.1, 0.0), &axis, 0.1), Some(3));
        assert_eq!(steps_along(&Vector2::new(-2.0, 0.0), &axis, 0.1), None);
        assert_eq!(steps_along(&Vector2::new(0.0, 2.0), &axis, 0.1), None);
        assert_eq!(steps_along(&Vector2::new(0.0, 0.0), &axis, 0.1), None);
    }

    #[test]
    fn test_projected_steps() {
        let axis = Vector2::new(0.0, 5.0);
        let origin = Point2::new(100.0, 200.0);
        assert_eq!(projected_steps(&origin, &Point2::new(150.0, 210.0), &axis), 2);
        assert_eq!(projected_steps(&origin, &Point2::new(90.0, 184.0), &axis), -3);
        assert_eq!(projected_steps(&origin, &origin, &Vector2::zeros()), 0);
    }

    #[test]
    fn test_decimation_stride() {
        let axis = Vector2::new(25.0, 0.0);
        assert_eq!(decimation_stride(0.0, &axis), 1);
        assert_eq!(decimation_stride(10.0, &axis), 1);
        assert_eq!(decimation_stride(100.0, &axis), 4);
        assert_eq!(decimation_stride(120.0, &axis), 4);
        assert_eq!(decimation_stride(f64::NAN, &axis), 1);
        assert_eq!(decimation_stride(100.0, &Vector2::zeros()), 1);
    }
}
