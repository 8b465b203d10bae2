//! Distance metrics for dense vectors.
//!
//! The indexes in this crate only see distances through
//! [`MetricDataset::distance`](crate::space::MetricDataset::distance); this
//! module supplies the metrics used by [`VectorDataset`](crate::space::VectorDataset).
//!
//! ## Important nuance
//!
//! The KNR and beam-search indexes treat the distance as an opaque,
//! symmetric oracle. They never check symmetry or the triangle inequality,
//! so any of these metrics (including [`DistanceMetric::InnerProduct`],
//! which can be negative) may be plugged in; results are then only as
//! meaningful as the metric.

use serde::{Deserialize, Serialize};

const NORM_EPSILON: f32 = 1e-9;

/// Distance metric for dense vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    L2,
    /// Cosine distance $1 - \cos(a,b)$.
    Cosine,
    /// Angular distance $\arccos(\cos(a,b)) / \pi$, in `[0,1]`.
    Angular,
    /// Inner product distance $-\langle a,b\rangle$ (for maximum inner product search).
    InnerProduct,
}

impl DistanceMetric {
    /// Compute distance between two vectors.
    ///
    /// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
    /// nearest neighbor).
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => l2_distance(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Angular => angular_distance(a, b),
            DistanceMetric::InnerProduct => inner_product_distance(a, b),
        }
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            DistanceMetric::L2 => 0,
            DistanceMetric::Cosine => 1,
            DistanceMetric::Angular => 2,
            DistanceMetric::InnerProduct => 3,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(DistanceMetric::L2),
            1 => Some(DistanceMetric::Cosine),
            2 => Some(DistanceMetric::Angular),
            3 => Some(DistanceMetric::InnerProduct),
            _ => None,
        }
    }
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let na = dot(a, a).sqrt();
    let nb = dot(b, b).sqrt();
    if na > NORM_EPSILON && nb > NORM_EPSILON {
        dot(a, b) / (na * nb)
    } else {
        0.0
    }
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Cosine distance $1 - \cos(a,b)$.
///
/// Computes norms, so inputs need not be normalized. A zero vector is at
/// distance 1 from everything.
#[inline]
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    1.0 - cosine(a, b).clamp(-1.0, 1.0)
}

/// Angular distance $\arccos(\cos(a,b)) / \pi$, in `[0,1]`.
#[inline]
#[must_use]
pub fn angular_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    cosine(a, b).clamp(-1.0, 1.0).acos() / std::f32::consts::PI
}

/// Inner product distance (negative dot product).
#[inline]
#[must_use]
pub fn inner_product_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    -dot(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_on_scalars_is_absolute_difference() {
        assert_eq!(l2_distance(&[6.0], &[5.0]), 1.0);
        assert_eq!(l2_distance(&[6.0], &[0.0]), 6.0);
    }

    #[test]
    fn cosine_distance_is_zero_for_identical() {
        let a = [1.0_f32, 2.0, 3.0];
        let d = cosine_distance(&a, &a);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn mismatched_dimensions_are_infinitely_far() {
        for metric in [
            DistanceMetric::L2,
            DistanceMetric::Cosine,
            DistanceMetric::Angular,
            DistanceMetric::InnerProduct,
        ] {
            assert_eq!(metric.distance(&[1.0], &[1.0, 2.0]), f32::INFINITY);
        }
    }

    #[test]
    fn tags_roundtrip() {
        for metric in [
            DistanceMetric::L2,
            DistanceMetric::Cosine,
            DistanceMetric::Angular,
            DistanceMetric::InnerProduct,
        ] {
            assert_eq!(DistanceMetric::from_tag(metric.tag()), Some(metric));
        }
        assert_eq!(DistanceMetric::from_tag(9), None);
    }
}
