//! Metric datasets.
//!
//! A [`MetricDataset`] is an immutable, counted collection of objects with
//! stable ids `0..len()` and a distance oracle between objects. The indexes
//! only ever touch objects through this trait, so objects can be anything:
//! dense vectors ([`VectorDataset`]), strings, sets.

use crate::distance::DistanceMetric;
use crate::persistence::codec::{
    read_f32_vec, read_u32, read_u8, write_f32_slice, write_u32, write_u8, MAX_ARRAY_LEN,
};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use crate::{Result, RetrieveError};
use rand::Rng;
use std::io::{Read, Write};
use std::sync::Arc;

/// Indexable collection of objects plus the distance between them.
///
/// The distance is assumed symmetric and non-negative; neither property is
/// re-verified.
pub trait MetricDataset: Send + Sync {
    /// Object type (unsized types like `[f32]` are fine).
    type Object: ?Sized + Sync;

    /// Number of objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object with id `id`. Panics if `id >= len()`.
    fn get(&self, id: u32) -> &Self::Object;

    /// Distance between two objects.
    fn distance(&self, a: &Self::Object, b: &Self::Object) -> f32;

    /// Distance from an arbitrary query to stored object `id`.
    #[inline]
    fn distance_to(&self, query: &Self::Object, id: u32) -> f32 {
        self.distance(query, self.get(id))
    }
}

impl<D: MetricDataset> MetricDataset for Arc<D> {
    type Object = D::Object;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, id: u32) -> &Self::Object {
        (**self).get(id)
    }

    fn distance(&self, a: &Self::Object, b: &Self::Object) -> f32 {
        (**self).distance(a, b)
    }
}

/// Dense `f32` vectors stored row-major in one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDataset {
    dimension: usize,
    metric: DistanceMetric,
    vectors: Vec<f32>,
}

impl VectorDataset {
    /// Wrap a flat buffer of `vectors.len() / dimension` rows.
    pub fn new(dimension: usize, metric: DistanceMetric, vectors: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if vectors.len() % dimension != 0 {
            return Err(RetrieveError::InvalidParameter(format!(
                "buffer of {} floats is not a multiple of dimension {}",
                vectors.len(),
                dimension
            )));
        }
        if vectors.len() / dimension > u32::MAX as usize {
            return Err(RetrieveError::InvalidParameter(
                "more than u32::MAX vectors".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            metric,
            vectors,
        })
    }

    /// Build from individual rows, which must all share one dimension.
    pub fn from_rows<V: AsRef<[f32]>>(
        rows: &[V],
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let mut vectors = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(RetrieveError::InvalidParameter(format!(
                    "row {i} has dimension {}, expected {dimension}",
                    row.len()
                )));
            }
            vectors.extend_from_slice(row);
        }
        Self::new(dimension, metric, vectors)
    }

    /// One-dimensional dataset, handy for scalar metric spaces.
    pub fn from_scalars(values: &[f32]) -> Result<Self> {
        Self::new(1, DistanceMetric::L2, values.to_vec())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// New dataset holding rows `ids`, renumbered `0..ids.len()` in order.
    ///
    /// Used to carve a landmark dataset out of a base dataset.
    pub fn subset(&self, ids: &[u32]) -> Self {
        let mut vectors = Vec::with_capacity(ids.len() * self.dimension);
        for &id in ids {
            vectors.extend_from_slice(self.get(id));
        }
        Self {
            dimension: self.dimension,
            metric: self.metric,
            vectors,
        }
    }
}

impl MetricDataset for VectorDataset {
    type Object = [f32];

    fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[inline]
    fn get(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.metric.distance(a, b)
    }
}

impl Persist for VectorDataset {
    /// Layout: `[dimension: u32][metric: u8][len: u64][f32 ...]`.
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_u32(writer, self.dimension as u32)?;
        write_u8(writer, self.metric.tag())?;
        write_f32_slice(writer, &self.vectors)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let dimension = read_u32(reader)? as usize;
        let tag = read_u8(reader)?;
        let metric = DistanceMetric::from_tag(tag)
            .ok_or_else(|| PersistenceError::Format(format!("unknown distance metric {tag}")))?;
        let vectors = read_f32_vec(reader, MAX_ARRAY_LEN)?;
        VectorDataset::new(dimension, metric, vectors)
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))
    }
}

/// Draw `count` distinct ids from `0..n` (clamped to `n`), sorted ascending.
pub fn sample_landmarks<R: Rng + ?Sized>(n: usize, count: usize, rng: &mut R) -> Vec<u32> {
    let mut ids: Vec<u32> = rand::seq::index::sample(rng, n, count.min(n))
        .into_iter()
        .map(|i| i as u32)
        .collect();
    ids.sort_unstable();
    ids
}
