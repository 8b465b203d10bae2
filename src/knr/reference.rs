//! Exhaustive reference index over the landmark set.

use crate::index::MetricIndex;
use crate::persistence::{DetachedCodec, IndexHeader, IndexType, PersistenceResult};
use crate::result::TopK;
use crate::space::MetricDataset;
use std::io::{Read, Write};

/// Exact search by scanning every object.
///
/// Objects are offered in id order and [`TopK`] keeps the earliest of equal
/// distances, so ties rank by ascending id. Build-time and query-time
/// signatures therefore agree.
#[derive(Debug, Clone)]
pub struct LinearScan<D> {
    dataset: D,
}

impl<D: MetricDataset> LinearScan<D> {
    pub fn new(dataset: D) -> Self {
        Self { dataset }
    }

    pub fn into_dataset(self) -> D {
        self.dataset
    }
}

impl<D: MetricDataset> MetricIndex<D> for LinearScan<D> {
    fn dataset(&self) -> &D {
        &self.dataset
    }

    fn search_knn_into(&self, query: &D::Object, mut acc: TopK) -> TopK {
        for id in 0..self.dataset.len() as u32 {
            acc.push(id, self.dataset.distance_to(query, id));
        }
        acc
    }

    fn search_range(&self, query: &D::Object, radius: f32) -> TopK {
        let mut out = TopK::unbounded();
        for id in 0..self.dataset.len() as u32 {
            let d = self.dataset.distance_to(query, id);
            if d <= radius {
                out.push(id, d);
            }
        }
        out
    }

    fn size_bytes(&self) -> usize {
        0
    }

    fn algorithm(&self) -> &'static str {
        "LinearScan"
    }
}

impl<D: MetricDataset> DetachedCodec<D> for LinearScan<D> {
    /// A linear scan has no state beyond its dataset: only the header is
    /// written, so a mismatched dataset is caught on load.
    fn write_detached<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        IndexHeader::new(IndexType::LinearScan, self.dataset.len()).write(writer)
    }

    fn read_attached<R: Read>(reader: &mut R, dataset: D) -> PersistenceResult<Self> {
        IndexHeader::read_expecting(reader, IndexType::LinearScan, dataset.len())?;
        Ok(Self { dataset })
    }
}
