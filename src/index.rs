//! Unified search capability shared by every index.

use crate::result::TopK;
use crate::space::MetricDataset;

/// Read-only nearest-neighbor index over a [`MetricDataset`].
///
/// Searches are infallible: an empty dataset or an oversized `k` yields a
/// short (possibly empty) result rather than an error.
pub trait MetricIndex<D: MetricDataset>: Send + Sync {
    /// The indexed objects.
    fn dataset(&self) -> &D;

    /// Up to `k` nearest objects to `query`, ascending by distance.
    fn search_knn(&self, query: &D::Object, k: usize) -> TopK {
        self.search_knn_into(query, TopK::new(k))
    }

    /// Push results into a caller-supplied accumulator and return it.
    ///
    /// The accumulator decides capacity and tie policy.
    fn search_knn_into(&self, query: &D::Object, acc: TopK) -> TopK;

    /// Objects within `radius` of `query`, ascending by distance.
    fn search_range(&self, query: &D::Object, radius: f32) -> TopK;

    /// Approximate heap size in bytes, excluding the dataset.
    fn size_bytes(&self) -> usize;

    /// Summary for logs and benchmarks.
    fn stats(&self) -> IndexStats {
        IndexStats {
            num_objects: self.dataset().len(),
            size_bytes: self.size_bytes(),
            algorithm: self.algorithm(),
        }
    }

    /// Short algorithm name.
    fn algorithm(&self) -> &'static str;
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub num_objects: usize,
    pub size_bytes: usize,
    pub algorithm: &'static str,
}
