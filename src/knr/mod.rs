//! K-nearest-reference (KNR) signature index.
//!
//! Every object is summarized by its **signature**: the ids of its `K`
//! nearest landmarks, nearest first. Signatures are concatenated into one
//! sequence of length `n * K` over the landmark alphabet and encoded as a
//! succinct [`RankSelectSeq`](crate::succinct::RankSelectSeq), so position
//! `p` holds the `(p % K)`-th landmark of object `p / K`.
//!
//! A query computes its own signature against the same reference index and
//! generates candidates from the posting lists of its landmarks:
//!
//! - **Small datasets** (`n < small_dataset_threshold`): one counter per
//!   object, advanced at rank `i` only if the object already matched ranks
//!   `0..i`. Candidates are ranked by matched prefix length.
//! - **Large datasets**: rank lists are shifted by `-i` and intersected with
//!   the rank-0 list until the intersection would fall to `max_candidates`
//!   or below. Surviving object-aligned positions are the candidates.
//!
//! Candidates are then re-ranked by true distance, spending at most
//! `|max_candidates|` distance evaluations. A negative `max_candidates`
//! returns the candidate ranking itself.
//!
//! # Example
//!
//! ```rust
//! use landmark::knr::{KnrIndex, KnrParams, LinearScan};
//! use landmark::{MetricIndex, VectorDataset};
//!
//! let base = VectorDataset::from_scalars(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
//! let landmarks = base.subset(&[0, 3, 5]);
//! let params = KnrParams { k: 2, ..KnrParams::default() };
//!
//! let index: KnrIndex<_> = KnrIndex::build(base, LinearScan::new(landmarks), params)?;
//! let hits = index.search_knn(&[2.2], 1);
//! assert_eq!(hits.first().map(|n| n.id), Some(2));
//! # Ok::<(), landmark::RetrieveError>(())
//! ```

mod candidates;
mod index;
mod reference;

pub use index::KnrIndex;
pub use reference::LinearScan;

use crate::{Result, RetrieveError};
use serde::{Deserialize, Serialize};

/// KNR index parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnrParams {
    /// Signature length (landmarks per object).
    pub k: usize,

    /// Distance-evaluation budget per query. Negative values return the raw
    /// candidate ranking, capped at `|max_candidates|` entries.
    pub max_candidates: i32,

    /// Datasets smaller than this use the prefix-counting policy.
    pub small_dataset_threshold: usize,
}

impl Default for KnrParams {
    fn default() -> Self {
        Self {
            k: 7,
            max_candidates: 1024,
            small_dataset_threshold: 500_000,
        }
    }
}

impl KnrParams {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RetrieveError::InvalidParameter(
                "k must be greater than 0".to_string(),
            ));
        }
        if self.k > i32::MAX as usize {
            return Err(RetrieveError::InvalidParameter(format!(
                "k = {} does not fit the persisted format",
                self.k
            )));
        }
        if self.max_candidates == 0 {
            return Err(RetrieveError::InvalidParameter(
                "max_candidates must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Candidate cap, independent of raw mode.
    pub fn candidate_limit(&self) -> usize {
        self.max_candidates.unsigned_abs() as usize
    }

    /// Whether searches return unresolved candidates.
    pub fn raw_candidates(&self) -> bool {
        self.max_candidates < 0
    }
}
