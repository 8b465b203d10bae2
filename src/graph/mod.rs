//! Beam search over a precomputed proximity graph.
//!
//! [`BeamSearchIndex`] consumes a finished [`ApproxGraph`] plus the dataset
//! it was built over. Each query runs a small state machine:
//!
//! 1. **Seeding**: draw `min(sample_size, n)` random vertex ids (repeats
//!    collapse through the per-query [`SearchState`](crate::state::SearchState)),
//!    evaluate each new one, push it into the beam and the accumulator.
//! 2. **Expanding**: visit every neighbor of every beam vertex. Unseen
//!    neighbors are evaluated, pushed into the accumulator and into the next
//!    beam. If the accumulator's covering radius did not shrink for two
//!    consecutive iterations the search stops; `repeat_search` caps the
//!    number of iterations.
//! 3. **Done**: the accumulator is returned.
//!
//! The stopping rule is a local-optimum heuristic. Hitting the iteration cap
//! is not an error.

mod adjacency;
mod beam;

pub use adjacency::{ApproxGraph, NeighborList};
pub use beam::BeamSearchIndex;

use crate::{Result, RetrieveError};
use serde::{Deserialize, Serialize};

/// Beam search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamParams {
    /// Frontier capacity (clamped to the vertex count).
    pub beam_size: usize,

    /// Maximum number of expansion iterations.
    pub repeat_search: usize,

    /// Random draws used to seed the first beam.
    pub sample_size: usize,

    /// Seed for [`BeamSearchIndex::search_knn`]'s generator.
    pub seed: u64,

    /// Compute neighbor distances on the rayon pool.
    ///
    /// Results are identical to sequential expansion. Ignored without the
    /// `parallel` feature.
    pub parallel_expansion: bool,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            beam_size: 32,
            repeat_search: 32,
            sample_size: 1024,
            seed: 0,
            parallel_expansion: false,
        }
    }
}

impl BeamParams {
    pub fn validate(&self) -> Result<()> {
        if self.beam_size == 0 {
            return Err(RetrieveError::InvalidParameter(
                "beam_size must be greater than 0".to_string(),
            ));
        }
        if self.sample_size == 0 {
            return Err(RetrieveError::InvalidParameter(
                "sample_size must be greater than 0".to_string(),
            ));
        }
        for (name, value) in [
            ("beam_size", self.beam_size),
            ("repeat_search", self.repeat_search),
            ("sample_size", self.sample_size),
        ] {
            if value > u32::MAX as usize {
                return Err(RetrieveError::InvalidParameter(format!(
                    "{name} = {value} does not fit the persisted format"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = BeamParams::default();
        assert_eq!(params.beam_size, 32);
        assert_eq!(params.repeat_search, 32);
        assert_eq!(params.sample_size, 1024);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_beam() {
        let params = BeamParams {
            beam_size: 0,
            ..BeamParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let params = BeamParams {
            beam_size: 8,
            parallel_expansion: true,
            ..BeamParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: BeamParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
