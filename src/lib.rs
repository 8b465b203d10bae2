//! landmark: approximate nearest neighbor search over metric spaces.
//!
//! Two indexes over any [`MetricDataset`]:
//!
//! - [`knr`]: K-nearest-reference signatures. Every object is reduced to the
//!   ranked ids of its `K` nearest landmarks, all signatures live in one
//!   succinct rank/select sequence, and queries gather candidates from
//!   landmark posting lists before re-ranking by true distance.
//! - [`graph`]: stochastic beam search over a precomputed proximity graph,
//!   stopping when the result's covering radius stops shrinking.
//!
//! Supporting modules, leaves first:
//!
//! - `result`: [`TopK`], the bounded accumulator every search pushes into
//! - `state`: [`SearchState`], the per-query set of evaluated ids
//! - `succinct`: bit vectors, Elias–Fano lists, rank/select sequences
//! - `intersect`: adaptive intersection of sorted lists
//! - `persistence`: little-endian binary format shared by all indexes
//!
//! # Critical Nuances
//!
//! ## Approximation comes from the candidate envelope
//!
//! Both indexes only compute true distances for objects they reach: KNR for
//! its candidates (at most `|max_candidates|` of them), beam search for the
//! vertices it walks. Range queries are therefore approximate too.
//!
//! ## Signatures must be ranked identically at build and query time
//!
//! Candidate generation compares the query's signature to stored ones
//! position by position. The reference index must break distance ties the
//! same way for both, which [`knr::LinearScan`] does by ascending landmark id.
//!
//! ## Beam search stops at local optima
//!
//! Two consecutive expansions without a smaller covering radius end the
//! search. A graph with poor connectivity or a small `beam_size` can stop far
//! from the true neighbors; `repeat_search` only bounds the work.

pub mod distance;
pub mod error;
pub mod graph;
pub mod index;
pub mod intersect;
pub mod knr;
pub mod persistence;
pub mod result;
pub mod space;
pub mod state;
pub mod succinct;

// Re-exports
pub use distance::DistanceMetric;
pub use error::{Result, RetrieveError};
pub use graph::{ApproxGraph, BeamParams, BeamSearchIndex};
pub use index::{IndexStats, MetricIndex};
pub use knr::{KnrIndex, KnrParams, LinearScan};
pub use result::{Neighbor, TopK};
pub use space::{MetricDataset, VectorDataset};
pub use state::SearchState;
pub use succinct::{EliasFanoSeq, PackedSeq, RankSelectSeq, SeqEncoding};
