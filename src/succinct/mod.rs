//! Succinct rank/select sequences over small alphabets.
//!
//! A [`RankSelectSeq`] stores a sequence of symbols in `0..sigma` and answers
//! three queries:
//!
//! - `access(pos)`: the symbol at `pos`
//! - `count(symbol)`: how many positions hold `symbol`
//! - `select(symbol, j)`: the `j`-th smallest such position (1-indexed)
//!
//! Enumerating `select(s, 1..=count(s))` yields the **posting list** of `s`:
//! its positions in strictly increasing order. [`Postings`] exposes that list
//! as a lazy [`SortedList`](crate::intersect::SortedList) view, so posting
//! lists are decoded on demand rather than materialized.
//!
//! # Encodings
//!
//! | Encoding | `access` | `select` | Space |
//! |----------|----------|----------|-------|
//! | [`EliasFanoSeq`] (default) | O(1) | O(1) amortized | packed symbols + one Elias–Fano list per symbol |
//! | [`PackedSeq`] | O(1) | sample + scan | packed symbols + one sample per `SAMPLE_RATE` occurrences |
//!
//! Encodings are chosen statically through [`SeqEncoding`], the type
//! parameter `S` of [`KnrIndex`](crate::knr::KnrIndex).

mod bitvec;
mod elias_fano;
mod packed;
mod seq;

pub use bitvec::BitVector;
pub use elias_fano::EliasFano;
pub use packed::{bit_width, PackedInts};
pub use seq::{EliasFanoSeq, PackedSeq, SAMPLE_RATE};

use crate::intersect::SortedList;
use crate::persistence::Persist;
use crate::Result;

/// Read-only sequence with per-symbol select.
pub trait RankSelectSeq: Send + Sync {
    /// Sequence length.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alphabet size; every symbol is `< sigma()`.
    fn sigma(&self) -> u32;

    /// Symbol at `pos`. Panics if `pos >= len()`.
    fn access(&self, pos: usize) -> u32;

    /// Occurrences of `symbol` (0 for symbols outside the alphabet).
    fn count(&self, symbol: u32) -> usize;

    /// Position of the `j`-th occurrence of `symbol`, 1-indexed.
    ///
    /// Panics unless `1 <= j <= count(symbol)`.
    fn select(&self, symbol: u32, j: usize) -> usize;

    /// Checked [`select`](RankSelectSeq::select).
    fn try_select(&self, symbol: u32, j: usize) -> Option<usize> {
        (j >= 1 && j <= self.count(symbol)).then(|| self.select(symbol, j))
    }

    /// Lazy posting-list view of `symbol`.
    fn postings(&self, symbol: u32) -> Postings<'_, Self>
    where
        Self: Sized,
    {
        Postings::new(self, symbol)
    }

    /// Memory size in bytes.
    fn memory_bytes(&self) -> usize;
}

/// Pluggable construction strategy for a [`RankSelectSeq`].
pub trait SeqEncoding: RankSelectSeq + Persist {
    /// Tag written ahead of the encoded body.
    const TAG: u8;

    /// Human-readable name (used in logs).
    const NAME: &'static str;

    /// Encode `symbols`, each of which must be `< sigma`.
    fn encode(symbols: &[u32], sigma: u32) -> Result<Self>;
}

/// Increasing positions of one symbol, decoded on demand.
#[derive(Debug)]
pub struct Postings<'a, S> {
    seq: &'a S,
    symbol: u32,
    len: usize,
}

impl<S> Clone for Postings<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Postings<'_, S> {}

impl<'a, S: RankSelectSeq> Postings<'a, S> {
    pub fn new(seq: &'a S, symbol: u32) -> Self {
        Self {
            seq,
            symbol,
            len: seq.count(symbol),
        }
    }

    pub fn symbol(&self) -> u32 {
        self.symbol
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + 'a {
        let (seq, symbol) = (self.seq, self.symbol);
        (1..=self.len).map(move |j| seq.select(symbol, j))
    }
}

impl<S: RankSelectSeq> SortedList for Postings<'_, S> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        self.seq.select(self.symbol, i + 1) as u64
    }
}

/// Validate raw symbols against `sigma`.
pub(crate) fn check_symbols(symbols: &[u32], sigma: u32) -> Result<()> {
    if let Some((pos, &s)) = symbols.iter().enumerate().find(|&(_, &s)| s >= sigma) {
        return Err(crate::RetrieveError::InvalidParameter(format!(
            "symbol {s} at position {pos} outside alphabet of size {sigma}"
        )));
    }
    Ok(())
}
