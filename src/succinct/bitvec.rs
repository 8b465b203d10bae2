//! Static bit vector with rank and select support.
//!
//! # Directories
//!
//! - **Rank**: cumulative popcount before every superblock of
//!   `SUPERBLOCK_WORDS` words, so `rank1` is one lookup plus at most seven
//!   popcounts.
//! - **Select**: the word holding every `SELECT_SAMPLE`-th one bit.
//!   `select1` starts at the sampled word and scans forward.
//!
//! Both directories cost a few percent of the raw bits for the dense
//! high-bits arrays produced by Elias–Fano encoding.

use crate::persistence::codec::{
    read_len, read_u64_vec, write_len, write_u64_slice, MAX_ARRAY_LEN,
};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use std::io::{Read, Write};

const SUPERBLOCK_WORDS: usize = 8;
const SELECT_SAMPLE: usize = 256;

/// Immutable bit vector supporting `rank1` and `select1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
    ones: usize,
    superblock_ranks: Vec<u64>,
    select_samples: Vec<u64>,
}

impl BitVector {
    /// Build from raw words; bits at or beyond `len` must be zero.
    pub fn from_words(words: Vec<u64>, len: usize) -> Self {
        debug_assert_eq!(words.len(), len.div_ceil(64));

        let mut superblock_ranks = Vec::with_capacity(words.len() / SUPERBLOCK_WORDS + 1);
        let mut select_samples = Vec::new();
        let mut ones = 0usize;
        for (w, &word) in words.iter().enumerate() {
            if w % SUPERBLOCK_WORDS == 0 {
                superblock_ranks.push(ones as u64);
            }
            let count = word.count_ones() as usize;
            // Record this word for every sampled rank that falls inside it.
            while select_samples.len() * SELECT_SAMPLE < ones + count {
                select_samples.push(w as u64);
            }
            ones += count;
        }

        Self {
            words,
            len,
            ones,
            superblock_ranks,
            select_samples,
        }
    }

    /// Build from the positions of the one bits.
    pub fn from_positions(len: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut words = vec![0u64; len.div_ceil(64)];
        for pos in positions {
            assert!(pos < len, "bit {pos} out of bounds for length {len}");
            words[pos / 64] |= 1u64 << (pos % 64);
        }
        Self::from_words(words, len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of one bits.
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    #[inline]
    pub fn get(&self, pos: usize) -> bool {
        assert!(pos < self.len, "bit {pos} out of bounds for length {}", self.len);
        (self.words[pos / 64] >> (pos % 64)) & 1 == 1
    }

    /// Number of ones in `[0, pos)`.
    pub fn rank1(&self, pos: usize) -> usize {
        let pos = pos.min(self.len);
        let word = pos / 64;
        let superblock = word / SUPERBLOCK_WORDS;
        let mut rank = self
            .superblock_ranks
            .get(superblock)
            .map_or(self.ones, |&r| r as usize);
        for w in superblock * SUPERBLOCK_WORDS..word {
            rank += self.words[w].count_ones() as usize;
        }
        if pos % 64 != 0 {
            rank += (self.words[word] & ((1u64 << (pos % 64)) - 1)).count_ones() as usize;
        }
        rank
    }

    /// Position of the one bit with 0-based rank `i`.
    ///
    /// Panics if `i >= count_ones()`.
    pub fn select1(&self, i: usize) -> usize {
        assert!(i < self.ones, "select1({i}) with only {} ones", self.ones);
        let mut word = self.select_samples[i / SELECT_SAMPLE] as usize;
        let mut remaining = i - self.rank1(word * 64);
        loop {
            let count = self.words[word].count_ones() as usize;
            if remaining < count {
                return word * 64 + select_in_word(self.words[word], remaining);
            }
            remaining -= count;
            word += 1;
        }
    }

    /// Memory size in bytes, directories included.
    pub fn memory_bytes(&self) -> usize {
        (self.words.len() + self.superblock_ranks.len() + self.select_samples.len())
            * std::mem::size_of::<u64>()
    }
}

/// Offset of the `rank`-th (0-based) one bit inside `word`.
#[inline]
fn select_in_word(mut word: u64, rank: usize) -> usize {
    for _ in 0..rank {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}

impl Persist for BitVector {
    /// Only the raw bits are stored; directories are rebuilt on load.
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_len(writer, self.len)?;
        write_u64_slice(writer, &self.words)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let len = read_len(reader, MAX_ARRAY_LEN)?;
        let words = read_u64_vec(reader, MAX_ARRAY_LEN)?;
        if words.len() != len.div_ceil(64) {
            return Err(PersistenceError::mismatch(
                "bit vector word count",
                len.div_ceil(64),
                words.len(),
            ));
        }
        if len % 64 != 0 {
            if let Some(&last) = words.last() {
                if last >> (len % 64) != 0 {
                    return Err(PersistenceError::Format(
                        "bit vector has bits set past its length".to_string(),
                    ));
                }
            }
        }
        Ok(Self::from_words(words, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_select(bits: &[bool], i: usize) -> usize {
        bits.iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .nth(i)
            .map(|(p, _)| p)
            .unwrap()
    }

    #[test]
    fn test_rank_select_against_naive() {
        // Mixed density: sparse head, dense middle, sparse tail.
        let len = 5000;
        let bits: Vec<bool> = (0..len)
            .map(|i| if (1000..3000).contains(&i) { i % 3 != 0 } else { i % 97 == 0 })
            .collect();
        let bv = BitVector::from_positions(len, (0..len).filter(|&i| bits[i]));

        let ones = bits.iter().filter(|&&b| b).count();
        assert_eq!(bv.count_ones(), ones);

        for i in 0..ones {
            assert_eq!(bv.select1(i), naive_select(&bits, i), "select1({i})");
        }
        for pos in (0..=len).step_by(37) {
            let expected = bits[..pos].iter().filter(|&&b| b).count();
            assert_eq!(bv.rank1(pos), expected, "rank1({pos})");
        }
    }

    #[test]
    fn test_select_in_word() {
        let word = 0b1011_0100u64;
        assert_eq!(select_in_word(word, 0), 2);
        assert_eq!(select_in_word(word, 1), 4);
        assert_eq!(select_in_word(word, 2), 5);
        assert_eq!(select_in_word(word, 3), 7);
    }

    #[test]
    fn test_empty() {
        let bv = BitVector::from_positions(0, std::iter::empty());
        assert!(bv.is_empty());
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.rank1(10), 0);
    }

    #[test]
    fn test_rejects_stray_bits() {
        let mut buf = Vec::new();
        write_len(&mut buf, 3).unwrap();
        write_u64_slice(&mut buf, &[0b1000]).unwrap();
        assert!(BitVector::read_from(&mut std::io::Cursor::new(buf)).is_err());
    }
}
