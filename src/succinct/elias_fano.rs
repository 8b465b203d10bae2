//! Elias–Fano encoding of monotone integer sequences.
//!
//! A non-decreasing sequence of `n` values below `universe` is split into
//! `l = floor(log2(universe / n))` low bits, stored verbatim in a
//! [`PackedInts`], and the remaining high bits, stored in unary in a
//! [`BitVector`]: value `i` sets bit `(v_i >> l) + i`. Access to the `i`-th
//! value is one `select1` plus one packed read:
//!
//! ```text
//! v_i = ((select1(i) - i) << l) | low_i
//! ```
//!
//! Space is about `2 + log2(universe / n)` bits per value.

use super::bitvec::BitVector;
use super::packed::PackedInts;
use crate::persistence::codec::{read_len, read_u64, write_len, write_u64, MAX_ARRAY_LEN};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use std::io::{Read, Write};

/// Compressed, random-access, non-decreasing `u64` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliasFano {
    len: usize,
    universe: u64,
    lows: PackedInts,
    highs: BitVector,
}

impl EliasFano {
    /// Encode `values`, which must be non-decreasing and below `universe`.
    ///
    /// Panics if the input breaks that contract or `universe` is too large
    /// to address.
    pub fn new(values: &[u64], universe: u64) -> Self {
        let len = values.len();
        let low_bits = low_bits_for(len, universe);

        let mut lows = PackedInts::new(low_bits, len);
        let high_len = high_bits_len(len, universe, low_bits)
            .unwrap_or_else(|| panic!("Elias-Fano universe {universe} too large"));
        let mut prev = 0u64;
        let highs = BitVector::from_positions(
            high_len,
            values.iter().enumerate().map(|(i, &v)| {
                assert!(v >= prev, "Elias-Fano input must be non-decreasing");
                assert!(v < universe.max(1), "value {v} outside universe {universe}");
                prev = v;
                lows.set(i, v);
                (v >> low_bits) as usize + i
            }),
        );

        Self {
            len,
            universe,
            lows,
            highs,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// The `i`-th value (0-based). Panics if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        assert!(i < self.len, "index {i} out of bounds for length {}", self.len);
        let high = (self.highs.select1(i) - i) as u64;
        (high << self.lows.width()) | self.lows.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Memory size in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.lows.memory_bytes() + self.highs.memory_bytes()
    }
}

fn low_bits_for(len: usize, universe: u64) -> u32 {
    if len == 0 || universe <= len as u64 {
        return 0;
    }
    (universe / len as u64).ilog2()
}

/// Length of the unary high-bits vector, `None` if it overflows `usize`.
fn high_bits_len(len: usize, universe: u64, low_bits: u32) -> Option<usize> {
    usize::try_from(universe >> low_bits)
        .ok()?
        .checked_add(len)?
        .checked_add(1)
}

impl Persist for EliasFano {
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_len(writer, self.len)?;
        write_u64(writer, self.universe)?;
        self.lows.write_to(writer)?;
        self.highs.write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let len = read_len(reader, MAX_ARRAY_LEN)?;
        let universe = read_u64(reader)?;
        let lows = PackedInts::read_from(reader)?;
        let highs = BitVector::read_from(reader)?;

        let low_bits = low_bits_for(len, universe);
        if lows.len() != len || lows.width() != low_bits {
            return Err(PersistenceError::InvalidState(format!(
                "Elias-Fano low bits: {} values of width {}, expected {len} of width {low_bits}",
                lows.len(),
                lows.width()
            )));
        }
        let high_len = high_bits_len(len, universe, low_bits).ok_or_else(|| {
            PersistenceError::Format(format!("Elias-Fano universe {universe} overflows"))
        })?;
        if highs.count_ones() != len || highs.len() != high_len {
            return Err(PersistenceError::InvalidState(
                "Elias-Fano high bits do not match header".to_string(),
            ));
        }
        Ok(Self {
            len,
            universe,
            lows,
            highs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_random_access() {
        let values: Vec<u64> = (0..500u64).map(|i| i * i / 7 + 3).collect();
        let universe = values.last().unwrap() + 1;
        let ef = EliasFano::new(&values, universe);
        assert_eq!(ef.len(), values.len());
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(ef.get(i), v);
        }
        assert_eq!(ef.iter().collect::<Vec<_>>(), values);
    }

    #[test]
    fn test_duplicates_and_dense() {
        let values = vec![0, 0, 1, 1, 1, 2, 5, 5];
        let ef = EliasFano::new(&values, 6);
        assert_eq!(ef.iter().collect::<Vec<_>>(), values);
    }

    #[test]
    fn test_sparse_is_smaller_than_plain() {
        let values: Vec<u64> = (0..1000u64).map(|i| i * 1000).collect();
        let ef = EliasFano::new(&values, 1_000_000);
        assert!(ef.memory_bytes() < values.len() * 8 / 2);
    }

    #[test]
    fn test_empty() {
        let ef = EliasFano::new(&[], 0);
        assert!(ef.is_empty());
        assert_eq!(ef.iter().count(), 0);
    }

    #[test]
    fn test_persist_roundtrip() {
        let values = vec![3, 9, 27, 81, 243];
        let ef = EliasFano::new(&values, 300);
        let mut buf = Vec::new();
        ef.write_to(&mut buf).unwrap();
        let loaded = EliasFano::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(loaded, ef);
    }

    #[test]
    fn test_corrupt_universe_is_format_error() {
        let ef = EliasFano::new(&[], 0);
        let mut buf = Vec::new();
        ef.write_to(&mut buf).unwrap();
        // len (8 bytes) then universe (8 bytes).
        buf[8..16].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = EliasFano::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));
    }

    #[test]
    fn test_corrupt_universe_mismatch_rejected() {
        let ef = EliasFano::new(&[1, 4, 6], 8);
        let mut buf = Vec::new();
        ef.write_to(&mut buf).unwrap();
        buf[8..16].copy_from_slice(&(1u64 << 40).to_le_bytes());
        assert!(EliasFano::read_from(&mut Cursor::new(&buf)).is_err());
    }
}
