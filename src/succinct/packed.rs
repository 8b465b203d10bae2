//! Fixed-width bit-packed integer array.

use crate::persistence::codec::{
    read_len, read_u32, read_u64_vec, write_len, write_u32, write_u64_slice, MAX_ARRAY_LEN,
};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use std::io::{Read, Write};

/// Number of bits needed to store `max` (0 for `max == 0`).
#[inline]
pub fn bit_width(max: u64) -> u32 {
    64 - max.leading_zeros()
}

/// `len` unsigned integers of `width` bits each, packed into `u64` words.
///
/// Values may straddle a word boundary. `width == 0` stores nothing and
/// reads back zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedInts {
    width: u32,
    len: usize,
    words: Vec<u64>,
}

impl PackedInts {
    /// Zero-filled array.
    pub fn new(width: u32, len: usize) -> Self {
        assert!(width <= 64, "width {width} exceeds 64 bits");
        let bits = width as usize * len;
        Self {
            width,
            len,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    /// Pack `values` with the smallest width that fits their maximum.
    pub fn from_values(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let mut packed = Self::new(bit_width(max), values.len());
        for (i, &v) in values.iter().enumerate() {
            packed.set(i, v);
        }
        packed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Value at `idx`. Panics if `idx >= len()`.
    #[inline]
    pub fn get(&self, idx: usize) -> u64 {
        assert!(idx < self.len, "index {idx} out of bounds for length {}", self.len);
        if self.width == 0 {
            return 0;
        }
        let bit = idx * self.width as usize;
        let word = bit / 64;
        let offset = bit % 64;
        let mut value = self.words[word] >> offset;
        if offset + self.width as usize > 64 {
            value |= self.words[word + 1] << (64 - offset);
        }
        value & self.mask()
    }

    /// Overwrite the value at `idx`. Bits of `value` above `width` are dropped.
    pub fn set(&mut self, idx: usize, value: u64) {
        assert!(idx < self.len, "index {idx} out of bounds for length {}", self.len);
        if self.width == 0 {
            return;
        }
        let mask = self.mask();
        let value = value & mask;
        let bit = idx * self.width as usize;
        let word = bit / 64;
        let offset = bit % 64;

        self.words[word] &= !(mask << offset);
        self.words[word] |= value << offset;
        if offset + self.width as usize > 64 {
            let spill = 64 - offset;
            self.words[word + 1] &= !(mask >> spill);
            self.words[word + 1] |= value >> spill;
        }
    }

    /// Memory size in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

impl Persist for PackedInts {
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_u32(writer, self.width)?;
        write_len(writer, self.len)?;
        write_u64_slice(writer, &self.words)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let width = read_u32(reader)?;
        if width > 64 {
            return Err(PersistenceError::Format(format!("packed width {width} > 64")));
        }
        let len = read_len(reader, MAX_ARRAY_LEN)?;
        let words = read_u64_vec(reader, MAX_ARRAY_LEN)?;
        let expected = (width as usize)
            .checked_mul(len)
            .map(|bits| bits.div_ceil(64))
            .ok_or_else(|| PersistenceError::Format(format!("{len} values of width {width}")))?;
        if words.len() != expected {
            return Err(PersistenceError::mismatch("packed word count", expected, words.len()));
        }
        Ok(Self { width, len, words })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width() {
        assert_eq!(bit_width(0), 0);
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(15), 4);
        assert_eq!(bit_width(16), 5);
        assert_eq!(bit_width(u64::MAX), 64);
    }

    #[test]
    fn test_values_straddle_words() {
        // width 7 forces values across word boundaries
        let values: Vec<u64> = (0..100).map(|i| (i * 37) % 128).collect();
        let packed = PackedInts::from_values(&values);
        assert_eq!(packed.width(), 7);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(packed.get(i), v, "mismatch at {i}");
        }
    }

    #[test]
    fn test_overwrite_keeps_neighbors() {
        let mut packed = PackedInts::new(13, 20);
        for i in 0..20 {
            packed.set(i, 8191);
        }
        packed.set(9, 5);
        assert_eq!(packed.get(8), 8191);
        assert_eq!(packed.get(9), 5);
        assert_eq!(packed.get(10), 8191);
    }

    #[test]
    fn test_zero_and_full_width() {
        let zeros = PackedInts::from_values(&[0, 0, 0]);
        assert_eq!(zeros.width(), 0);
        assert_eq!(zeros.memory_bytes(), 0);
        assert_eq!(zeros.get(2), 0);

        let full = PackedInts::from_values(&[u64::MAX, 1, u64::MAX - 1]);
        assert_eq!(full.get(0), u64::MAX);
        assert_eq!(full.get(1), 1);
        assert_eq!(full.get(2), u64::MAX - 1);
    }
}
