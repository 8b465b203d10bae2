//! Concrete [`RankSelectSeq`] encodings.

use super::elias_fano::EliasFano;
use super::packed::{bit_width, PackedInts};
use super::{check_symbols, RankSelectSeq, SeqEncoding};
use crate::persistence::codec::{
    read_len, read_u32, read_u64_vec, read_u8, write_len, write_u32, write_u64_slice, write_u8,
    MAX_ARRAY_LEN,
};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use crate::Result;
use std::io::{Read, Write};

/// Occurrence interval between samples in [`PackedSeq`].
pub const SAMPLE_RATE: usize = 64;

/// Write the common `[tag][len][sigma]` prefix.
fn write_prefix<W: Write>(
    writer: &mut W,
    tag: u8,
    len: usize,
    sigma: u32,
) -> PersistenceResult<()> {
    write_u8(writer, tag)?;
    write_len(writer, len)?;
    write_u32(writer, sigma)
}

/// Read and check the common prefix, returning `(len, sigma)`.
fn read_prefix<R: Read>(reader: &mut R, tag: u8, name: &str) -> PersistenceResult<(usize, u32)> {
    let found = read_u8(reader)?;
    if found != tag {
        return Err(PersistenceError::mismatch(
            &format!("sequence encoding tag for {name}"),
            tag,
            found,
        ));
    }
    let len = read_len(reader, MAX_ARRAY_LEN)?;
    let sigma = read_u32(reader)?;
    Ok((len, sigma))
}

/// Bits per stored symbol. At least one, so a persisted length is always
/// backed by payload bytes.
fn symbol_width(sigma: u32) -> u32 {
    bit_width(u64::from(sigma.saturating_sub(1))).max(1)
}

/// Pack symbols with the width of the alphabet.
fn pack_symbols(symbols: &[u32], sigma: u32) -> PackedInts {
    let width = symbol_width(sigma);
    let mut packed = PackedInts::new(width, symbols.len());
    for (i, &s) in symbols.iter().enumerate() {
        packed.set(i, u64::from(s));
    }
    packed
}

/// Bucket positions by symbol.
fn positions_by_symbol(symbols: &[u32], sigma: u32) -> Vec<Vec<u64>> {
    let mut counts = vec![0usize; sigma as usize];
    for &s in symbols {
        counts[s as usize] += 1;
    }
    let mut buckets: Vec<Vec<u64>> = counts.into_iter().map(Vec::with_capacity).collect();
    for (pos, &s) in symbols.iter().enumerate() {
        buckets[s as usize].push(pos as u64);
    }
    buckets
}

fn check_packed(symbols: &PackedInts, len: usize, sigma: u32) -> PersistenceResult<()> {
    if symbols.len() != len {
        return Err(PersistenceError::mismatch("symbol count", len, symbols.len()));
    }
    if symbols.width() != symbol_width(sigma) {
        return Err(PersistenceError::InvalidState(format!(
            "symbol width {} does not match alphabet size {sigma}",
            symbols.width()
        )));
    }
    Ok(())
}

/// Check that `list` holds strictly increasing positions of `symbol`.
fn check_postings(symbols: &PackedInts, symbol: u32, list: &EliasFano) -> PersistenceResult<()> {
    let mut prev: Option<u64> = None;
    for pos in list.iter() {
        let in_order = prev.map_or(true, |p| p < pos);
        let matches = pos < symbols.len() as u64 && symbols.get(pos as usize) == u64::from(symbol);
        if !in_order || !matches {
            return Err(PersistenceError::InvalidState(format!(
                "posting list of symbol {symbol} disagrees with the symbol array at {pos}"
            )));
        }
        prev = Some(pos);
    }
    Ok(())
}

// =============================================================================
// EliasFanoSeq
// =============================================================================

/// Bit-packed symbols for `access`, one [`EliasFano`] posting list per symbol
/// for `count` and `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliasFanoSeq {
    sigma: u32,
    symbols: PackedInts,
    lists: Vec<EliasFano>,
}

impl RankSelectSeq for EliasFanoSeq {
    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn sigma(&self) -> u32 {
        self.sigma
    }

    #[inline]
    fn access(&self, pos: usize) -> u32 {
        self.symbols.get(pos) as u32
    }

    fn count(&self, symbol: u32) -> usize {
        self.lists.get(symbol as usize).map_or(0, EliasFano::len)
    }

    #[inline]
    fn select(&self, symbol: u32, j: usize) -> usize {
        assert!(j >= 1, "select is 1-indexed");
        self.lists[symbol as usize].get(j - 1) as usize
    }

    fn memory_bytes(&self) -> usize {
        self.symbols.memory_bytes() + self.lists.iter().map(EliasFano::memory_bytes).sum::<usize>()
    }
}

impl SeqEncoding for EliasFanoSeq {
    const TAG: u8 = 1;
    const NAME: &'static str = "elias-fano";

    fn encode(symbols: &[u32], sigma: u32) -> Result<Self> {
        check_symbols(symbols, sigma)?;
        let universe = symbols.len() as u64;
        let lists = positions_by_symbol(symbols, sigma)
            .iter()
            .map(|positions| EliasFano::new(positions, universe))
            .collect();
        Ok(Self {
            sigma,
            symbols: pack_symbols(symbols, sigma),
            lists,
        })
    }
}

impl Persist for EliasFanoSeq {
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_prefix(writer, Self::TAG, self.len(), self.sigma)?;
        self.symbols.write_to(writer)?;
        for list in &self.lists {
            list.write_to(writer)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let (len, sigma) = read_prefix(reader, Self::TAG, Self::NAME)?;
        let symbols = PackedInts::read_from(reader)?;
        check_packed(&symbols, len, sigma)?;

        // `sigma` is untrusted: grow as list bodies arrive.
        let mut lists = Vec::new();
        let mut total = 0usize;
        for symbol in 0..sigma {
            let list = EliasFano::read_from(reader)?;
            if list.len() > 0 && list.universe() != len as u64 {
                return Err(PersistenceError::mismatch(
                    "posting list universe",
                    len,
                    list.universe(),
                ));
            }
            check_postings(&symbols, symbol, &list)?;
            total += list.len();
            lists.push(list);
        }
        if total != len {
            return Err(PersistenceError::mismatch("total postings", len, total));
        }
        Ok(Self {
            sigma,
            symbols,
            lists,
        })
    }
}

// =============================================================================
// PackedSeq
// =============================================================================

/// Bit-packed symbols plus, per symbol, the position of every
/// [`SAMPLE_RATE`]-th occurrence. `select` jumps to the preceding sample and
/// scans forward.
///
/// Smaller than [`EliasFanoSeq`]; `select` costs a scan whose expected
/// length is `SAMPLE_RATE * sigma / 2` positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSeq {
    sigma: u32,
    symbols: PackedInts,
    counts: Vec<u64>,
    samples: Vec<Vec<u64>>,
}

impl RankSelectSeq for PackedSeq {
    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn sigma(&self) -> u32 {
        self.sigma
    }

    #[inline]
    fn access(&self, pos: usize) -> u32 {
        self.symbols.get(pos) as u32
    }

    fn count(&self, symbol: u32) -> usize {
        self.counts.get(symbol as usize).map_or(0, |&c| c as usize)
    }

    fn select(&self, symbol: u32, j: usize) -> usize {
        assert!(
            j >= 1 && j <= self.count(symbol),
            "select({symbol}, {j}) out of range"
        );
        let rank = j - 1;
        let mut pos = self.samples[symbol as usize][rank / SAMPLE_RATE] as usize;
        let mut remaining = rank % SAMPLE_RATE;
        while remaining > 0 {
            pos += 1;
            if self.access(pos) == symbol {
                remaining -= 1;
            }
        }
        pos
    }

    fn memory_bytes(&self) -> usize {
        let samples: usize = self.samples.iter().map(Vec::len).sum();
        self.symbols.memory_bytes() + (self.counts.len() + samples) * std::mem::size_of::<u64>()
    }
}

impl SeqEncoding for PackedSeq {
    const TAG: u8 = 2;
    const NAME: &'static str = "packed-sampled";

    fn encode(symbols: &[u32], sigma: u32) -> Result<Self> {
        check_symbols(symbols, sigma)?;
        let buckets = positions_by_symbol(symbols, sigma);
        let counts = buckets.iter().map(|b| b.len() as u64).collect();
        let samples = buckets
            .iter()
            .map(|b| b.iter().step_by(SAMPLE_RATE).copied().collect())
            .collect();
        Ok(Self {
            sigma,
            symbols: pack_symbols(symbols, sigma),
            counts,
            samples,
        })
    }
}

impl Persist for PackedSeq {
    /// Samples are not stored; they are rebuilt from the symbols on load.
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_prefix(writer, Self::TAG, self.len(), self.sigma)?;
        self.symbols.write_to(writer)?;
        write_u64_slice(writer, &self.counts)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let (len, sigma) = read_prefix(reader, Self::TAG, Self::NAME)?;
        let packed = PackedInts::read_from(reader)?;
        check_packed(&packed, len, sigma)?;
        let counts = read_u64_vec(reader, MAX_ARRAY_LEN)?;
        if counts.len() != sigma as usize {
            return Err(PersistenceError::mismatch("symbol count table", sigma, counts.len()));
        }

        let symbols: Vec<u32> = (0..len).map(|i| packed.get(i) as u32).collect();
        let rebuilt = Self::encode(&symbols, sigma)
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        if rebuilt.counts != counts {
            return Err(PersistenceError::InvalidState(
                "stored symbol counts do not match symbols".to_string(),
            ));
        }
        Ok(rebuilt)
    }
}
