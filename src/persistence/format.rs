//! Binary layout shared by persisted indexes.
//!
//! # Index Header
//!
//! Every persisted index starts with the same fixed-size header:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Magic bytes (4B): "LMKI"                │
//! │ Format version (4B, u32 LE)             │
//! │ Index type (1B)                         │
//! │ Object count (8B, u64 LE)               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The object count records the size of the base dataset the index was
//! built over. The dataset itself is not part of the file; loaders take it
//! as an argument and reject a dataset of a different size.
//!
//! # KNR Layout
//!
//! ```text
//! [header][K: i32][max_candidates: i32][landmark dataset]
//! [reference index, without its dataset][encoded signature sequence]
//! ```
//!
//! # Beam Search Layout
//!
//! ```text
//! [header][beam_size: u32][repeat_search: u32][sample_size: u32]
//! [seed: u64][parallel_expansion: u8][graph]
//! ```

use super::codec::{read_u32, read_u64, read_u8, write_u32, write_u64, write_u8};
use super::error::{PersistenceError, PersistenceResult};
use std::io::{Read, Write};

/// Magic bytes for index files.
pub const INDEX_MAGIC: [u8; 4] = *b"LMKI";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Index types supported by persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IndexType {
    /// K-nearest-reference signature index
    Knr = 1,
    /// Approximate proximity graph with beam search
    BeamGraph = 2,
    /// Exhaustive scan (reference indexes)
    LinearScan = 3,
}

impl TryFrom<u8> for IndexType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(IndexType::Knr),
            2 => Ok(IndexType::BeamGraph),
            3 => Ok(IndexType::LinearScan),
            _ => Err(()),
        }
    }
}

/// Fixed header preceding every persisted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    /// Index type
    pub index_type: IndexType,
    /// Number of objects in the base dataset
    pub object_count: u64,
}

impl IndexHeader {
    /// Serialized size in bytes: 4 (magic) + 4 (version) + 1 (type) + 8 (count).
    pub const SERIALIZED_SIZE: usize = 17;

    pub fn new(index_type: IndexType, object_count: usize) -> Self {
        Self {
            index_type,
            object_count: object_count as u64,
        }
    }

    /// Write the header.
    pub fn write<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        writer.write_all(&INDEX_MAGIC)?;
        write_u32(writer, FORMAT_VERSION)?;
        write_u8(writer, self.index_type as u8)?;
        write_u64(writer, self.object_count)?;
        Ok(())
    }

    /// Read a header, validating magic bytes and format version.
    pub fn read<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != INDEX_MAGIC {
            return Err(PersistenceError::Format(format!(
                "invalid magic bytes {magic:?}"
            )));
        }

        let version = read_u32(reader)?;
        if version != FORMAT_VERSION {
            return Err(PersistenceError::mismatch(
                "unsupported format version",
                FORMAT_VERSION,
                version,
            ));
        }

        let tag = read_u8(reader)?;
        let index_type = IndexType::try_from(tag)
            .map_err(|_| PersistenceError::Format(format!("unknown index type {tag}")))?;
        let object_count = read_u64(reader)?;

        Ok(Self {
            index_type,
            object_count,
        })
    }

    /// Read a header and check it describes `expected` over `object_count` objects.
    pub fn read_expecting<R: Read>(
        reader: &mut R,
        expected: IndexType,
        object_count: usize,
    ) -> PersistenceResult<Self> {
        let header = Self::read(reader)?;
        if header.index_type != expected {
            return Err(PersistenceError::mismatch(
                "index type",
                format!("{expected:?}"),
                format!("{:?}", header.index_type),
            ));
        }
        if header.object_count != object_count as u64 {
            return Err(PersistenceError::mismatch(
                "base dataset size",
                header.object_count,
                object_count,
            ));
        }
        Ok(header)
    }
}

/// Types that serialize themselves completely.
pub trait Persist: Sized {
    /// Serialize to a writer.
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()>;

    /// Deserialize from a reader.
    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self>;
}

impl<T: Persist> Persist for std::sync::Arc<T> {
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        (**self).write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        T::read_from(reader).map(std::sync::Arc::new)
    }
}

/// Indexes that own a dataset but serialize without it.
///
/// The dataset is written once by the owner of the index and handed back on
/// load, so the encoded index never duplicates it.
pub trait DetachedCodec<D>: Sized {
    /// Serialize everything except the dataset.
    fn write_detached<W: Write>(&self, writer: &mut W) -> PersistenceResult<()>;

    /// Rebuild the index around `dataset`.
    fn read_attached<R: Read>(reader: &mut R, dataset: D) -> PersistenceResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_index_type_roundtrip() {
        assert_eq!(IndexType::try_from(1), Ok(IndexType::Knr));
        assert_eq!(IndexType::try_from(2), Ok(IndexType::BeamGraph));
        assert_eq!(IndexType::try_from(3), Ok(IndexType::LinearScan));
        assert_eq!(IndexType::try_from(99), Err(()));
    }

    #[test]
    fn test_header_size() {
        let mut buf = Vec::new();
        IndexHeader::new(IndexType::Knr, 10).write(&mut buf).unwrap();
        assert_eq!(buf.len(), IndexHeader::SERIALIZED_SIZE);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut buf = Vec::new();
        IndexHeader::new(IndexType::Knr, 10).write(&mut buf).unwrap();
        buf[0] = b'X';
        let err = IndexHeader::read(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));
    }

    #[test]
    fn test_header_rejects_wrong_type_and_count() {
        let mut buf = Vec::new();
        IndexHeader::new(IndexType::Knr, 10).write(&mut buf).unwrap();

        let err = IndexHeader::read_expecting(&mut Cursor::new(&buf), IndexType::BeamGraph, 10)
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));

        let err =
            IndexHeader::read_expecting(&mut Cursor::new(&buf), IndexType::Knr, 11).unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));

        let ok = IndexHeader::read_expecting(&mut Cursor::new(&buf), IndexType::Knr, 10).unwrap();
        assert_eq!(ok.object_count, 10);
    }
}
