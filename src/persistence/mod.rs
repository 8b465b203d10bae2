//! Binary persistence for landmark indexes.
//!
//! Indexes are written to any `std::io::Write` and read back from any
//! `std::io::Read`. Byte order is little endian throughout. Base datasets are
//! never embedded: a loader receives the dataset the index was built over and
//! checks its size against the header.
//!
//! Truncated or malformed input is always an error; no partially decoded
//! index is returned.

pub mod codec;
pub mod error;
pub mod format;

pub use error::{PersistenceError, PersistenceResult};
pub use format::{DetachedCodec, IndexHeader, IndexType, Persist, FORMAT_VERSION, INDEX_MAGIC};
