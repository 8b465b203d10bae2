//! Little-endian primitive codec shared by every persisted structure.
//!
//! All widths are fixed; lengths are written as `u64` so files are portable
//! between 32- and 64-bit hosts.

use super::error::{PersistenceError, PersistenceResult};
use std::io::{Read, Write};

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> PersistenceResult<()> {
    w.write_all(&[v])?;
    Ok(())
}

pub fn write_u32<W: Write>(w: &mut W, v: u32) -> PersistenceResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn write_i32<W: Write>(w: &mut W, v: i32) -> PersistenceResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn write_u64<W: Write>(w: &mut W, v: u64) -> PersistenceResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn write_len<W: Write>(w: &mut W, len: usize) -> PersistenceResult<()> {
    write_u64(w, len as u64)
}

pub fn write_u64_slice<W: Write>(w: &mut W, values: &[u64]) -> PersistenceResult<()> {
    write_len(w, values.len())?;
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

pub fn write_f32_slice<W: Write>(w: &mut W, values: &[f32]) -> PersistenceResult<()> {
    write_len(w, values.len())?;
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

pub fn read_u8<R: Read>(r: &mut R) -> PersistenceResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32<R: Read>(r: &mut R) -> PersistenceResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_i32<R: Read>(r: &mut R) -> PersistenceResult<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn read_u64<R: Read>(r: &mut R) -> PersistenceResult<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a length prefix, rejecting values that do not fit in `usize` or
/// exceed `limit` (guards allocations against corrupt input).
pub fn read_len<R: Read>(r: &mut R, limit: usize) -> PersistenceResult<usize> {
    let raw = read_u64(r)?;
    let len = usize::try_from(raw)
        .map_err(|_| PersistenceError::Format(format!("length {raw} overflows usize")))?;
    if len > limit {
        return Err(PersistenceError::Format(format!(
            "length {len} exceeds limit {limit}"
        )));
    }
    Ok(len)
}

pub fn read_u64_vec<R: Read>(r: &mut R, limit: usize) -> PersistenceResult<Vec<u64>> {
    let len = read_len(r, limit)?;
    let mut out = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for _ in 0..len {
        out.push(read_u64(r)?);
    }
    Ok(out)
}

pub fn read_f32_vec<R: Read>(r: &mut R, limit: usize) -> PersistenceResult<Vec<f32>> {
    let len = read_len(r, limit)?;
    let mut out = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    let mut buf = [0u8; 4];
    for _ in 0..len {
        r.read_exact(&mut buf)?;
        out.push(f32::from_le_bytes(buf));
    }
    Ok(out)
}

/// Upper bound on any single persisted array (elements).
pub const MAX_ARRAY_LEN: usize = 1 << 40;

/// Most elements reserved up front from a length prefix. Longer arrays grow
/// as their bytes actually arrive.
pub const PREALLOC_LIMIT: usize = 1 << 20;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_truncated_input_is_io_error() {
        let mut cursor = Cursor::new(vec![1u8, 2]);
        let err = read_u32(&mut cursor).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }

    #[test]
    fn test_length_limit_rejected() {
        let mut buf = Vec::new();
        write_len(&mut buf, 10).unwrap();
        let err = read_len(&mut Cursor::new(buf), 5).unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));
    }

    #[test]
    fn test_huge_length_prefix_fails_without_allocating() {
        // Claims 2^40 floats but carries four bytes.
        let mut buf = Vec::new();
        write_len(&mut buf, MAX_ARRAY_LEN).unwrap();
        buf.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read_f32_vec(&mut Cursor::new(&buf), MAX_ARRAY_LEN).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));

        let mut buf = Vec::new();
        write_len(&mut buf, MAX_ARRAY_LEN).unwrap();
        let err = read_u64_vec(&mut Cursor::new(&buf), MAX_ARRAY_LEN).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }

    #[test]
    fn test_mixed_values() {
        let mut buf = Vec::new();
        write_u8(&mut buf, 7).unwrap();
        write_i32(&mut buf, -50).unwrap();
        write_f32_slice(&mut buf, &[1.5, -2.0]).unwrap();

        let mut r = Cursor::new(buf);
        assert_eq!(read_u8(&mut r).unwrap(), 7);
        assert_eq!(read_i32(&mut r).unwrap(), -50);
        assert_eq!(read_f32_vec(&mut r, 16).unwrap(), vec![1.5, -2.0]);
    }
}
