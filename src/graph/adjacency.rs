//! Fixed proximity-graph adjacency.

use crate::persistence::codec::{read_u32, write_u32, PREALLOC_LIMIT};
use crate::persistence::{Persist, PersistenceError, PersistenceResult};
use crate::{Result, RetrieveError};
use smallvec::SmallVec;
use std::io::{Read, Write};

/// Inline neighbor storage; larger lists spill to the heap.
pub type NeighborList = SmallVec<[u32; 16]>;

/// Directed adjacency lists: vertex id → ordered neighbor ids.
///
/// Edges need not be symmetric. The graph is finished before use; this crate
/// never builds or edits one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApproxGraph {
    neighbors: Vec<NeighborList>,
}

impl ApproxGraph {
    /// Wrap adjacency lists, rejecting edges to missing vertices.
    pub fn new<L: AsRef<[u32]>>(adjacency: &[L]) -> Result<Self> {
        let n = adjacency.len();
        if n > u32::MAX as usize {
            return Err(RetrieveError::InvalidParameter(
                "more than u32::MAX vertices".to_string(),
            ));
        }
        let mut neighbors = Vec::with_capacity(n);
        for (v, list) in adjacency.iter().enumerate() {
            let list = list.as_ref();
            if let Some(&bad) = list.iter().find(|&&u| u as usize >= n) {
                return Err(RetrieveError::InvalidParameter(format!(
                    "vertex {v} links to {bad}, but the graph has {n} vertices"
                )));
            }
            neighbors.push(SmallVec::from_slice(list));
        }
        Ok(Self { neighbors })
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Out-neighbors of `v`, in stored order. Empty for unknown vertices.
    #[inline]
    pub fn neighbors(&self, v: u32) -> &[u32] {
        self.neighbors
            .get(v as usize)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Total directed edges.
    pub fn num_edges(&self) -> usize {
        self.neighbors.iter().map(|l| l.len()).sum()
    }

    /// Approximate heap size in bytes.
    pub fn memory_bytes(&self) -> usize {
        let spilled: usize = self
            .neighbors
            .iter()
            .filter(|l| l.spilled())
            .map(|l| l.capacity() * std::mem::size_of::<u32>())
            .sum();
        self.neighbors.len() * std::mem::size_of::<NeighborList>() + spilled
    }
}

impl Persist for ApproxGraph {
    /// Layout: `[vertices: u32]` then per vertex `[degree: u32][ids: u32...]`.
    fn write_to<W: Write>(&self, writer: &mut W) -> PersistenceResult<()> {
        write_u32(writer, self.neighbors.len() as u32)?;
        for list in &self.neighbors {
            write_u32(writer, list.len() as u32)?;
            for &u in list.iter() {
                write_u32(writer, u)?;
            }
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> PersistenceResult<Self> {
        let n = read_u32(reader)? as usize;
        let mut neighbors = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        for v in 0..n {
            let degree = read_u32(reader)? as usize;
            if degree > n {
                return Err(PersistenceError::Format(format!(
                    "vertex {v} has degree {degree} in a graph of {n} vertices"
                )));
            }
            let mut list: NeighborList = SmallVec::with_capacity(degree.min(1024));
            for _ in 0..degree {
                let u = read_u32(reader)?;
                if u as usize >= n {
                    return Err(PersistenceError::InvalidState(format!(
                        "vertex {v} links to missing vertex {u}"
                    )));
                }
                list.push(u);
            }
            neighbors.push(list);
        }
        Ok(Self { neighbors })
    }
}
