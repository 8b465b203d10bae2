//! Local beam search over an [`ApproxGraph`].

use super::{ApproxGraph, BeamParams};
use crate::index::MetricIndex;
use crate::persistence::codec::{read_u32, read_u64, read_u8, write_u32, write_u64, write_u8};
use crate::persistence::{IndexHeader, IndexType, Persist, PersistenceError};
use crate::result::TopK;
use crate::space::MetricDataset;
use crate::state::SearchState;
use crate::{Result, RetrieveError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Beam search index: a dataset plus a proximity graph over it.
#[derive(Debug)]
pub struct BeamSearchIndex<D> {
    dataset: D,
    graph: ApproxGraph,
    params: BeamParams,
}

impl<D: MetricDataset> BeamSearchIndex<D> {
    /// Pair `dataset` with `graph`, which must have one vertex per object.
    pub fn new(dataset: D, graph: ApproxGraph, params: BeamParams) -> Result<Self> {
        params.validate()?;
        if graph.len() != dataset.len() {
            return Err(RetrieveError::InvalidParameter(format!(
                "graph has {} vertices but the dataset has {} objects",
                graph.len(),
                dataset.len()
            )));
        }
        info!(
            objects = dataset.len(),
            edges = graph.num_edges(),
            beam_size = params.beam_size,
            repeat_search = params.repeat_search,
            "created beam search index"
        );
        Ok(Self {
            dataset,
            graph,
            params,
        })
    }

    pub fn params(&self) -> &BeamParams {
        &self.params
    }

    pub fn graph(&self) -> &ApproxGraph {
        &self.graph
    }

    /// k-NN search drawing seeds from `rng`.
    pub fn search_knn_with_rng<G: Rng + ?Sized>(
        &self,
        query: &D::Object,
        mut acc: TopK,
        rng: &mut G,
    ) -> TopK {
        self.run(query, &mut acc, rng, |_, _| {});
        acc
    }

    /// Seed, expand until converged, and report every evaluation to `visit`.
    fn run<G, F>(&self, query: &D::Object, acc: &mut TopK, rng: &mut G, mut visit: F)
    where
        G: Rng + ?Sized,
        F: FnMut(u32, f32),
    {
        let n = self.dataset.len();
        if n == 0 {
            return;
        }
        let mut state = SearchState::with_capacity(self.params.sample_size.min(n) * 2);

        // Seeding
        let mut beam = TopK::new(self.params.beam_size.min(n));
        for _ in 0..self.params.sample_size.min(n) {
            let id = rng.gen_range(0..n) as u32;
            if state.evaluate(id) {
                let d = self.dataset.distance_to(query, id);
                beam.push(id, d);
                acc.push(id, d);
                visit(id, d);
            }
        }
        let beam_size = beam.len().max(1);

        // Expanding
        let mut ties = 0;
        for iteration in 0..self.params.repeat_search {
            let prev_coverage = acc.covering_radius();
            let mut next = TopK::new(beam_size);

            let fresh: Vec<u32> = beam
                .iter()
                .flat_map(|b| self.graph.neighbors(b.id).iter().copied())
                .filter(|&u| state.evaluate(u))
                .collect();
            for (u, d) in fresh.iter().copied().zip(self.distances(query, &fresh)) {
                acc.push(u, d);
                next.push(u, d);
                visit(u, d);
            }

            let coverage = acc.covering_radius();
            trace!(
                iteration,
                evaluated = fresh.len(),
                beam = next.len(),
                coverage,
                ties,
                "beam expansion"
            );
            if coverage == prev_coverage {
                if ties == 1 {
                    break;
                }
                ties += 1;
            } else {
                ties = 0;
            }
            beam = next;
        }
    }

    /// True distances from `query` to `ids`, in order.
    fn distances(&self, query: &D::Object, ids: &[u32]) -> Vec<f32> {
        #[cfg(feature = "parallel")]
        {
            if self.params.parallel_expansion {
                return ids
                    .par_iter()
                    .map(|&u| self.dataset.distance_to(query, u))
                    .collect();
            }
        }
        ids.iter()
            .map(|&u| self.dataset.distance_to(query, u))
            .collect()
    }
}

impl<D: MetricDataset> MetricIndex<D> for BeamSearchIndex<D> {
    fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Seeds come from `StdRng::seed_from_u64(params.seed)`, so repeated
    /// calls return identical results.
    fn search_knn_into(&self, query: &D::Object, acc: TopK) -> TopK {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.search_knn_with_rng(query, acc, &mut rng)
    }

    /// Every object evaluated by a `beam_size`-NN search that lies within
    /// `radius`. Approximate: unvisited objects are never reported.
    fn search_range(&self, query: &D::Object, radius: f32) -> TopK {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut acc = TopK::new(self.params.beam_size);
        let mut out = TopK::unbounded();
        self.run(query, &mut acc, &mut rng, |id, d| {
            if d <= radius {
                out.push(id, d);
            }
        });
        out
    }

    fn size_bytes(&self) -> usize {
        self.graph.memory_bytes()
    }

    fn algorithm(&self) -> &'static str {
        "BeamSearch"
    }
}

impl<D: MetricDataset> BeamSearchIndex<D> {
    /// Serialize parameters and graph. The dataset is not written.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        IndexHeader::new(IndexType::BeamGraph, self.dataset.len()).write(writer)?;
        write_u32(writer, self.params.beam_size as u32)?;
        write_u32(writer, self.params.repeat_search as u32)?;
        write_u32(writer, self.params.sample_size as u32)?;
        write_u64(writer, self.params.seed)?;
        write_u8(writer, u8::from(self.params.parallel_expansion))?;
        self.graph.write_to(writer)?;
        info!(
            objects = self.dataset.len(),
            edges = self.graph.num_edges(),
            "saved beam search index"
        );
        Ok(())
    }

    /// Load an index saved by [`save`](Self::save) over `dataset`.
    pub fn load<R: Read>(reader: &mut R, dataset: D) -> Result<Self> {
        IndexHeader::read_expecting(reader, IndexType::BeamGraph, dataset.len())?;
        let beam_size = read_u32(reader)? as usize;
        let repeat_search = read_u32(reader)? as usize;
        let sample_size = read_u32(reader)? as usize;
        let seed = read_u64(reader)?;
        let parallel_expansion = match read_u8(reader)? {
            0 => false,
            1 => true,
            other => {
                return Err(
                    PersistenceError::Format(format!("invalid parallel flag {other}")).into(),
                )
            }
        };
        let graph = ApproxGraph::read_from(reader)?;
        let params = BeamParams {
            beam_size,
            repeat_search,
            sample_size,
            seed,
            parallel_expansion,
        };
        params
            .validate()
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        if graph.len() != dataset.len() {
            return Err(PersistenceError::mismatch(
                "graph vertex count",
                dataset.len(),
                graph.len(),
            )
            .into());
        }
        info!(
            objects = dataset.len(),
            edges = graph.num_edges(),
            "loaded beam search index"
        );
        Ok(Self {
            dataset,
            graph,
            params,
        })
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P, dataset: D) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::load(&mut reader, dataset)
    }
}
