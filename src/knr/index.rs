//! KNR index construction, search and persistence.

use super::reference::LinearScan;
use super::KnrParams;
use crate::index::MetricIndex;
use crate::persistence::codec::{read_i32, write_i32};
use crate::persistence::{
    DetachedCodec, IndexHeader, IndexType, Persist, PersistenceError,
};
use crate::result::TopK;
use crate::space::MetricDataset;
use crate::succinct::{EliasFanoSeq, SeqEncoding};
use crate::{Result, RetrieveError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Objects between build progress messages.
const PROGRESS_INTERVAL: usize = 1000;

/// KNR signature index over `D`.
///
/// - `R` ranks landmarks; its dataset is the landmark set.
/// - `S` encodes the signature sequence.
#[derive(Debug)]
pub struct KnrIndex<D, R = LinearScan<D>, S = EliasFanoSeq> {
    pub(super) dataset: D,
    pub(super) reference: R,
    pub(super) params: KnrParams,
    pub(super) seq: S,
}

impl<D, R, S> KnrIndex<D, R, S>
where
    D: MetricDataset,
    R: MetricIndex<D>,
    S: SeqEncoding,
{
    /// Compute every object's signature and encode them.
    ///
    /// Fails if `params.k` exceeds the number of landmarks or the reference
    /// index returns a short ranking.
    pub fn build(dataset: D, reference: R, params: KnrParams) -> Result<Self> {
        params.validate()?;
        let landmarks = reference.dataset().len();
        if params.k > landmarks {
            return Err(RetrieveError::InvalidParameter(format!(
                "k = {} exceeds the {landmarks} available landmarks",
                params.k
            )));
        }
        let sigma = u32::try_from(landmarks).map_err(|_| {
            RetrieveError::InvalidParameter(format!("{landmarks} landmarks exceed u32::MAX"))
        })?;

        let n = dataset.len();
        info!(
            objects = n,
            landmarks,
            k = params.k,
            max_candidates = params.max_candidates,
            encoding = S::NAME,
            "building KNR index"
        );

        let signatures = compute_signatures(&dataset, &reference, params.k);
        let mut symbols = Vec::with_capacity(n * params.k);
        for (id, signature) in signatures.into_iter().enumerate() {
            if signature.len() != params.k {
                return Err(RetrieveError::InvalidParameter(format!(
                    "reference index ranked {} landmarks for object {id}, expected {}",
                    signature.len(),
                    params.k
                )));
            }
            symbols.extend(signature);
        }

        let seq = S::encode(&symbols, sigma)?;
        info!(
            objects = n,
            sequence_len = seq.len(),
            sequence_bytes = seq.memory_bytes(),
            "KNR index built"
        );

        Ok(Self {
            dataset,
            reference,
            params,
            seq,
        })
    }

    pub fn params(&self) -> &KnrParams {
        &self.params
    }

    /// The landmark ranking index.
    pub fn reference(&self) -> &R {
        &self.reference
    }

    /// The encoded signature sequence.
    pub fn sequence(&self) -> &S {
        &self.seq
    }

    /// Landmark ids nearest to `query`, nearest first.
    pub fn signature(&self, query: &D::Object) -> Vec<u32> {
        self.reference.search_knn(query, self.params.k).ids()
    }

    /// Signature of stored object `id`, decoded from the sequence.
    ///
    /// Panics if `id >= dataset().len()`.
    pub fn stored_signature(&self, id: u32) -> Vec<u32> {
        let start = id as usize * self.params.k;
        (start..start + self.params.k)
            .map(|pos| self.seq.access(pos))
            .collect()
    }

    /// Candidates for `qseq` under the policy matching the dataset size.
    ///
    /// At most `limit` entries, except for ties at the boundary of the
    /// prefix-counting policy.
    pub fn candidates(&self, qseq: &[u32], limit: usize) -> TopK {
        let n = self.dataset.len();
        if n < self.params.small_dataset_threshold {
            debug!(objects = n, limit, "prefix-counting candidate policy");
            self.candidates_small(qseq, limit)
        } else {
            debug!(objects = n, limit, "intersection candidate policy");
            let mut out = self.candidates_large(qseq, limit);
            out.truncate(limit);
            out
        }
    }
}

/// Signatures of all objects, in id order.
#[cfg(feature = "parallel")]
fn compute_signatures<D, R>(dataset: &D, reference: &R, k: usize) -> Vec<Vec<u32>>
where
    D: MetricDataset,
    R: MetricIndex<D>,
{
    use std::sync::atomic::{AtomicUsize, Ordering};

    let n = dataset.len();
    let done = AtomicUsize::new(0);
    (0..n as u32)
        .into_par_iter()
        .map(|id| {
            let signature = reference.search_knn(dataset.get(id), k).ids();
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % PROGRESS_INTERVAL == 0 {
                debug!(done = finished, total = n, "computing signatures");
            }
            signature
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_signatures<D, R>(dataset: &D, reference: &R, k: usize) -> Vec<Vec<u32>>
where
    D: MetricDataset,
    R: MetricIndex<D>,
{
    let n = dataset.len();
    (0..n as u32)
        .map(|id| {
            if id as usize % PROGRESS_INTERVAL == 0 {
                debug!(done = id, total = n, "computing signatures");
            }
            reference.search_knn(dataset.get(id), k).ids()
        })
        .collect()
}

impl<D, R, S> MetricIndex<D> for KnrIndex<D, R, S>
where
    D: MetricDataset,
    R: MetricIndex<D>,
    S: SeqEncoding,
{
    fn dataset(&self) -> &D {
        &self.dataset
    }

    /// Re-rank candidates by true distance into `acc`.
    ///
    /// With a negative `max_candidates` the candidate ranking is returned
    /// instead and `acc` is discarded.
    fn search_knn_into(&self, query: &D::Object, mut acc: TopK) -> TopK {
        let qseq = self.signature(query);
        let limit = self.params.candidate_limit();
        let mut candidates = self.candidates(&qseq, limit);
        if self.params.raw_candidates() {
            candidates.truncate(limit);
            return candidates;
        }
        for candidate in candidates.iter().take(limit) {
            acc.push(candidate.id, self.dataset.distance_to(query, candidate.id));
        }
        acc
    }

    /// Candidates within `radius`. Approximate: objects outside the
    /// candidate set are never examined.
    fn search_range(&self, query: &D::Object, radius: f32) -> TopK {
        let qseq = self.signature(query);
        let limit = self.params.candidate_limit();
        let candidates = self.candidates(&qseq, limit);
        let mut out = TopK::unbounded();
        for candidate in candidates.iter().take(limit) {
            let d = self.dataset.distance_to(query, candidate.id);
            if d <= radius {
                out.push(candidate.id, d);
            }
        }
        out
    }

    fn size_bytes(&self) -> usize {
        self.seq.memory_bytes() + self.reference.size_bytes()
    }

    fn algorithm(&self) -> &'static str {
        "KNR"
    }
}

impl<D, R, S> KnrIndex<D, R, S>
where
    D: MetricDataset + Persist,
    R: MetricIndex<D> + DetachedCodec<D>,
    S: SeqEncoding,
{
    /// Serialize the index. The base dataset is not written.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        IndexHeader::new(IndexType::Knr, self.dataset.len()).write(writer)?;
        write_i32(writer, self.params.k as i32)?;
        write_i32(writer, self.params.max_candidates)?;
        self.reference.dataset().write_to(writer)?;
        self.reference.write_detached(writer)?;
        self.seq.write_to(writer)?;
        info!(
            objects = self.dataset.len(),
            landmarks = self.reference.dataset().len(),
            "saved KNR index"
        );
        Ok(())
    }

    /// Load an index saved by [`save`](Self::save) over `dataset`.
    ///
    /// `small_dataset_threshold` is not persisted and takes its default.
    pub fn load<Rd: Read>(reader: &mut Rd, dataset: D) -> Result<Self> {
        let header = IndexHeader::read_expecting(reader, IndexType::Knr, dataset.len())?;
        let k = read_i32(reader)?;
        if k < 1 {
            return Err(PersistenceError::Format(format!("invalid signature length {k}")).into());
        }
        let k = k as usize;
        let max_candidates = read_i32(reader)?;
        if max_candidates == 0 {
            return Err(PersistenceError::Format("max_candidates is zero".to_string()).into());
        }

        let landmarks = D::read_from(reader)?;
        let landmark_count = landmarks.len();
        let reference = R::read_attached(reader, landmarks)?;
        let seq = S::read_from(reader)?;

        let expected_len = header.object_count as usize * k;
        if seq.len() != expected_len {
            return Err(PersistenceError::InvalidState(format!(
                "sequence length {} != {} objects * k {k}",
                seq.len(),
                header.object_count
            ))
            .into());
        }
        if seq.sigma() as usize != landmark_count {
            return Err(PersistenceError::InvalidState(format!(
                "sequence alphabet {} != {landmark_count} landmarks",
                seq.sigma()
            ))
            .into());
        }

        info!(
            objects = dataset.len(),
            landmarks = landmark_count,
            k,
            max_candidates,
            "loaded KNR index"
        );
        Ok(Self {
            dataset,
            reference,
            params: KnrParams {
                k,
                max_candidates,
                ..KnrParams::default()
            },
            seq,
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
