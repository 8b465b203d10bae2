//! Candidate generation from signature posting lists.

use super::index::KnrIndex;
use crate::intersect::{intersect, Shifted, SortedList};
use crate::result::TopK;
use crate::space::MetricDataset;
use crate::succinct::SeqEncoding;

impl<D, R, S> KnrIndex<D, R, S>
where
    D: MetricDataset,
    S: SeqEncoding,
{
    /// Prefix-counting policy.
    ///
    /// Object `o` scores `m` when its first `m` signature entries equal the
    /// query's. The score is pushed as `-m` into a ties accumulator of
    /// capacity `limit`, so longer prefixes rank first. Objects with no
    /// rank-0 agreement are not candidates.
    pub fn candidates_small(&self, qseq: &[u32], limit: usize) -> TopK {
        let k = self.params.k;
        let n = self.dataset.len();
        let mut matches = vec![0u32; n];

        for (rank, &landmark) in qseq.iter().enumerate().take(k) {
            for pos in self.seq.postings(landmark).iter() {
                if pos % k != rank {
                    continue;
                }
                let doc = pos / k;
                // Only extend an unbroken prefix.
                if matches[doc] == rank as u32 {
                    matches[doc] += 1;
                }
            }
        }

        // Push best prefixes first so every kept entry appends; within a
        // score, id order matches a plain scan over `matches`.
        let mut by_prefix: Vec<Vec<u32>> = vec![Vec::new(); k + 1];
        for (doc, &m) in matches.iter().enumerate() {
            if m > 0 {
                by_prefix[m as usize].push(doc as u32);
            }
        }

        let mut out = TopK::with_ties(limit);
        for (m, docs) in by_prefix.iter().enumerate().skip(1).rev() {
            for &doc in docs {
                out.push(doc, -(m as f32));
            }
            // Shorter prefixes score strictly worse than the k-th entry.
            if out.is_full() {
                break;
            }
        }
        out
    }

    /// Shifted-intersection policy.
    ///
    /// Starting from the rank-0 posting list, intersect with rank `i`'s list
    /// shifted by `-i` while more than `limit` positions remain. A merge that
    /// would leave `limit` or fewer positions is discarded and ends the loop.
    /// Object-aligned survivors are returned unscored, in id order.
    pub fn candidates_large(&self, qseq: &[u32], limit: usize) -> TopK {
        let k = self.params.k;
        let mut out = TopK::unbounded();
        let Some(&first_landmark) = qseq.first() else {
            return out;
        };

        let first = self.seq.postings(first_landmark);
        let mut merged: Option<Vec<u64>> = None;
        let remaining = |merged: &Option<Vec<u64>>| merged.as_ref().map_or(first.len(), Vec::len);

        let ranks = qseq.len().min(k);
        let mut rank = 1;
        while rank < ranks && remaining(&merged) > limit {
            let next = Shifted::new(self.seq.postings(qseq[rank]), rank as u64);
            let tmp = match &merged {
                Some(current) => intersect(current, &next),
                None => intersect(&first, &next),
            };
            rank += 1;
            if tmp.len() <= limit {
                break;
            }
            merged = Some(tmp);
        }

        let k = k as u64;
        let mut emit = |pos: u64| {
            if pos % k == 0 {
                out.push((pos / k) as u32, 0.0);
            }
        };
        match merged {
            Some(positions) => positions.into_iter().for_each(&mut emit),
            None => first.iter().for_each(|pos| emit(pos as u64)),
        }
        out
    }
}
