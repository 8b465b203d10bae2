//! Bounded top-K result accumulator.
//!
//! [`TopK`] is the meeting point between candidate discovery and answer
//! quality: every index pushes `(id, distance)` pairs into it and reads its
//! [`covering_radius`](TopK::covering_radius) back to decide when to stop.
//!
//! # Tie policy
//!
//! Entries are kept in ascending distance order. Equal distances keep push
//! order, so results are reproducible for a fixed push sequence.
//!
//! - **Strict** ([`TopK::new`]): at most `k` entries. A push equal to the
//!   current worst entry of a full accumulator is rejected.
//! - **Ties** ([`TopK::with_ties`]): every entry equal to the `k`-th distance
//!   is retained, so the accumulator may grow past `k` by boundary ties only.
//! - **Unbounded** ([`TopK::unbounded`]): keeps everything.
//!
//! # Covering radius
//!
//! `+∞` until `k` entries are held, then the `k`-th smallest distance. It
//! never increases across pushes.

/// A result entry: object id and its distance (or ordinal score) to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: u32,
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: u32, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl From<Neighbor> for (u32, f32) {
    fn from(n: Neighbor) -> Self {
        (n.id, n.distance)
    }
}

/// Capacity sentinel for [`TopK::unbounded`].
pub const UNBOUNDED: usize = usize::MAX;

/// Ascending, bounded collection of the best entries seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct TopK {
    k: usize,
    ties: bool,
    items: Vec<Neighbor>,
}

impl TopK {
    /// Strict accumulator holding at most `k` entries.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ties: false,
            items: Vec::with_capacity(k.min(1024)),
        }
    }

    /// Accumulator that also keeps every entry tied with the `k`-th distance.
    pub fn with_ties(k: usize) -> Self {
        Self {
            ties: true,
            ..Self::new(k)
        }
    }

    /// Keep-all accumulator.
    pub fn unbounded() -> Self {
        Self::new(UNBOUNDED)
    }

    /// Nominal capacity (`UNBOUNDED` for keep-all).
    pub fn capacity(&self) -> usize {
        self.k
    }

    pub fn keeps_ties(&self) -> bool {
        self.ties
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `k` entries are held.
    pub fn is_full(&self) -> bool {
        self.k != UNBOUNDED && self.items.len() >= self.k
    }

    /// Worst distance a new entry must beat (or tie, under the ties policy).
    ///
    /// `+∞` while fewer than `k` entries are held.
    pub fn covering_radius(&self) -> f32 {
        if self.k == 0 || !self.is_full() {
            return f32::INFINITY;
        }
        self.items[self.k - 1].distance
    }

    /// Offer an entry. Returns `true` if it was kept.
    ///
    /// NaN distances are never kept. Cost is linear in the number of kept
    /// entries worse than `distance`, so pushes in ascending order append.
    pub fn push(&mut self, id: u32, distance: f32) -> bool {
        if distance.is_nan() || self.k == 0 {
            return false;
        }
        if self.is_full() {
            let worst = self.covering_radius();
            if distance > worst || (distance == worst && !self.ties) {
                return false;
            }
        }

        let pos = self.items.partition_point(|n| n.distance <= distance);
        self.items.insert(pos, Neighbor::new(id, distance));

        if self.k != UNBOUNDED && self.items.len() > self.k {
            if self.ties {
                let bound = self.items[self.k - 1].distance;
                let keep = self.k + self.items[self.k..].partition_point(|n| n.distance <= bound);
                self.items.truncate(keep);
            } else {
                self.items.truncate(self.k);
            }
        }
        true
    }

    /// Best entry.
    pub fn first(&self) -> Option<&Neighbor> {
        self.items.first()
    }

    /// Worst kept entry.
    pub fn last(&self) -> Option<&Neighbor> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Neighbor] {
        &self.items
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.iter().any(|n| n.id == id)
    }

    /// Drop everything past the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Ids in ranked order.
    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(|n| n.id).collect()
    }

    pub fn into_vec(self) -> Vec<Neighbor> {
        self.items
    }

    /// `(id, distance)` pairs in ascending order.
    pub fn into_pairs(self) -> Vec<(u32, f32)> {
        self.items.into_iter().map(Into::into).collect()
    }
}

impl IntoIterator for TopK {
    type Item = Neighbor;
    type IntoIter = std::vec::IntoIter<Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a TopK {
    type Item = &'a Neighbor;
    type IntoIter = std::slice::Iter<'a, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_best_k_in_order() {
        let mut acc = TopK::new(3);
        for (id, d) in [(0, 0.5), (1, 0.1), (2, 0.9), (3, 0.3), (4, 0.2)] {
            acc.push(id, d);
        }
        assert_eq!(acc.ids(), vec![1, 4, 3]);
        assert_eq!(acc.covering_radius(), 0.3);
    }

    #[test]
    fn test_covering_radius_infinite_until_full() {
        let mut acc = TopK::new(2);
        assert_eq!(acc.covering_radius(), f32::INFINITY);
        acc.push(0, 1.0);
        assert_eq!(acc.covering_radius(), f32::INFINITY);
        acc.push(1, 2.0);
        assert_eq!(acc.covering_radius(), 2.0);
    }

    #[test]
    fn test_strict_rejects_boundary_tie() {
        let mut acc = TopK::new(2);
        acc.push(0, 1.0);
        acc.push(1, 2.0);
        assert!(!acc.push(2, 2.0));
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.ids(), vec![0, 1]);
    }

    #[test]
    fn test_ties_grow_past_k_only_on_boundary() {
        let mut acc = TopK::with_ties(2);
        acc.push(0, 1.0);
        acc.push(1, 2.0);
        assert!(acc.push(2, 2.0));
        assert!(acc.push(3, 2.0));
        assert_eq!(acc.len(), 4);
        assert_eq!(acc.covering_radius(), 2.0);

        // A strictly better entry evicts the whole tied tail.
        assert!(acc.push(4, 0.5));
        assert_eq!(acc.ids(), vec![4, 0]);
        assert_eq!(acc.covering_radius(), 1.0);
    }

    #[test]
    fn test_equal_scores_keep_push_order() {
        let mut acc = TopK::with_ties(10);
        for id in [5, 3, 8] {
            acc.push(id, -1.0);
        }
        acc.push(1, -2.0);
        assert_eq!(acc.ids(), vec![1, 5, 3, 8]);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut acc = TopK::unbounded();
        for id in 0..5000 {
            acc.push(id, (5000 - id) as f32);
        }
        assert_eq!(acc.len(), 5000);
        assert!(!acc.is_full());
        assert_eq!(acc.covering_radius(), f32::INFINITY);
        assert_eq!(acc.first().unwrap().id, 4999);
    }

    #[test]
    fn test_zero_capacity_and_nan() {
        let mut acc = TopK::new(0);
        assert!(!acc.push(0, 1.0));
        assert!(acc.is_empty());

        let mut acc = TopK::new(3);
        assert!(!acc.push(0, f32::NAN));
        assert!(acc.is_empty());
    }
}
