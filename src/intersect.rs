//! Intersection of strictly increasing integer lists.
//!
//! Lists are accessed through [`SortedList`], a random-access view, so the
//! posting lists of a [`RankSelectSeq`](crate::succinct::RankSelectSeq) are
//! searched in place without being decoded in full.
//!
//! [`intersect`] is the Baeza-Yates divide-and-conquer algorithm: take the
//! median of the shorter list, locate it in the longer list with a doubling
//! search, and recurse on both sides. Its cost adapts to how interleaved the
//! two lists are, falling to `O(m log(n/m))` for lists of very different
//! lengths.

/// Random-access, strictly increasing sequence of `u64`.
pub trait SortedList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `i`. Panics if `i >= len()`.
    fn get(&self, i: usize) -> u64;

    /// First index in `lo..hi` whose element is `>= value` (`hi` if none).
    fn lower_bound(&self, value: u64, lo: usize, hi: usize) -> usize {
        let (mut lo, mut hi) = (lo, hi);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.get(mid) < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl SortedList for [u64] {
    fn len(&self) -> usize {
        <[u64]>::len(self)
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        self[i]
    }
}

impl SortedList for Vec<u64> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        self[i]
    }
}

impl<L: SortedList + ?Sized> SortedList for &L {
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        (**self).get(i)
    }
}

/// View of `inner` with `shift` subtracted from every element.
///
/// Elements smaller than `shift` are hidden, so the view stays a valid
/// unsigned sorted list.
#[derive(Debug, Clone, Copy)]
pub struct Shifted<L> {
    inner: L,
    shift: u64,
    start: usize,
}

impl<L: SortedList> Shifted<L> {
    pub fn new(inner: L, shift: u64) -> Self {
        let start = inner.lower_bound(shift, 0, inner.len());
        Self {
            inner,
            shift,
            start,
        }
    }
}

impl<L: SortedList> SortedList for Shifted<L> {
    fn len(&self) -> usize {
        self.inner.len() - self.start
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        self.inner.get(self.start + i) - self.shift
    }
}

/// First index in `lo..hi` whose element is `>= value`, probing
/// `lo, lo+1, lo+3, lo+7, ...` before a binary search inside the last gap.
pub fn doubling_search<L: SortedList + ?Sized>(list: &L, value: u64, lo: usize, hi: usize) -> usize {
    if lo >= hi || list.get(lo) >= value {
        return lo;
    }
    // Invariant: list[prev] < value.
    let mut prev = lo;
    let mut step = 1usize;
    loop {
        let probe = prev.saturating_add(step);
        if probe >= hi {
            return list.lower_bound(value, prev + 1, hi);
        }
        if list.get(probe) >= value {
            return list.lower_bound(value, prev + 1, probe);
        }
        prev = probe;
        step = step.saturating_mul(2);
    }
}

/// Elements present in both `a` and `b`, in increasing order.
pub fn intersect<A, B>(a: &A, b: &B) -> Vec<u64>
where
    A: SortedList + ?Sized,
    B: SortedList + ?Sized,
{
    let mut out = Vec::new();
    if a.len() <= b.len() {
        baeza_yates(a, 0, a.len(), b, 0, b.len(), &mut out);
    } else {
        baeza_yates(b, 0, b.len(), a, 0, a.len(), &mut out);
    }
    out
}

/// Intersect `small[s_lo..s_hi]` with `large[l_lo..l_hi]`, appending in order.
fn baeza_yates<S, L>(
    small: &S,
    s_lo: usize,
    s_hi: usize,
    large: &L,
    l_lo: usize,
    l_hi: usize,
    out: &mut Vec<u64>,
) where
    S: SortedList + ?Sized,
    L: SortedList + ?Sized,
{
    if s_lo >= s_hi || l_lo >= l_hi {
        return;
    }
    // Disjoint ranges end the recursion early.
    if small.get(s_hi - 1) < large.get(l_lo) || large.get(l_hi - 1) < small.get(s_lo) {
        return;
    }

    let mid = s_lo + (s_hi - s_lo) / 2;
    let median = small.get(mid);
    let pos = doubling_search(large, median, l_lo, l_hi);
    let found = pos < l_hi && large.get(pos) == median;

    // Recurse with whichever side is now shorter as the pivot source.
    recurse(small, s_lo, mid, large, l_lo, pos, out);
    if found {
        out.push(median);
    }
    let next = if found { pos + 1 } else { pos };
    recurse(small, mid + 1, s_hi, large, next, l_hi, out);
}

fn recurse<S, L>(
    small: &S,
    s_lo: usize,
    s_hi: usize,
    large: &L,
    l_lo: usize,
    l_hi: usize,
    out: &mut Vec<u64>,
) where
    S: SortedList + ?Sized,
    L: SortedList + ?Sized,
{
    if s_hi.saturating_sub(s_lo) <= l_hi.saturating_sub(l_lo) {
        baeza_yates(small, s_lo, s_hi, large, l_lo, l_hi, out);
    } else {
        baeza_yates(large, l_lo, l_hi, small, s_lo, s_hi, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn naive(a: &[u64], b: &[u64]) -> Vec<u64> {
        let b: BTreeSet<u64> = b.iter().copied().collect();
        a.iter().copied().filter(|x| b.contains(x)).collect()
    }

    #[test]
    fn test_doubling_search_positions() {
        let list: Vec<u64> = vec![1, 3, 5, 7, 9, 11, 13, 15, 17];
        assert_eq!(doubling_search(&list, 0, 0, list.len()), 0);
        assert_eq!(doubling_search(&list, 1, 0, list.len()), 0);
        assert_eq!(doubling_search(&list, 8, 0, list.len()), 4);
        assert_eq!(doubling_search(&list, 17, 0, list.len()), 8);
        assert_eq!(doubling_search(&list, 100, 0, list.len()), 9);
        assert_eq!(doubling_search(&list, 8, 5, list.len()), 5);
        assert_eq!(doubling_search(&list, 8, 3, 3), 3);
    }

    #[test]
    fn test_intersect_matches_naive() {
        let a: Vec<u64> = (0..1000).filter(|x| x % 3 == 0).collect();
        let b: Vec<u64> = (0..1000).filter(|x| x % 7 == 0).collect();
        assert_eq!(intersect(&a, &b), naive(&a, &b));
        assert_eq!(intersect(&b, &a), naive(&a, &b));
    }

    #[test]
    fn test_intersect_skewed_lengths() {
        let a: Vec<u64> = vec![5, 500, 9999];
        let b: Vec<u64> = (0..10_000).collect();
        assert_eq!(intersect(&a, &b), a);
    }

    #[test]
    fn test_intersect_empty_and_disjoint() {
        let empty: Vec<u64> = Vec::new();
        let a: Vec<u64> = vec![1, 2, 3];
        let b: Vec<u64> = vec![10, 20];
        assert!(intersect(&empty, &a).is_empty());
        assert!(intersect(&a, &b).is_empty());
    }

    #[test]
    fn test_shifted_hides_small_elements() {
        let base: Vec<u64> = vec![0, 2, 5, 9];
        let shifted = Shifted::new(&base, 3);
        assert_eq!(shifted.len(), 2);
        assert_eq!(shifted.get(0), 2);
        assert_eq!(shifted.get(1), 6);
    }

    #[test]
    fn test_shifted_intersection_aligns_ranks() {
        // Positions of two symbols in a K=3 layout: object 1 has symbol A at
        // rank 0 (pos 3) and symbol B at rank 1 (pos 4).
        let rank0: Vec<u64> = vec![3, 6, 11];
        let rank1: Vec<u64> = vec![1, 4, 8];
        let out = intersect(&rank0, &Shifted::new(&rank1, 1));
        assert_eq!(out, vec![3]);
    }
}
