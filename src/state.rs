//! Per-query search state.

use std::collections::HashSet;

/// Ids whose true distance has already been computed for one query.
///
/// Owned by exactly one in-flight query and dropped when it ends. The set
/// only grows; [`SearchState::evaluate`] is the single gate in front of every
/// distance computation, which is what makes evaluation at-most-once.
#[derive(Debug, Default)]
pub struct SearchState {
    evaluated: HashSet<u32>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            evaluated: HashSet::with_capacity(capacity),
        }
    }

    /// Mark `id` as evaluated. Returns `true` if it was not seen before, i.e.
    /// the caller should compute its distance now.
    #[inline]
    pub fn evaluate(&mut self, id: u32) -> bool {
        self.evaluated.insert(id)
    }

    pub fn is_evaluated(&self, id: u32) -> bool {
        self.evaluated.contains(&id)
    }

    /// Number of distinct ids evaluated so far.
    pub fn evaluations(&self) -> usize {
        self.evaluated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_once() {
        let mut state = SearchState::with_capacity(8);
        assert!(state.evaluate(3));
        assert!(!state.evaluate(3));
        assert!(state.evaluate(4));
        assert!(state.is_evaluated(3));
        assert!(!state.is_evaluated(5));
        assert_eq!(state.evaluations(), 2);
    }
}
