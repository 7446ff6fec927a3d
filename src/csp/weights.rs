//! Conflict weights for the dom/wdeg heuristic.

use super::model::VarId;
use std::collections::HashMap;

/// Weight every ordered pair starts with.
pub const INITIAL_WEIGHT: u64 = 1;

/// Per ordered pair conflict counters.
///
/// A table lives for one search run: pass it into a runner and take the
/// updated table back from the result. Starting a fresh problem instance
/// means starting from [`ConstraintWeights::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintWeights {
    weights: HashMap<(VarId, VarId), u64>,
    conflicts: u64,
}

impl ConstraintWeights {
    /// Creates a table with every pair at [`INITIAL_WEIGHT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of the ordered pair `(a, b)`.
    pub fn get(&self, a: VarId, b: VarId) -> u64 {
        self.weights.get(&(a, b)).copied().unwrap_or(INITIAL_WEIGHT)
    }

    /// Records one observed conflict between `a` and `b`.
    ///
    /// Both orientations are bumped.
    pub fn record_conflict(&mut self, a: VarId, b: VarId) {
        *self.weights.entry((a, b)).or_insert(INITIAL_WEIGHT) += 1;
        *self.weights.entry((b, a)).or_insert(INITIAL_WEIGHT) += 1;
        self.conflicts += 1;
    }

    /// Sum of `weight(var, n)` over the given neighbours.
    pub fn weighted_degree(&self, var: VarId, neighbors: &[VarId]) -> u64 {
        neighbors.iter().map(|&n| self.get(var, n)).sum()
    }

    /// Number of conflicts recorded so far.
    pub fn total_conflicts(&self) -> u64 {
        self.conflicts
    }
}
