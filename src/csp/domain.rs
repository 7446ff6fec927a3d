//! Reversible per-variable domains.

use super::model::{CspModel, VarId};

/// Signal that a variable's domain was emptied during propagation.
///
/// Inside backtracking this is a per-branch failure that triggers a
/// backtrack, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainExhausted(pub VarId);

/// Mutable candidate values for every variable, with an undo log.
///
/// Values keep their original positions; removal only clears a liveness
/// flag and appends `(variable, value index)` to the trail. Undoing to a
/// [`mark`](Self::mark) restores every value removed since, so domains come
/// back exactly as they were, in their original order.
#[derive(Debug, Clone)]
pub struct DomainStore<V> {
    values: Vec<Vec<V>>,
    live: Vec<Vec<bool>>,
    sizes: Vec<usize>,
    trail: Vec<(VarId, usize)>,
}

impl<V: Clone> DomainStore<V> {
    /// Creates a store with every value live.
    pub fn new(domains: Vec<Vec<V>>) -> Self {
        let live = domains.iter().map(|d| vec![true; d.len()]).collect();
        let sizes = domains.iter().map(Vec::len).collect();
        Self {
            values: domains,
            live,
            sizes,
            trail: Vec::new(),
        }
    }

    /// Creates a store holding a private copy of the model's domains.
    pub fn from_model(model: &CspModel<V>) -> Self
    where
        V: PartialEq,
    {
        Self::new(model.domains().to_vec())
    }

    /// Number of live values of `var`.
    pub fn size(&self, var: VarId) -> usize {
        self.sizes[var.0]
    }

    /// Whether `var` has no live value left.
    pub fn is_empty(&self, var: VarId) -> bool {
        self.sizes[var.0] == 0
    }

    /// Whether the value at `idx` is still live.
    pub fn is_live(&self, var: VarId, idx: usize) -> bool {
        self.live[var.0][idx]
    }

    /// The value stored at `idx`, live or not.
    pub fn value(&self, var: VarId, idx: usize) -> &V {
        &self.values[var.0][idx]
    }

    /// Live `(index, value)` pairs of `var`, in original order.
    pub fn live(&self, var: VarId) -> impl Iterator<Item = (usize, &V)> + '_ {
        let flags = &self.live[var.0];
        self.values[var.0]
            .iter()
            .enumerate()
            .filter(move |&(i, _)| flags[i])
    }

    /// Live values of `var`, in original order.
    pub fn values(&self, var: VarId) -> impl Iterator<Item = &V> + '_ {
        self.live(var).map(|(_, v)| v)
    }

    /// Indices of the live values of `var`.
    pub fn live_indices(&self, var: VarId) -> Vec<usize> {
        self.live(var).map(|(i, _)| i).collect()
    }

    /// Clones the live values of `var`.
    pub fn current(&self, var: VarId) -> Vec<V> {
        self.values(var).cloned().collect()
    }

    /// Removes the value at `idx`. Returns `false` if it was already gone.
    pub fn remove(&mut self, var: VarId, idx: usize) -> bool {
        if !self.live[var.0][idx] {
            return false;
        }
        self.live[var.0][idx] = false;
        self.sizes[var.0] -= 1;
        self.trail.push((var, idx));
        true
    }

    /// Removes every live value of `var` except the one at `idx`.
    pub fn restrict_to(&mut self, var: VarId, idx: usize) {
        for other in 0..self.values[var.0].len() {
            if other != idx {
                self.remove(var, other);
            }
        }
    }

    /// Current position in the undo log.
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Restores every value removed after `mark`.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((var, idx)) = self.trail.pop() {
                self.live[var.0][idx] = true;
                self.sizes[var.0] += 1;
            }
        }
    }

    /// Removals recorded since `mark`, oldest first.
    pub fn removals_since(&self, mark: usize) -> &[(VarId, usize)] {
        &self.trail[mark.min(self.trail.len())..]
    }

    /// Consumes the store, returning the live values of every variable.
    pub fn into_domains(self) -> Vec<Vec<V>> {
        self.values
            .into_iter()
            .zip(self.live)
            .map(|(values, live)| {
                values
                    .into_iter()
                    .zip(live)
                    .filter_map(|(v, on)| on.then_some(v))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DomainStore<i32> {
        DomainStore::new(vec![vec![9, 10, 11], vec![9, 11]])
    }

    #[test]
    fn test_remove_and_size() {
        let mut s = store();
        assert!(s.remove(VarId(0), 1));
        assert!(!s.remove(VarId(0), 1));
        assert_eq!(s.size(VarId(0)), 2);
        assert_eq!(s.current(VarId(0)), vec![9, 11]);
        assert!(!s.is_live(VarId(0), 1));
    }

    #[test]
    fn test_undo_restores_original_order() {
        let mut s = store();
        let mark = s.mark();
        s.remove(VarId(0), 0);
        s.remove(VarId(1), 1);
        s.remove(VarId(0), 2);
        assert_eq!(s.removals_since(mark).len(), 3);

        s.undo_to(mark);
        assert_eq!(s.current(VarId(0)), vec![9, 10, 11]);
        assert_eq!(s.current(VarId(1)), vec![9, 11]);
        assert_eq!(s.mark(), mark);
    }

    #[test]
    fn test_nested_marks() {
        let mut s = store();
        s.remove(VarId(0), 0);
        let outer = s.mark();
        s.restrict_to(VarId(1), 0);
        let inner = s.mark();
        s.remove(VarId(0), 1);
        assert_eq!(s.size(VarId(0)), 1);

        s.undo_to(inner);
        assert_eq!(s.current(VarId(0)), vec![10, 11]);
        assert_eq!(s.current(VarId(1)), vec![9]);

        s.undo_to(outer);
        assert_eq!(s.current(VarId(1)), vec![9, 11]);
        assert_eq!(s.current(VarId(0)), vec![10, 11]);
    }

    #[test]
    fn test_empty_detection() {
        let mut s = store();
        s.remove(VarId(1), 0);
        s.remove(VarId(1), 1);
        assert!(s.is_empty(VarId(1)));
        assert_eq!(s.into_domains(), vec![vec![9, 10, 11], vec![]]);
    }
}
