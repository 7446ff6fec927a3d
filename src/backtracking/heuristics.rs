//! Variable selection and value ordering.
//!
//! Both are pure functions of the model, the current domains, the partial
//! assignment and the conflict weights. `assigned[v]` holds the index of the
//! value chosen for variable `v` (an index into its initial domain), or
//! `None` while `v` is unassigned.
//!
//! # References
//!
//! - Haralick & Elliott (1980), "Increasing tree search efficiency for
//!   constraint satisfaction problems" (MRV)
//! - Boussemart, Hemery, Lecoutre & Sais (2004), "Boosting systematic
//!   search by weighting constraints" (dom/wdeg)

use super::config::{ValueOrdering, VariableSelection};
use crate::csp::{ConstraintWeights, CspModel, DomainStore, VarId};

/// Picks the next variable to branch on, or `None` when all are assigned.
///
/// Ties always go to the variable declared first.
pub fn select_variable<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &DomainStore<V>,
    assigned: &[Option<usize>],
    weights: &ConstraintWeights,
    selection: VariableSelection,
) -> Option<VarId> {
    let unassigned: Vec<VarId> = model
        .variables()
        .filter(|v| assigned[v.0].is_none())
        .collect();

    match selection {
        VariableSelection::FirstUnassigned => unassigned.first().copied(),
        VariableSelection::Mrv => argmin(&unassigned, |v| store.size(v) as f64),
        VariableSelection::Combined => {
            let sizes: Vec<f64> = unassigned
                .iter()
                .map(|&v| store.size(v).max(1) as f64)
                .collect();
            let mrv: Vec<f64> = sizes.iter().map(|s| 1.0 / s).collect();
            let wdeg: Vec<f64> = unassigned
                .iter()
                .zip(&sizes)
                .map(|(&v, s)| {
                    let degree = weights.weighted_degree(v, model.neighbors(v)).max(1);
                    s / degree as f64
                })
                .collect();

            let max_mrv = mrv.iter().copied().fold(f64::MIN_POSITIVE, f64::max);
            let max_wdeg = wdeg.iter().copied().fold(f64::MIN_POSITIVE, f64::max);

            let positions: Vec<usize> = (0..unassigned.len()).collect();
            argmin(&positions, |i| mrv[i] / max_mrv + wdeg[i] / max_wdeg).map(|i| unassigned[i])
        }
    }
}

/// First item with the strictly lowest score.
fn argmin<T: Copy>(items: &[T], mut score: impl FnMut(T) -> f64) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for &item in items {
        let s = score(item);
        match best {
            Some((_, b)) if s >= b => {}
            _ => best = Some((item, s)),
        }
    }
    best.map(|(item, _)| item)
}

/// Live value indices of `var`, in the order they should be tried.
pub fn order_values<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &DomainStore<V>,
    assigned: &[Option<usize>],
    var: VarId,
    ordering: ValueOrdering,
) -> Vec<usize> {
    let live = store.live_indices(var);
    match ordering {
        ValueOrdering::DomainOrder => live,
        ValueOrdering::LeastConstraining => {
            let mut scored: Vec<(usize, usize)> = live
                .into_iter()
                .map(|idx| (ruled_out(model, store, assigned, var, idx), idx))
                .collect();
            scored.sort_by_key(|&(count, _)| count);
            scored.into_iter().map(|(_, idx)| idx).collect()
        }
    }
}

/// Number of live neighbour values that `var = domain[idx]` would rule out.
fn ruled_out<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &DomainStore<V>,
    assigned: &[Option<usize>],
    var: VarId,
    idx: usize,
) -> usize {
    let value = &model.domain(var)[idx];
    model
        .neighbors(var)
        .iter()
        .filter(|n| assigned[n.0].is_none())
        .map(|&n| {
            store
                .values(n)
                .filter(|y| !model.consistent(var, value, n, y))
                .count()
        })
        .sum()
}
