//! Inference hooks run after each tentative assignment.
//!
//! Every removal goes through the [`DomainStore`] trail, so the caller undoes
//! an inference simply by rolling the store back to the mark it took before
//! assigning.

use super::config::Inference;
use crate::ac3::revise;
use crate::csp::{ConstraintWeights, CspModel, DomainExhausted, DomainStore, VarId};
use std::collections::{HashSet, VecDeque};

/// Runs the configured inference for the assignment just made to `var`.
pub(crate) fn infer<V: Clone + PartialEq>(
    inference: Inference,
    model: &CspModel<V>,
    store: &mut DomainStore<V>,
    assigned: &[Option<usize>],
    var: VarId,
    weights: &mut ConstraintWeights,
) -> Result<(), DomainExhausted> {
    match inference {
        Inference::None => Ok(()),
        Inference::ForwardChecking => forward_check(model, store, assigned, var, weights),
        Inference::Mac => maintain_arc_consistency(model, store, assigned, var, weights),
    }
}

/// Prunes unassigned neighbours of `var` against its assigned value.
pub(crate) fn forward_check<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &mut DomainStore<V>,
    assigned: &[Option<usize>],
    var: VarId,
    weights: &mut ConstraintWeights,
) -> Result<(), DomainExhausted> {
    let Some(idx) = assigned[var.0] else {
        return Ok(());
    };
    let value = &model.domain(var)[idx];

    for &n in model.neighbors(var) {
        if assigned[n.0].is_some() {
            continue;
        }
        let doomed: Vec<usize> = store
            .live(n)
            .filter(|&(_, y)| !model.consistent(var, value, n, y))
            .map(|(i, _)| i)
            .collect();
        for i in doomed {
            store.remove(n, i);
        }
        if store.is_empty(n) {
            weights.record_conflict(var, n);
            return Err(DomainExhausted(n));
        }
    }
    Ok(())
}

/// Forward checking, then AC-3 from the arcs pointing at `var`'s neighbours.
pub(crate) fn maintain_arc_consistency<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &mut DomainStore<V>,
    assigned: &[Option<usize>],
    var: VarId,
    weights: &mut ConstraintWeights,
) -> Result<(), DomainExhausted> {
    forward_check(model, store, assigned, var, weights)?;

    let mut queue = ArcQueue::default();
    for &x in model.neighbors(var) {
        for &z in model.neighbors(x) {
            if z != var {
                queue.push(z, x);
            }
        }
    }
    propagate(model, store, weights, queue)
}

/// Full AC-3 over every neighbour arc, run once before MAC search starts.
pub(crate) fn establish_arc_consistency<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &mut DomainStore<V>,
    weights: &mut ConstraintWeights,
) -> Result<(), DomainExhausted> {
    let mut queue = ArcQueue::default();
    for x in model.variables() {
        for &y in model.neighbors(x) {
            queue.push(x, y);
        }
    }
    propagate(model, store, weights, queue)
}

/// FIFO of neighbour arcs without duplicates.
#[derive(Default)]
struct ArcQueue {
    order: VecDeque<(VarId, VarId)>,
    queued: HashSet<(VarId, VarId)>,
}

impl ArcQueue {
    fn push(&mut self, x: VarId, y: VarId) {
        if self.queued.insert((x, y)) {
            self.order.push_back((x, y));
        }
    }

    fn pop(&mut self) -> Option<(VarId, VarId)> {
        let arc = self.order.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }
}

fn propagate<V: Clone + PartialEq>(
    model: &CspModel<V>,
    store: &mut DomainStore<V>,
    weights: &mut ConstraintWeights,
    mut queue: ArcQueue,
) -> Result<(), DomainExhausted> {
    while let Some((x, y)) = queue.pop() {
        if !revise(store, x, y, |a, b| model.consistent(x, a, y, b)) {
            continue;
        }
        if store.is_empty(x) {
            weights.record_conflict(x, y);
            return Err(DomainExhausted(x));
        }
        // The reverse arc shares the same relation, so (y, x) stays consistent.
        for &z in model.neighbors(x) {
            if z != y {
                queue.push(z, x);
            }
        }
    }
    Ok(())
}
