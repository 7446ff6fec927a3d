//! AC-3 propagation loop.
//!
//! # Algorithm
//!
//! 1. Queue every arc, in insertion order
//! 2. Pop `(Xi, Xj)` and revise `Xi`: drop each value with no support in `Xj`
//! 3. If `Xi` lost a value:
//!    a. an empty `Xi` fails the whole run
//!    b. otherwise re-queue the arcs pointing at `Xi`
//! 4. Stop when the queue is empty
//!
//! The fixed point is the largest arc-consistent subset of the input
//! domains, whatever order the queue is processed in.
//!
//! # Reference
//!
//! Mackworth, A. K. (1977). "Consistency in Networks of Relations",
//! *Artificial Intelligence* 8(1), 99-118.

use super::types::Ac3Problem;
use crate::csp::{DomainStore, VarId};
use crate::error::CspError;
use log::{debug, trace};
use std::collections::VecDeque;

/// Result of a successful AC-3 run.
#[derive(Debug, Clone, PartialEq)]
pub struct Ac3Result<V> {
    /// Variable names in declaration order.
    pub names: Vec<String>,
    /// Arc-consistent domains, indexed by [`VarId`].
    pub domains: Vec<Vec<V>>,
    /// Number of arcs popped from the queue.
    pub revisions: usize,
    /// Removed values, in removal order.
    pub removals: Vec<Removal<V>>,
}

/// A value pruned by one revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal<V> {
    pub variable: VarId,
    pub value: V,
    /// Index into [`Ac3Problem::arcs`] of the arc whose revision removed it.
    pub arc: usize,
}

impl<V> Ac3Result<V> {
    /// Final domain of the named variable.
    pub fn domain(&self, name: &str) -> Option<&[V]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.domains[i].as_slice())
    }
}

/// Executes AC-3 on an [`Ac3Problem`].
pub struct Ac3Runner;

impl Ac3Runner {
    /// Prunes every domain to arc consistency.
    ///
    /// The problem itself is left untouched; the pruned domains are returned.
    ///
    /// # Errors
    ///
    /// [`CspError::DomainExhausted`] as soon as a revision empties a domain.
    pub fn run<V: Clone + PartialEq>(problem: &Ac3Problem<V>) -> Result<Ac3Result<V>, CspError> {
        let order: Vec<usize> = (0..problem.arcs().len()).collect();
        propagate(problem, &order)
    }
}

fn propagate<V: Clone + PartialEq>(
    problem: &Ac3Problem<V>,
    order: &[usize],
) -> Result<Ac3Result<V>, CspError> {
    let arcs = problem.arcs();
    let incoming = problem.incoming();
    let mut store = DomainStore::new(problem.domains().to_vec());

    let mut queued = vec![false; arcs.len()];
    let mut queue: VecDeque<usize> = VecDeque::with_capacity(arcs.len());
    for &a in order {
        if !queued[a] {
            queued[a] = true;
            queue.push_back(a);
        }
    }

    let mut revisions = 0usize;
    let mut causes: Vec<usize> = Vec::new();
    while let Some(a) = queue.pop_front() {
        queued[a] = false;
        revisions += 1;
        let arc = &arcs[a];

        if !revise(&mut store, arc.source, arc.target, |x, y| arc.supports(x, y)) {
            continue;
        }
        causes.resize(store.mark(), a);
        trace!(
            "revised {} against {}: {} values left",
            problem.name(arc.source),
            problem.name(arc.target),
            store.size(arc.source)
        );

        if store.is_empty(arc.source) {
            debug!(
                "ac3: domain of {} exhausted after {} revisions",
                problem.name(arc.source),
                revisions
            );
            return Err(CspError::DomainExhausted {
                variable: problem.name(arc.source).to_string(),
            });
        }

        for &k in &incoming[arc.source.0] {
            if !queued[k] {
                queued[k] = true;
                queue.push_back(k);
            }
        }
    }

    let removals = store
        .removals_since(0)
        .iter()
        .zip(causes)
        .map(|(&(variable, idx), arc)| Removal {
            variable,
            value: store.value(variable, idx).clone(),
            arc,
        })
        .collect();
    debug!("ac3: consistent after {} revisions", revisions);

    Ok(Ac3Result {
        names: problem.names().to_vec(),
        domains: store.into_domains(),
        revisions,
        removals,
    })
}

/// Removes from `xi` every value without support in `xj`.
///
/// Support is checked against `xj`'s domain as it stood before the call,
/// which also covers self-loops (`xi == xj`). Returns whether anything was
/// removed.
pub(crate) fn revise<V: Clone>(
    store: &mut DomainStore<V>,
    xi: VarId,
    xj: VarId,
    mut supports: impl FnMut(&V, &V) -> bool,
) -> bool {
    let doomed: Vec<usize> = store
        .live(xi)
        .filter(|&(_, x)| !store.values(xj).any(|y| supports(x, y)))
        .map(|(i, _)| i)
        .collect();

    for &idx in &doomed {
        store.remove(xi, idx);
    }
    !doomed.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Five activities with start times 9, 10 or 11 (A4 cannot start at 10).
    fn schedule_problem() -> Ac3Problem<i32> {
        let mut p = Ac3Problem::new();
        p.add_variable("A1", [9, 10, 11]).unwrap();
        p.add_variable("A2", [9, 10, 11]).unwrap();
        p.add_variable("A3", [9, 10, 11]).unwrap();
        p.add_variable("A4", [9, 11]).unwrap();
        p.add_variable("A5", [9, 10, 11]).unwrap();
        p.add_arc("A3", "A1", |x: &i32, y: &i32| x < y).unwrap();
        p.add_arc("A5", "A3", |x: &i32, y: &i32| x < y).unwrap();
        p.add_arc("A3", "A4", |x: &i32, y: &i32| x < y).unwrap();
        p.add_arc("A2", "A1", |x: &i32, y: &i32| x != y).unwrap();
        p.add_arc("A2", "A4", |x: &i32, y: &i32| x != y).unwrap();
        p
    }

    #[test]
    fn test_schedule_domains() {
        let result = Ac3Runner::run(&schedule_problem()).unwrap();

        assert_eq!(result.domain("A1"), Some(&[9, 10, 11][..]));
        assert_eq!(result.domain("A2"), Some(&[9, 10, 11][..]));
        assert_eq!(result.domain("A3"), Some(&[9, 10][..]));
        assert_eq!(result.domain("A4"), Some(&[9, 11][..]));
        assert_eq!(result.domain("A5"), Some(&[9][..]));
        let removal = |var, value, arc| Removal {
            variable: VarId(var),
            value,
            arc,
        };
        // A3 loses 11 to A3 < A1, then A5 loses 10 and 11 to A5 < A3.
        assert_eq!(
            result.removals,
            vec![removal(2, 11, 0), removal(4, 10, 1), removal(4, 11, 1)]
        );
    }

    #[test]
    fn test_schedule_problem_not_mutated() {
        let problem = schedule_problem();
        Ac3Runner::run(&problem).unwrap();
        assert_eq!(problem.domain(VarId(2)), &[9, 10, 11]);
    }

    #[test]
    fn test_domain_exhausted() {
        let mut p = Ac3Problem::new();
        p.add_variable("A", [5]).unwrap();
        p.add_variable("B", [5]).unwrap();
        p.add_arc("A", "B", |x: &i32, y: &i32| x != y).unwrap();

        let err = Ac3Runner::run(&p).unwrap_err();
        assert_eq!(
            err,
            CspError::DomainExhausted {
                variable: "A".into()
            }
        );
    }

    #[test]
    fn test_chain_propagates_backwards() {
        // A < B < C over {1, 2, 3} leaves a single value each.
        let mut p = Ac3Problem::new();
        for name in ["A", "B", "C"] {
            p.add_variable(name, [1, 2, 3]).unwrap();
        }
        p.add_arc("B", "C", |x: &i32, y: &i32| x < y).unwrap();
        p.add_arc("A", "B", |x: &i32, y: &i32| x < y).unwrap();
        p.add_arc("C", "B", |x: &i32, y: &i32| x > y).unwrap();
        p.add_arc("B", "A", |x: &i32, y: &i32| x > y).unwrap();

        let result = Ac3Runner::run(&p).unwrap();
        assert_eq!(result.domains, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_self_loop_terminates() {
        // x < y within the same domain peels one value per revision.
        let mut p = Ac3Problem::new();
        p.add_variable("A", [1, 2, 3]).unwrap();
        p.add_arc("A", "A", |x: &i32, y: &i32| x < y).unwrap();

        let err = Ac3Runner::run(&p).unwrap_err();
        assert!(matches!(err, CspError::DomainExhausted { .. }));

        let mut q = Ac3Problem::new();
        q.add_variable("A", [1, 2, 3]).unwrap();
        q.add_arc("A", "A", |x: &i32, y: &i32| x <= y).unwrap();
        let result = Ac3Runner::run(&q).unwrap();
        assert_eq!(result.domains, vec![vec![1, 2, 3]]);
        assert_eq!(result.revisions, 1);
    }

    #[test]
    fn test_no_arcs() {
        let mut p = Ac3Problem::new();
        p.add_variable("A", [1, 2]).unwrap();
        let result = Ac3Runner::run(&p).unwrap();
        assert_eq!(result.domains, vec![vec![1, 2]]);
        assert_eq!(result.revisions, 0);
        assert!(result.removals.is_empty());
    }

    // ---- Properties over random binary problems ----

    #[derive(Debug, Clone, Copy)]
    enum Rel {
        Lt,
        Le,
        Ne,
        Eq,
        Gt,
    }

    impl Rel {
        fn holds(self, x: i32, y: i32) -> bool {
            match self {
                Rel::Lt => x < y,
                Rel::Le => x <= y,
                Rel::Ne => x != y,
                Rel::Eq => x == y,
                Rel::Gt => x > y,
            }
        }
    }

    fn rel() -> impl Strategy<Value = Rel> {
        prop_oneof![
            Just(Rel::Lt),
            Just(Rel::Le),
            Just(Rel::Ne),
            Just(Rel::Eq),
            Just(Rel::Gt),
        ]
    }

    type Instance = (Vec<Vec<i32>>, Vec<(usize, usize, Rel)>);

    fn instances() -> impl Strategy<Value = Instance> {
        (2usize..6).prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(0i32..5, 1..5), n),
                prop::collection::vec((0..n, 0..n, rel()), 0..10),
            )
        })
    }

    fn build(instance: &Instance) -> Ac3Problem<i32> {
        let (domains, arcs) = instance;
        let mut p = Ac3Problem::new();
        for (i, d) in domains.iter().enumerate() {
            p.add_variable(format!("X{i}"), d.iter().copied()).unwrap();
        }
        for &(s, t, r) in arcs {
            p.add_arc(&format!("X{s}"), &format!("X{t}"), move |x: &i32, y: &i32| {
                r.holds(*x, *y)
            })
            .unwrap();
        }
        p
    }

    proptest! {
        #[test]
        fn prop_never_enlarges_and_removals_unsupported(instance in instances()) {
            let problem = build(&instance);
            if let Ok(result) = Ac3Runner::run(&problem) {
                for var in 0..problem.names().len() {
                    let initial = problem.domain(VarId(var));
                    prop_assert!(result.domains[var].iter().all(|v| initial.contains(v)));
                    prop_assert!(result.domains[var].len() <= initial.len());
                }
                // Replay the log: each value had no support on its arc in
                // the domains as they stood when it was removed.
                let mut replay: Vec<Vec<i32>> = (0..problem.names().len())
                    .map(|var| problem.domain(VarId(var)).to_vec())
                    .collect();
                for removal in &result.removals {
                    let arc = &problem.arcs()[removal.arc];
                    prop_assert_eq!(arc.source, removal.variable);
                    let source = removal.variable.0;
                    let pos = replay[source].iter().position(|v| *v == removal.value);
                    prop_assert!(pos.is_some(), "{:?} removed twice", removal);
                    prop_assert!(
                        !replay[arc.target.0].iter().any(|y| arc.supports(&removal.value, y)),
                        "{:?} still had support", removal
                    );
                    if let Some(pos) = pos {
                        replay[source].remove(pos);
                    }
                }
                prop_assert_eq!(&replay, &result.domains);
                // Every surviving value is supported on every arc.
                for arc in problem.arcs() {
                    for x in &result.domains[arc.source.0] {
                        prop_assert!(result.domains[arc.target.0].iter().any(|y| arc.supports(x, y)));
                    }
                }
            }
        }

        #[test]
        fn prop_confluent((instance, order) in instances().prop_flat_map(|instance| {
            let arcs = instance.1.len();
            (Just(instance), Just((0..arcs).collect::<Vec<usize>>()).prop_shuffle())
        })) {
            let problem = build(&instance);

            let forward = Ac3Runner::run(&problem);
            let shuffled = propagate(&problem, &order);
            match (forward, shuffled) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a.domains, b.domains),
                (Err(_), Err(_)) => {}
                (a, b) => prop_assert!(false, "outcomes differ: {:?} vs {:?}", a, b),
            }
        }
    }
}
