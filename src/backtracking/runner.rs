//! Depth-first backtracking over an explicit frame stack.
//!
//! # Algorithm
//!
//! 1. Select an unassigned variable; none left means solved
//! 2. Push a frame holding its ordered candidate values
//! 3. Try the frame's next candidate:
//!    a. skip it if it clashes with an assigned neighbour
//!    b. otherwise assign it, run inference, and descend on success
//!    c. on failure undo the removals logged since the frame's mark
//! 4. A frame without candidates is popped (backtrack); popping the last
//!    frame means the search space is exhausted
//!
//! Stack depth equals the number of variables, independent of the native
//! call stack. Cancellation, step and time limits are checked whenever a
//! frame is entered.

use super::config::{BacktrackingConfig, Inference};
use super::heuristics::{order_values, select_variable};
use super::inference::{establish_arc_consistency, infer};
use crate::csp::{ConstraintWeights, CspModel, DomainStore, Solution, VarId};
use crate::error::CspError;
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How a backtracking run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// Every variable is assigned and no constraint is violated.
    Solved,
    /// Every branch failed: the problem has no solution.
    Exhausted,
    /// `max_steps` frames were entered first.
    StepLimitReached,
    /// The time limit elapsed first.
    TimedOut,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Result of a backtracking run.
#[derive(Debug, Clone)]
pub struct BacktrackingResult<V> {
    /// How the search ended.
    pub status: SearchStatus,

    /// The assignment, present iff `status` is [`SearchStatus::Solved`].
    pub solution: Option<Solution<V>>,

    /// Tentative assignments that passed the neighbour check.
    pub nodes: usize,

    /// Frames popped after running out of candidates.
    pub backtracks: usize,

    /// Frames entered.
    pub steps: usize,

    /// Conflict weights after the run.
    pub weights: ConstraintWeights,
}

impl<V> BacktrackingResult<V> {
    /// Whether a solution was found.
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// [`CspError::SearchExhausted`] when no solution exists,
    /// [`CspError::StepBudgetExceeded`] after the step limit, and
    /// [`CspError::Interrupted`] after a timeout or cancellation.
    pub fn into_solution(self) -> Result<Solution<V>, CspError> {
        match (self.status, self.solution) {
            (SearchStatus::Solved, Some(solution)) => Ok(solution),
            (SearchStatus::StepLimitReached, _) => {
                Err(CspError::StepBudgetExceeded { steps: self.steps })
            }
            (SearchStatus::TimedOut | SearchStatus::Cancelled, _) => Err(CspError::Interrupted),
            _ => Err(CspError::SearchExhausted),
        }
    }
}

/// One level of the search.
struct Frame {
    var: VarId,
    candidates: Vec<usize>,
    next: usize,
    /// Trail mark taken before the candidate currently assigned.
    mark: Option<usize>,
}

/// Executes backtracking search on a [`CspModel`].
///
/// # Examples
///
/// ```
/// use u_csp::backtracking::{BacktrackingConfig, BacktrackingRunner, Inference};
/// use u_csp::csp::CspModel;
///
/// let model = CspModel::builder()
///     .add_variable("WA", ["red", "green", "blue"])
///     .add_variable("NT", ["red", "green", "blue"])
///     .add_variable("SA", ["red", "green", "blue"])
///     .build(|_, a: &&str, _, b: &&str| a != b)
///     .unwrap();
///
/// let config = BacktrackingConfig::default().with_inference(Inference::Mac);
/// let result = BacktrackingRunner::run(&model, &config);
/// let solution = result.into_solution().unwrap();
/// assert!(model.is_solution(solution.values()));
/// ```
pub struct BacktrackingRunner;

impl BacktrackingRunner {
    /// Runs the search with a fresh weight table.
    pub fn run<V: Clone + PartialEq>(
        model: &CspModel<V>,
        config: &BacktrackingConfig,
    ) -> BacktrackingResult<V> {
        Self::run_with_cancel(model, config, ConstraintWeights::new(), None)
    }

    /// Runs the search starting from existing conflict weights.
    pub fn run_with_weights<V: Clone + PartialEq>(
        model: &CspModel<V>,
        config: &BacktrackingConfig,
        weights: ConstraintWeights,
    ) -> BacktrackingResult<V> {
        Self::run_with_cancel(model, config, weights, None)
    }

    /// Runs the search with an optional cancellation token.
    pub fn run_with_cancel<V: Clone + PartialEq>(
        model: &CspModel<V>,
        config: &BacktrackingConfig,
        mut weights: ConstraintWeights,
        cancel: Option<Arc<AtomicBool>>,
    ) -> BacktrackingResult<V> {
        let start = Instant::now();
        let mut store = DomainStore::from_model(model);
        let mut assigned: Vec<Option<usize>> = vec![None; model.len()];
        let mut stack: Vec<Frame> = Vec::with_capacity(model.len());

        let mut nodes = 0usize;
        let mut backtracks = 0usize;
        let mut steps = 0usize;

        let status = if config.inference == Inference::Mac
            && establish_arc_consistency(model, &mut store, &mut weights).is_err()
        {
            SearchStatus::Exhausted
        } else {
            'search: loop {
                let Some(var) = select_variable(
                    model,
                    &store,
                    &assigned,
                    &weights,
                    config.variable_selection,
                ) else {
                    break SearchStatus::Solved;
                };

                if let Some(reason) = interruption(config, cancel.as_deref(), steps, start) {
                    break reason;
                }
                steps += 1;

                let candidates =
                    order_values(model, &store, &assigned, var, config.value_ordering);
                stack.push(Frame {
                    var,
                    candidates,
                    next: 0,
                    mark: None,
                });

                loop {
                    let Some(frame) = stack.last_mut() else {
                        break 'search SearchStatus::Exhausted;
                    };
                    if let Some(mark) = frame.mark.take() {
                        store.undo_to(mark);
                        assigned[frame.var.0] = None;
                    }
                    let Some(&idx) = frame.candidates.get(frame.next) else {
                        stack.pop();
                        backtracks += 1;
                        continue;
                    };
                    frame.next += 1;
                    let var = frame.var;

                    if let Some(other) = first_clash(model, &assigned, var, idx) {
                        weights.record_conflict(var, other);
                        continue;
                    }

                    nodes += 1;
                    frame.mark = Some(store.mark());
                    assigned[var.0] = Some(idx);
                    store.restrict_to(var, idx);

                    match infer(config.inference, model, &mut store, &assigned, var, &mut weights)
                    {
                        Ok(()) => continue 'search,
                        Err(wipeout) => trace!(
                            "{} = candidate {} wiped out {}",
                            model.name(var),
                            idx,
                            model.name(wipeout.0)
                        ),
                    }
                }
            }
        };

        let solution = (status == SearchStatus::Solved).then(|| {
            let indices: Vec<usize> = assigned.iter().flatten().copied().collect();
            model.solution_from_indices(&indices)
        });

        debug!(
            "backtracking: {:?} after {} nodes, {} backtracks, {} steps",
            status, nodes, backtracks, steps
        );

        BacktrackingResult {
            status,
            solution,
            nodes,
            backtracks,
            steps,
            weights,
        }
    }
}

/// First assigned neighbour whose value clashes with `var = domain[idx]`.
fn first_clash<V: Clone + PartialEq>(
    model: &CspModel<V>,
    assigned: &[Option<usize>],
    var: VarId,
    idx: usize,
) -> Option<VarId> {
    let value = &model.domain(var)[idx];
    model.neighbors(var).iter().copied().find(|&n| {
        assigned[n.0].is_some_and(|j| !model.consistent(var, value, n, &model.domain(n)[j]))
    })
}

fn interruption(
    config: &BacktrackingConfig,
    cancel: Option<&AtomicBool>,
    steps: usize,
    start: Instant,
) -> Option<SearchStatus> {
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Some(SearchStatus::Cancelled);
    }
    if config.max_steps > 0 && steps >= config.max_steps {
        return Some(SearchStatus::StepLimitReached);
    }
    if config
        .time_limit
        .is_some_and(|limit| start.elapsed() >= limit)
    {
        return Some(SearchStatus::TimedOut);
    }
    None
}
