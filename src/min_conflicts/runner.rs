//! Min-conflicts execution loop.
//!
//! # Algorithm
//!
//! 1. Assign every variable a uniformly random value
//! 2. At each step:
//!    a. Collect the variables with at least one clashing neighbour
//!    b. Stop if there are none
//!    c. Pick one of them uniformly at random
//!    d. Reassign it the value with the fewest clashes, ties broken randomly
//! 3. After the step budget, check the final assignment once more
//!
//! Every clash counted while scoring values bumps the weight of the pair
//! involved.

use super::config::MinConflictsConfig;
use crate::csp::{ConstraintWeights, CspModel, Solution, VarId};
use crate::error::CspError;
use crate::random::{create_rng, rng_from_seed};
use log::{debug, trace};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a min-conflicts run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MinConflictsStatus {
    /// The final assignment violates no constraint.
    Solved,
    /// Conflicts remain after `max_steps` repairs.
    StepBudgetExceeded,
}

/// Result of a min-conflicts run.
#[derive(Debug, Clone)]
pub struct MinConflictsResult<V> {
    /// How the run ended.
    pub status: MinConflictsStatus,

    /// The final complete assignment. A solution only when solved.
    pub solution: Solution<V>,

    /// Repair steps performed.
    pub steps: usize,

    /// Conflicting neighbour pairs left in `solution`.
    pub remaining_conflicts: usize,

    /// Conflict weights after the run.
    pub weights: ConstraintWeights,
}

impl<V> MinConflictsResult<V> {
    /// Whether the final assignment is a solution.
    pub fn is_solved(&self) -> bool {
        self.status == MinConflictsStatus::Solved
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// [`CspError::StepBudgetExceeded`] when conflicts remain.
    pub fn into_solution(self) -> Result<Solution<V>, CspError> {
        match self.status {
            MinConflictsStatus::Solved => Ok(self.solution),
            MinConflictsStatus::StepBudgetExceeded => {
                Err(CspError::StepBudgetExceeded { steps: self.steps })
            }
        }
    }
}

/// Executes min-conflicts local repair on a [`CspModel`].
///
/// # Examples
///
/// ```
/// use u_csp::csp::CspModel;
/// use u_csp::min_conflicts::{MinConflictsConfig, MinConflictsRunner};
///
/// let model = CspModel::builder()
///     .add_variable("A", [0, 1, 2])
///     .add_variable("B", [0, 1, 2])
///     .add_variable("C", [0, 1, 2])
///     .build(|_, x: &i32, _, y: &i32| x != y)
///     .unwrap();
///
/// let config = MinConflictsConfig::default().with_seed(7);
/// let result = MinConflictsRunner::run(&model, &config);
/// if result.is_solved() {
///     assert!(model.is_solution(result.solution.values()));
/// }
/// ```
pub struct MinConflictsRunner;

impl MinConflictsRunner {
    /// Runs min-conflicts with a fresh weight table.
    pub fn run<V: Clone + PartialEq>(
        model: &CspModel<V>,
        config: &MinConflictsConfig,
    ) -> MinConflictsResult<V> {
        Self::run_with_weights(model, config, ConstraintWeights::new())
    }

    /// Runs min-conflicts starting from existing conflict weights.
    pub fn run_with_weights<V: Clone + PartialEq>(
        model: &CspModel<V>,
        config: &MinConflictsConfig,
        weights: ConstraintWeights,
    ) -> MinConflictsResult<V> {
        let mut rng = rng_from_seed(config.seed);
        Self::run_with_rng(model, config, weights, &mut rng)
    }

    /// Runs min-conflicts drawing from the given random source.
    ///
    /// `config.seed` is ignored.
    pub fn run_with_rng<V: Clone + PartialEq, R: Rng>(
        model: &CspModel<V>,
        config: &MinConflictsConfig,
        mut weights: ConstraintWeights,
        rng: &mut R,
    ) -> MinConflictsResult<V> {
        let mut current: Vec<usize> = model
            .variables()
            .map(|v| rng.random_range(0..model.domain(v).len()))
            .collect();

        let mut steps = 0usize;
        let mut solved = false;
        while steps < config.max_steps {
            let conflicted = conflicted_variables(model, &current);
            if conflicted.is_empty() {
                solved = true;
                break;
            }
            let var = conflicted[rng.random_range(0..conflicted.len())];

            let mut best: Vec<usize> = Vec::new();
            let mut best_count = usize::MAX;
            for idx in 0..model.domain(var).len() {
                let count = clashes(model, &current, var, idx, &mut weights);
                if count < best_count {
                    best_count = count;
                    best.clear();
                }
                if count == best_count {
                    best.push(idx);
                }
            }
            let choice = best[rng.random_range(0..best.len())];
            trace!(
                "step {}: {} -> candidate {} ({} clashes)",
                steps,
                model.name(var),
                choice,
                best_count
            );
            current[var.0] = choice;
            steps += 1;
        }

        if !solved {
            solved = conflicted_variables(model, &current).is_empty();
        }

        let solution = model.solution_from_indices(&current);
        let remaining_conflicts = model.count_conflicts(solution.values());
        let status = if solved {
            MinConflictsStatus::Solved
        } else {
            MinConflictsStatus::StepBudgetExceeded
        };

        debug!(
            "min-conflicts: {:?} after {} steps, {} conflicts left",
            status, steps, remaining_conflicts
        );

        MinConflictsResult {
            status,
            solution,
            steps,
            remaining_conflicts,
            weights,
        }
    }

    /// Runs `restarts` independent searches seeded `seed, seed + 1, ...`.
    ///
    /// Returns the solved run with the lowest seed offset, or the last run
    /// when none is solved. Runs execute on the rayon pool when the
    /// `parallel` feature is enabled.
    pub fn run_restarts<V>(
        model: &CspModel<V>,
        config: &MinConflictsConfig,
        restarts: usize,
    ) -> MinConflictsResult<V>
    where
        V: Clone + PartialEq + Send + Sync,
    {
        let base = config.seed.unwrap_or_else(rand::random);
        let restarts = restarts.max(1);
        let attempt = |i: usize| {
            let mut rng = create_rng(base.wrapping_add(i as u64));
            Self::run_with_rng(model, config, ConstraintWeights::new(), &mut rng)
        };

        #[cfg(feature = "parallel")]
        let mut results: Vec<MinConflictsResult<V>> =
            (0..restarts).into_par_iter().map(attempt).collect();

        #[cfg(not(feature = "parallel"))]
        let mut results: Vec<MinConflictsResult<V>> = {
            let mut results = Vec::with_capacity(restarts);
            for i in 0..restarts {
                let result = attempt(i);
                let solved = result.is_solved();
                results.push(result);
                if solved {
                    break;
                }
            }
            results
        };

        let pick = results
            .iter()
            .position(MinConflictsResult::is_solved)
            .unwrap_or(results.len() - 1);
        results.swap_remove(pick)
    }
}

/// Variables with at least one clashing neighbour, in declaration order.
fn conflicted_variables<V: Clone + PartialEq>(model: &CspModel<V>, current: &[usize]) -> Vec<VarId> {
    model
        .variables()
        .filter(|&v| {
            let value = &model.domain(v)[current[v.0]];
            model
                .neighbors(v)
                .iter()
                .any(|&n| !model.consistent(v, value, n, &model.domain(n)[current[n.0]]))
        })
        .collect()
}

/// Clashes `var = domain[idx]` would have, bumping the weight of each.
fn clashes<V: Clone + PartialEq>(
    model: &CspModel<V>,
    current: &[usize],
    var: VarId,
    idx: usize,
    weights: &mut ConstraintWeights,
) -> usize {
    let value = &model.domain(var)[idx];
    let mut count = 0;
    for &n in model.neighbors(var) {
        if !model.consistent(var, value, n, &model.domain(n)[current[n.0]]) {
            weights.record_conflict(var, n);
            count += 1;
        }
    }
    count
}
