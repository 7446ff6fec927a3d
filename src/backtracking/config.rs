//! Backtracking configuration.

use std::time::Duration;

/// Pruning performed after each tentative assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inference {
    /// No pruning; only the check against already assigned neighbours.
    None,
    /// Remove values of unassigned neighbours that clash with the new value.
    #[default]
    ForwardChecking,
    /// Forward checking followed by arc-consistency propagation from the
    /// pruned neighbours (MAC).
    Mac,
}

/// How the next variable to branch on is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableSelection {
    /// Declaration order.
    FirstUnassigned,
    /// Minimum remaining values.
    Mrv,
    /// Normalised MRV score plus normalised dom/wdeg score, lowest first.
    #[default]
    Combined,
}

/// Order in which a variable's candidate values are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueOrdering {
    /// Domain order as declared.
    #[default]
    DomainOrder,
    /// Values ruling out the fewest neighbour values first.
    LeastConstraining,
}

/// Configuration for [`BacktrackingRunner`](super::BacktrackingRunner).
///
/// # Examples
///
/// ```
/// use u_csp::backtracking::{BacktrackingConfig, Inference, ValueOrdering};
///
/// let config = BacktrackingConfig::default()
///     .with_inference(Inference::Mac)
///     .with_value_ordering(ValueOrdering::LeastConstraining)
///     .with_max_steps(10_000);
/// assert_eq!(config.inference, Inference::Mac);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktrackingConfig {
    /// Variable selection heuristic.
    pub variable_selection: VariableSelection,

    /// Value ordering heuristic.
    pub value_ordering: ValueOrdering,

    /// Inference run after each tentative assignment.
    pub inference: Inference,

    /// Maximum number of search frames entered. 0 = no limit.
    pub max_steps: usize,

    /// Wall-clock budget, checked whenever a frame is entered.
    pub time_limit: Option<Duration>,
}

impl Default for BacktrackingConfig {
    fn default() -> Self {
        Self {
            variable_selection: VariableSelection::default(),
            value_ordering: ValueOrdering::default(),
            inference: Inference::default(),
            max_steps: 0,
            time_limit: None,
        }
    }
}

impl BacktrackingConfig {
    /// Sets the variable selection heuristic.
    pub fn with_variable_selection(mut self, selection: VariableSelection) -> Self {
        self.variable_selection = selection;
        self
    }

    /// Sets the order in which values are tried.
    pub fn with_value_ordering(mut self, ordering: ValueOrdering) -> Self {
        self.value_ordering = ordering;
        self
    }

    /// Sets the propagation run after each assignment.
    pub fn with_inference(mut self, inference: Inference) -> Self {
        self.inference = inference;
        self
    }

    /// Sets the search frame budget. 0 = no limit.
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}
