//! Error types shared by the discrete and temporal engines.

use thiserror::Error;

/// Why a problem definition was rejected before any search started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidProblem {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),
    #[error("variable `{0}` has an empty domain")]
    EmptyDomain(String),
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("event `{0}` is declared more than once")]
    DuplicateEvent(String),
    #[error("constraint `{from}` -> `{to}` has a non-finite weight")]
    InvalidWeight { from: String, to: String },
}

/// Errors reported by the engines.
///
/// Runners report their outcome through explicit status values; these
/// variants are what those statuses turn into when a caller asks for a
/// `Result` (see `into_solution` / `into_result`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CspError {
    #[error("invalid problem: {0}")]
    InvalidProblem(#[from] InvalidProblem),

    #[error("domain of `{variable}` was exhausted during propagation")]
    DomainExhausted { variable: String },

    #[error("temporal network is inconsistent: negative cycle {cycle:?} (total weight {total_weight})")]
    Inconsistent {
        cycle: Vec<String>,
        total_weight: f64,
    },

    #[error("search exhausted every branch without finding a solution")]
    SearchExhausted,

    #[error("step budget of {steps} exhausted without reaching a solution")]
    StepBudgetExceeded { steps: usize },

    #[error("search was interrupted before completion")]
    Interrupted,
}
