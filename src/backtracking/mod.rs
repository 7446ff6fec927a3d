//! Backtracking search for discrete CSPs.
//!
//! Depth-first assignment of one variable at a time with configurable
//! variable selection (first unassigned, MRV, or MRV combined with
//! dom/wdeg), value ordering (domain order or least constraining value)
//! and inference (none, forward checking, or MAC). Conflicts met during
//! the search raise the weights of the constraints involved, steering
//! later selections towards the hardest part of the problem.
//!
//! # References
//!
//! - Golomb & Baumert (1965), "Backtrack Programming"
//! - Sabin & Freuder (1994), "Contradicting Conventional Wisdom in
//!   Constraint Satisfaction" (MAC)
//! - Russell & Norvig, *Artificial Intelligence: A Modern Approach*, ch. 6

mod config;
mod heuristics;
mod inference;
mod runner;

pub use config::{BacktrackingConfig, Inference, ValueOrdering, VariableSelection};
pub use heuristics::{order_values, select_variable};
pub use runner::{BacktrackingResult, BacktrackingRunner, SearchStatus};
