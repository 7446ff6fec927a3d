//! Arc consistency (AC-3).
//!
//! Standalone propagation over named domains and a list of directed arcs,
//! each carrying its own value predicate. Backtracking search reuses the
//! same revision step for maintaining arc consistency.
//!
//! # References
//!
//! - Mackworth (1977), "Consistency in Networks of Relations"
//! - Russell & Norvig, *Artificial Intelligence: A Modern Approach*, ch. 6

mod runner;
mod types;

pub(crate) use runner::revise;
pub use runner::{Ac3Result, Ac3Runner, Removal};
pub use types::{Ac3Problem, ConstraintArc};
