//! Min-conflicts local repair.
//!
//! Starts from a complete random assignment and repeatedly reassigns a
//! conflicted variable to the value that clashes with the fewest
//! neighbours. Incomplete: a run either finds a solution or gives up after
//! its step budget.
//!
//! # References
//!
//! - Minton, Johnston, Philips & Laird (1992), "Minimizing conflicts: a
//!   heuristic repair method for constraint satisfaction and scheduling
//!   problems"

mod config;
mod runner;

pub use config::MinConflictsConfig;
pub use runner::{MinConflictsResult, MinConflictsRunner, MinConflictsStatus};
