//! Constraint reasoning over discrete and temporal problems.
//!
//! Two independent engines share one error type:
//!
//! - **Discrete CSPs**: variables with finite domains and a binary
//!   predicate over neighbouring variables.
//!   - [`ac3`]: standalone arc consistency over arbitrary directed arcs.
//!   - [`backtracking`]: systematic search with MRV, dom/wdeg and LCV
//!     heuristics plus forward checking or MAC.
//!   - [`min_conflicts`]: randomized local repair, optionally with
//!     parallel restarts.
//! - **Simple temporal problems** ([`stp`]): difference constraints
//!   between events, closed into a minimal network or refuted with a
//!   negative cycle.
//!
//! [`csp`] holds the shared model, domain store and conflict weights.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` on configs, statuses, solutions and
//!   temporal types.
//! - `parallel`: min-conflicts restarts run on the rayon thread pool.

pub mod ac3;
pub mod backtracking;
pub mod csp;
pub mod error;
pub mod min_conflicts;
pub mod random;
pub mod stp;

pub use error::{CspError, InvalidProblem};
