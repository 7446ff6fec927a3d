//! Discrete CSP building blocks.
//!
//! - [`CspModel`]: immutable problem definition (variables, domains,
//!   neighbour adjacency, binary predicate), built with [`CspModelBuilder`].
//! - [`DomainStore`]: per-run mutable domains with an undo log.
//! - [`ConstraintWeights`]: conflict counters shared by dom/wdeg and
//!   min-conflicts.
//! - [`Solution`]: a complete assignment handed back to callers.

mod domain;
mod model;
mod solution;
mod weights;

pub use domain::{DomainExhausted, DomainStore};
pub use model::{BinaryConstraint, CspModel, CspModelBuilder, VarId};
pub use solution::Solution;
pub use weights::{ConstraintWeights, INITIAL_WEIGHT};
