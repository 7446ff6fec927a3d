//! Simple temporal problems (STP).
//!
//! Events are time points; each [`DifferenceConstraint`] bounds the
//! difference between two of them. The network is encoded as a distance
//! graph and closed with Floyd–Warshall: a negative cycle proves it
//! inconsistent, otherwise the closed graph yields tightest bounds between
//! every pair and a concrete schedule.
//!
//! # References
//!
//! - Dechter, Meiri & Pearl (1991), "Temporal Constraint Networks"
//! - Floyd (1962), "Algorithm 97: Shortest Path"

mod graph;
mod solver;
mod types;

pub use graph::DistanceGraph;
pub use solver::{StpProblem, StpSolver};
pub use types::{DifferenceConstraint, NegativeCycle, StpSolution};
