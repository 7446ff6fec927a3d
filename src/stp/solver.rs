//! Entry points for solving temporal networks.

use super::graph::DistanceGraph;
use super::types::{DifferenceConstraint, StpSolution};
use crate::error::{CspError, InvalidProblem};
use std::collections::HashSet;

/// Solves a temporal network given as events and difference constraints.
pub struct StpSolver;

impl StpSolver {
    /// Closes the distance graph and schedules every event relative to the
    /// first one.
    ///
    /// An inconsistent network is not an error here: the returned solution
    /// carries the negative cycle. Use [`StpSolution::into_result`] to turn
    /// it into one.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem`] for duplicate or unknown events and non-finite
    /// weights.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_csp::stp::{DifferenceConstraint, StpSolver};
    ///
    /// let solution = StpSolver::solve(
    ///     &["boil", "brew"],
    ///     &[
    ///         DifferenceConstraint::new("boil", "brew", 5.0),
    ///         DifferenceConstraint::new("brew", "boil", -3.0),
    ///     ],
    /// )
    /// .unwrap();
    /// assert!(solution.consistent);
    /// assert_eq!(solution.offset("brew"), Some(3.0));
    /// ```
    pub fn solve<S: AsRef<str>>(
        events: &[S],
        constraints: &[DifferenceConstraint],
    ) -> Result<StpSolution, CspError> {
        let mut graph = DistanceGraph::new(events, constraints)?;
        Ok(graph.solve())
    }
}

/// Incremental builder for a temporal network.
///
/// # Examples
///
/// ```
/// use u_csp::stp::StpProblem;
///
/// let mut problem = StpProblem::new();
/// problem.add_event("depart").unwrap();
/// problem.add_event("arrive").unwrap();
/// problem.add_interval("depart", "arrive", 30.0, 40.0).unwrap();
///
/// let offsets = problem.solve().unwrap().into_result().unwrap();
/// assert_eq!(offsets[1], ("arrive".to_string(), 30.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StpProblem {
    events: Vec<String>,
    known: HashSet<String>,
    constraints: Vec<DifferenceConstraint>,
}

impl StpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an event.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem::DuplicateEvent`] when already declared.
    pub fn add_event(&mut self, name: impl Into<String>) -> Result<(), CspError> {
        let name = name.into();
        if !self.known.insert(name.clone()) {
            return Err(InvalidProblem::DuplicateEvent(name).into());
        }
        self.events.push(name);
        Ok(())
    }

    /// Adds `time(to) - time(from) <= weight`.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem`] for undeclared events or a non-finite weight.
    pub fn add_constraint(&mut self, from: &str, to: &str, weight: f64) -> Result<(), CspError> {
        self.check_event(from)?;
        self.check_event(to)?;
        if !weight.is_finite() {
            return Err(InvalidProblem::InvalidWeight {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        self.constraints
            .push(DifferenceConstraint::new(from, to, weight));
        Ok(())
    }

    /// Adds `lower <= time(to) - time(from) <= upper`.
    ///
    /// An infinite bound adds no edge.
    ///
    /// # Errors
    ///
    /// [`InvalidProblem`] for undeclared events or a NaN bound.
    pub fn add_interval(
        &mut self,
        from: &str,
        to: &str,
        lower: f64,
        upper: f64,
    ) -> Result<(), CspError> {
        self.check_event(from)?;
        self.check_event(to)?;
        if lower.is_nan() || upper.is_nan() {
            return Err(InvalidProblem::InvalidWeight {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        if upper.is_finite() {
            self.add_constraint(from, to, upper)?;
        }
        if lower.is_finite() {
            self.add_constraint(to, from, -lower)?;
        }
        Ok(())
    }

    fn check_event(&self, name: &str) -> Result<(), CspError> {
        if self.known.contains(name) {
            Ok(())
        } else {
            Err(InvalidProblem::UnknownEvent(name.to_string()).into())
        }
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn constraints(&self) -> &[DifferenceConstraint] {
        &self.constraints
    }

    /// Builds the distance graph, for bound and path queries.
    pub fn graph(&self) -> Result<DistanceGraph, CspError> {
        DistanceGraph::new(&self.events, &self.constraints)
    }

    /// Solves relative to the first declared event.
    pub fn solve(&self) -> Result<StpSolution, CspError> {
        StpSolver::solve(&self.events, &self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commute_intervals() {
        let mut problem = StpProblem::new();
        for event in ["ML", "MA", "EL", "EA"] {
            problem.add_event(event).unwrap();
        }
        problem.add_interval("ML", "MA", 30.0, 40.0).unwrap();
        problem.add_interval("MA", "EA", 15.0, 15.0).unwrap();
        problem.add_interval("EL", "EA", 5.0, 15.0).unwrap();
        assert_eq!(problem.constraints().len(), 6);

        let solution = problem.solve().unwrap();
        assert!(solution.satisfies(problem.constraints()));
        let ea = solution.offset("EA").unwrap();
        assert!((45.0..=55.0).contains(&ea));

        problem.add_constraint("MA", "ML", -50.0).unwrap();
        let err = problem.solve().unwrap().into_result().unwrap_err();
        match err {
            CspError::Inconsistent {
                cycle,
                total_weight,
            } => {
                assert!(total_weight < 0.0);
                assert!(cycle.contains(&"ML".to_string()));
                assert!(cycle.contains(&"MA".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_open_interval() {
        let mut problem = StpProblem::new();
        problem.add_event("A").unwrap();
        problem.add_event("B").unwrap();
        problem
            .add_interval("A", "B", 2.0, f64::INFINITY)
            .unwrap();
        assert_eq!(
            problem.constraints(),
            &[DifferenceConstraint::new("B", "A", -2.0)]
        );
        let graph = problem.graph().unwrap();
        assert_eq!(graph.bounds("A", "B").unwrap(), (2.0, f64::INFINITY));
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        let mut problem = StpProblem::new();
        problem.add_event("A").unwrap();
        assert!(matches!(
            problem.add_event("A"),
            Err(CspError::InvalidProblem(InvalidProblem::DuplicateEvent(_)))
        ));
        assert!(matches!(
            problem.add_constraint("A", "B", 1.0),
            Err(CspError::InvalidProblem(InvalidProblem::UnknownEvent(_)))
        ));
        assert!(matches!(
            problem.add_interval("A", "A", f64::NAN, 1.0),
            Err(CspError::InvalidProblem(InvalidProblem::InvalidWeight { .. }))
        ));
    }

    #[test]
    fn test_solver_rejects_unknown_event() {
        let result = StpSolver::solve(&["A"], &[DifferenceConstraint::new("A", "B", 1.0)]);
        assert!(result.is_err());
    }
}
