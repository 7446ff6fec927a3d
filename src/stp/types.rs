//! Temporal constraint and solution types.

use crate::error::CspError;

/// Tolerance used when checking offsets against constraint weights.
const EPSILON: f64 = 1e-9;

/// `time(to) - time(from) <= weight`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifferenceConstraint {
    /// Event the bound is measured from.
    pub from: String,
    /// Event the bound is measured to.
    pub to: String,
    /// Upper bound on the difference. Finite, possibly negative.
    pub weight: f64,
}

impl DifferenceConstraint {
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }
}

/// A cycle of constraints whose weights sum to a negative value.
///
/// `events` starts and ends with the same event; consecutive events are
/// joined by an input constraint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NegativeCycle {
    pub events: Vec<String>,
    pub total_weight: f64,
}

impl From<NegativeCycle> for CspError {
    fn from(cycle: NegativeCycle) -> Self {
        CspError::Inconsistent {
            cycle: cycle.events,
            total_weight: cycle.total_weight,
        }
    }
}

/// Outcome of solving a temporal network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StpSolution {
    /// Whether any schedule satisfies every constraint.
    pub consistent: bool,

    /// Offset of each event from the reference event, in event order.
    /// Empty when inconsistent.
    pub offsets: Vec<(String, f64)>,

    /// Witness of inconsistency.
    pub negative_cycle: Option<NegativeCycle>,
}

impl StpSolution {
    pub(crate) fn consistent(offsets: Vec<(String, f64)>) -> Self {
        Self {
            consistent: true,
            offsets,
            negative_cycle: None,
        }
    }

    pub(crate) fn inconsistent(cycle: NegativeCycle) -> Self {
        Self {
            consistent: false,
            offsets: Vec::new(),
            negative_cycle: Some(cycle),
        }
    }

    /// Offset of the named event.
    pub fn offset(&self, event: &str) -> Option<f64> {
        self.offsets
            .iter()
            .find(|(name, _)| name == event)
            .map(|&(_, t)| t)
    }

    /// Whether the offsets satisfy every given constraint.
    pub fn satisfies(&self, constraints: &[DifferenceConstraint]) -> bool {
        self.consistent
            && constraints.iter().all(|c| {
                match (self.offset(&c.from), self.offset(&c.to)) {
                    (Some(from), Some(to)) => to - from <= c.weight + EPSILON,
                    _ => false,
                }
            })
    }

    /// Converts into the offsets, or the negative cycle as an error.
    ///
    /// # Errors
    ///
    /// [`CspError::Inconsistent`] when the network has no schedule.
    pub fn into_result(self) -> Result<Vec<(String, f64)>, CspError> {
        match self.negative_cycle {
            Some(cycle) => Err(cycle.into()),
            None => Ok(self.offsets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies() {
        let solution = StpSolution::consistent(vec![("A".into(), 0.0), ("B".into(), 10.0)]);
        assert_eq!(solution.offset("B"), Some(10.0));
        assert!(solution.satisfies(&[DifferenceConstraint::new("A", "B", 10.0)]));
        assert!(!solution.satisfies(&[DifferenceConstraint::new("A", "B", 9.5)]));
        assert!(!solution.satisfies(&[DifferenceConstraint::new("A", "C", 1.0)]));
    }

    #[test]
    fn test_inconsistent_into_result() {
        let cycle = NegativeCycle {
            events: vec!["A".into(), "B".into(), "A".into()],
            total_weight: -3.0,
        };
        let solution = StpSolution::inconsistent(cycle);
        assert!(!solution.satisfies(&[]));
        assert_eq!(
            solution.into_result(),
            Err(CspError::Inconsistent {
                cycle: vec!["A".into(), "B".into(), "A".into()],
                total_weight: -3.0,
            })
        );
    }
}
