//! AC-3 problem definition: named domains plus directed arcs.

use crate::csp::VarId;
use crate::error::{CspError, InvalidProblem};
use std::collections::HashMap;
use std::fmt;

/// A directed arc `(source, target)`: prune `source` using `target`.
///
/// A value `x` of `source` is supported when some value `y` of `target`
/// makes `predicate(x, y)` true.
pub struct ConstraintArc<V> {
    /// Variable whose domain is revised.
    pub source: VarId,
    /// Variable providing support.
    pub target: VarId,
    predicate: Box<dyn Fn(&V, &V) -> bool + Send + Sync>,
}

impl<V> ConstraintArc<V> {
    /// Whether `source = x` is supported by `target = y`.
    pub fn supports(&self, x: &V, y: &V) -> bool {
        (self.predicate)(x, y)
    }

    /// Whether the arc prunes a variable against itself.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl<V> fmt::Debug for ConstraintArc<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintArc")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Variables, domains and arcs for a standalone arc-consistency pass.
///
/// # Examples
///
/// ```
/// use u_csp::ac3::{Ac3Problem, Ac3Runner};
///
/// let mut problem = Ac3Problem::new();
/// problem.add_variable("A", [1, 2, 3]).unwrap();
/// problem.add_variable("B", [1, 2, 3]).unwrap();
/// problem.add_arc("A", "B", |a: &i32, b: &i32| a < b).unwrap();
///
/// let result = Ac3Runner::run(&problem).unwrap();
/// assert_eq!(result.domain("A"), Some(&[1, 2][..]));
/// assert_eq!(result.domain("B"), Some(&[1, 2, 3][..]));
/// ```
pub struct Ac3Problem<V> {
    names: Vec<String>,
    index: HashMap<String, VarId>,
    domains: Vec<Vec<V>>,
    arcs: Vec<ConstraintArc<V>>,
}

impl<V: fmt::Debug> fmt::Debug for Ac3Problem<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ac3Problem")
            .field("names", &self.names)
            .field("domains", &self.domains)
            .field("arcs", &self.arcs)
            .finish()
    }
}

impl<V: Clone + PartialEq> Default for Ac3Problem<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq> Ac3Problem<V> {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            index: HashMap::new(),
            domains: Vec::new(),
            arcs: Vec::new(),
        }
    }

    /// Declares a variable. Repeated values are collapsed.
    ///
    /// # Errors
    ///
    /// Duplicate names and empty domains are rejected.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain: impl IntoIterator<Item = V>,
    ) -> Result<VarId, CspError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(InvalidProblem::DuplicateVariable(name).into());
        }
        let mut values: Vec<V> = Vec::new();
        for v in domain {
            if !values.contains(&v) {
                values.push(v);
            }
        }
        if values.is_empty() {
            return Err(InvalidProblem::EmptyDomain(name).into());
        }
        let id = VarId(self.names.len());
        self.index.insert(name.clone(), id);
        self.names.push(name);
        self.domains.push(values);
        Ok(id)
    }

    /// Adds the arc `(source, target)` with its predicate.
    ///
    /// # Errors
    ///
    /// Either endpoint naming an undeclared variable.
    pub fn add_arc<F>(&mut self, source: &str, target: &str, predicate: F) -> Result<(), CspError>
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        let source = self.require(source)?;
        let target = self.require(target)?;
        self.arcs.push(ConstraintArc {
            source,
            target,
            predicate: Box::new(predicate),
        });
        Ok(())
    }

    fn require(&self, name: &str) -> Result<VarId, CspError> {
        self.var(name)
            .ok_or_else(|| InvalidProblem::UnknownVariable(name.to_string()).into())
    }

    /// Looks a variable up by name.
    pub fn var(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    /// Name of a variable.
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.0]
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Initial domain of a variable.
    pub fn domain(&self, var: VarId) -> &[V] {
        &self.domains[var.0]
    }

    pub(crate) fn domains(&self) -> &[Vec<V>] {
        &self.domains
    }

    /// Arcs in insertion order.
    pub fn arcs(&self) -> &[ConstraintArc<V>] {
        &self.arcs
    }

    /// For every variable, the indices of the arcs whose target it is.
    pub(crate) fn incoming(&self) -> Vec<Vec<usize>> {
        let mut incoming = vec![Vec::new(); self.names.len()];
        for (i, arc) in self.arcs.iter().enumerate() {
            incoming[arc.target.0].push(i);
        }
        incoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_arc_unknown_variable() {
        let mut p = Ac3Problem::new();
        p.add_variable("A", [1, 2]).unwrap();
        let err = p.add_arc("A", "B", |a: &i32, b: &i32| a < b).unwrap_err();
        assert_eq!(
            err,
            CspError::InvalidProblem(InvalidProblem::UnknownVariable("B".into()))
        );
        assert!(p.arcs().is_empty());
    }

    #[test]
    fn test_add_variable_validation() {
        let mut p: Ac3Problem<i32> = Ac3Problem::new();
        assert_eq!(p.add_variable("A", [1]).unwrap(), VarId(0));
        assert!(p.add_variable("A", [2]).is_err());
        assert!(p.add_variable("B", []).is_err());
        assert_eq!(p.names(), &["A".to_string()]);
    }

    #[test]
    fn test_incoming_index() {
        let mut p = Ac3Problem::new();
        p.add_variable("A", [1]).unwrap();
        p.add_variable("B", [1]).unwrap();
        p.add_arc("A", "B", |a: &i32, b: &i32| a == b).unwrap();
        p.add_arc("B", "A", |a: &i32, b: &i32| a == b).unwrap();
        p.add_arc("A", "A", |a: &i32, b: &i32| a == b).unwrap();

        let incoming = p.incoming();
        assert_eq!(incoming[0], vec![1, 2]);
        assert_eq!(incoming[1], vec![0]);
        assert!(p.arcs()[2].is_self_loop());
    }
}
