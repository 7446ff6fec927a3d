//! Discrete CSP model: named variables, domains, neighbour adjacency and
//! the binary constraint predicate.

use super::solution::Solution;
use crate::error::{CspError, InvalidProblem};
use std::collections::HashMap;
use std::fmt;

/// Dense index of a variable within a model, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub usize);

/// A binary constraint predicate `satisfied(A, a, B, b)`.
///
/// The predicate receives both variable identities so a single predicate
/// can encode every pairwise rule of a problem. It is not assumed to be
/// symmetric, and must be pure: the engines call it lazily, any number of
/// times, in any order.
///
/// Any `Fn(VarId, &V, VarId, &V) -> bool + Send + Sync` closure implements
/// this trait.
pub trait BinaryConstraint<V>: Send + Sync {
    /// Whether `a = x` together with `b = y` is allowed.
    fn satisfied(&self, a: VarId, x: &V, b: VarId, y: &V) -> bool;
}

impl<V, F> BinaryConstraint<V> for F
where
    F: Fn(VarId, &V, VarId, &V) -> bool + Send + Sync,
{
    fn satisfied(&self, a: VarId, x: &V, b: VarId, y: &V) -> bool {
        self(a, x, b, y)
    }
}

/// An immutable CSP definition.
///
/// Built once through [`CspModelBuilder`]; every search run copies the
/// domains into its own [`DomainStore`](super::DomainStore), so a model can
/// be reused across runs (and shared between threads) without leaking state.
///
/// # Examples
///
/// ```
/// use u_csp::csp::CspModel;
///
/// let model = CspModel::builder()
///     .add_variable("A", [1, 2, 3])
///     .add_variable("B", [1, 2, 3])
///     .build(|_, x: &i32, _, y: &i32| x != y)
///     .unwrap();
///
/// let a = model.var("A").unwrap();
/// assert_eq!(model.domain(a), &[1, 2, 3]);
/// assert_eq!(model.neighbors(a).len(), 1);
/// ```
pub struct CspModel<V> {
    names: Vec<String>,
    index: HashMap<String, VarId>,
    domains: Vec<Vec<V>>,
    neighbors: Vec<Vec<VarId>>,
    constraint: Box<dyn BinaryConstraint<V>>,
}

impl<V: fmt::Debug> fmt::Debug for CspModel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CspModel")
            .field("names", &self.names)
            .field("domains", &self.domains)
            .field("neighbors", &self.neighbors)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + PartialEq> CspModel<V> {
    /// Starts building a model.
    pub fn builder() -> CspModelBuilder<V> {
        CspModelBuilder::new()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the model has no variables.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.names.len()).map(VarId)
    }

    /// Looks a variable up by name.
    pub fn var(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    /// Name of a variable.
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.0]
    }

    /// All variable names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Initial domain of a variable.
    pub fn domain(&self, var: VarId) -> &[V] {
        &self.domains[var.0]
    }

    /// Initial domains of all variables.
    pub fn domains(&self) -> &[Vec<V>] {
        &self.domains
    }

    /// Variables sharing a constraint with `var`, in declaration order.
    pub fn neighbors(&self, var: VarId) -> &[VarId] {
        &self.neighbors[var.0]
    }

    /// Raw predicate call in the given orientation.
    pub fn satisfied(&self, a: VarId, x: &V, b: VarId, y: &V) -> bool {
        self.constraint.satisfied(a, x, b, y)
    }

    /// Whether `a = x` and `b = y` are compatible in both orientations.
    pub fn consistent(&self, a: VarId, x: &V, b: VarId, y: &V) -> bool {
        self.constraint.satisfied(a, x, b, y) && self.constraint.satisfied(b, y, a, x)
    }

    /// Counts violated neighbour pairs in a complete assignment given as
    /// one value per variable, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than the number of variables. Use
    /// [`CspModel::is_solution`] for assignments of unchecked length.
    pub fn count_conflicts(&self, values: &[V]) -> usize {
        let mut count = 0;
        for a in self.variables() {
            for &b in self.neighbors(a) {
                if a < b && !self.consistent(a, &values[a.0], b, &values[b.0]) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Whether `values` is a complete assignment violating no constraint.
    pub fn is_solution(&self, values: &[V]) -> bool {
        values.len() == self.len() && self.count_conflicts(values) == 0
    }

    /// Converts per-variable indices into the initial domains to a solution.
    pub(crate) fn solution_from_indices(&self, indices: &[usize]) -> Solution<V> {
        let values = indices
            .iter()
            .enumerate()
            .map(|(var, &idx)| self.domains[var][idx].clone())
            .collect();
        Solution::new(self.names.clone(), values)
    }
}

/// Builder for [`CspModel`].
///
/// Neighbour pairs are undirected. When none are declared the model uses the
/// complete graph, every variable neighbouring every other one. Pairs of a
/// variable with itself are ignored: unary restrictions belong in the domain.
#[derive(Debug, Clone)]
pub struct CspModelBuilder<V> {
    names: Vec<String>,
    domains: Vec<Vec<V>>,
    pairs: Vec<(String, String)>,
}

impl<V: Clone + PartialEq> Default for CspModelBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq> CspModelBuilder<V> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            domains: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Declares a variable and its candidate values.
    ///
    /// Repeated values are collapsed, keeping the first occurrence.
    pub fn add_variable(
        mut self,
        name: impl Into<String>,
        domain: impl IntoIterator<Item = V>,
    ) -> Self {
        let mut values: Vec<V> = Vec::new();
        for v in domain {
            if !values.contains(&v) {
                values.push(v);
            }
        }
        self.names.push(name.into());
        self.domains.push(values);
        self
    }

    /// Declares that two variables share a constraint.
    pub fn add_neighbors(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.pairs.push((a.into(), b.into()));
        self
    }

    /// Validates the definition and builds the model around a predicate
    /// closure.
    ///
    /// # Errors
    ///
    /// [`CspError::InvalidProblem`] for duplicate names, empty domains, or
    /// neighbour pairs naming an undeclared variable.
    pub fn build<F>(self, predicate: F) -> Result<CspModel<V>, CspError>
    where
        F: Fn(VarId, &V, VarId, &V) -> bool + Send + Sync + 'static,
    {
        self.build_with(predicate)
    }

    /// Like [`build`](Self::build), for any [`BinaryConstraint`] implementor.
    pub fn build_with<C>(self, constraint: C) -> Result<CspModel<V>, CspError>
    where
        C: BinaryConstraint<V> + 'static,
    {
        let mut index = HashMap::with_capacity(self.names.len());
        for (i, name) in self.names.iter().enumerate() {
            if index.insert(name.clone(), VarId(i)).is_some() {
                return Err(InvalidProblem::DuplicateVariable(name.clone()).into());
            }
            if self.domains[i].is_empty() {
                return Err(InvalidProblem::EmptyDomain(name.clone()).into());
            }
        }

        let n = self.names.len();
        let mut adjacent = vec![vec![false; n]; n];
        if self.pairs.is_empty() {
            for (a, row) in adjacent.iter_mut().enumerate() {
                for (b, cell) in row.iter_mut().enumerate() {
                    *cell = a != b;
                }
            }
        } else {
            for (a, b) in &self.pairs {
                let ia = lookup(&index, a)?;
                let ib = lookup(&index, b)?;
                if ia != ib {
                    adjacent[ia.0][ib.0] = true;
                    adjacent[ib.0][ia.0] = true;
                }
            }
        }

        let neighbors = adjacent
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &on)| on)
                    .map(|(b, _)| VarId(b))
                    .collect()
            })
            .collect();

        Ok(CspModel {
            names: self.names,
            index,
            domains: self.domains,
            neighbors,
            constraint: Box::new(constraint),
        })
    }
}

fn lookup(index: &HashMap<String, VarId>, name: &str) -> Result<VarId, CspError> {
    index
        .get(name)
        .copied()
        .ok_or_else(|| InvalidProblem::UnknownVariable(name.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn different(_: VarId, x: &i32, _: VarId, y: &i32) -> bool {
        x != y
    }

    #[test]
    fn test_default_neighbors_complete_graph() {
        let model = CspModel::builder()
            .add_variable("A", [1, 2])
            .add_variable("B", [1, 2])
            .add_variable("C", [1, 2])
            .build(different)
            .unwrap();

        assert_eq!(model.neighbors(VarId(0)), &[VarId(1), VarId(2)]);
        assert_eq!(model.neighbors(VarId(1)), &[VarId(0), VarId(2)]);
        assert_eq!(model.neighbors(VarId(2)), &[VarId(0), VarId(1)]);
    }

    #[test]
    fn test_explicit_neighbors_are_symmetric_and_sorted() {
        let model = CspModel::builder()
            .add_variable("A", [1, 2])
            .add_variable("B", [1, 2])
            .add_variable("C", [1, 2])
            .add_neighbors("C", "A")
            .add_neighbors("A", "C")
            .add_neighbors("B", "B")
            .build(different)
            .unwrap();

        assert_eq!(model.neighbors(VarId(0)), &[VarId(2)]);
        assert!(model.neighbors(VarId(1)).is_empty());
        assert_eq!(model.neighbors(VarId(2)), &[VarId(0)]);
    }

    #[test]
    fn test_domain_duplicates_collapsed() {
        let model = CspModel::builder()
            .add_variable("A", [3, 1, 3, 2, 1])
            .build(different)
            .unwrap();
        assert_eq!(model.domain(VarId(0)), &[3, 1, 2]);
    }

    #[test]
    fn test_empty_domain_rejected() {
        let err = CspModel::builder()
            .add_variable("A", [1])
            .add_variable("B", Vec::<i32>::new())
            .build(different)
            .unwrap_err();
        assert_eq!(
            err,
            CspError::InvalidProblem(InvalidProblem::EmptyDomain("B".into()))
        );
    }

    #[test]
    fn test_unknown_neighbor_rejected() {
        let err = CspModel::builder()
            .add_variable("A", [1])
            .add_neighbors("A", "Z")
            .build(different)
            .unwrap_err();
        assert_eq!(
            err,
            CspError::InvalidProblem(InvalidProblem::UnknownVariable("Z".into()))
        );
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let err = CspModel::builder()
            .add_variable("A", [1])
            .add_variable("A", [2])
            .build(different)
            .unwrap_err();
        assert_eq!(
            err,
            CspError::InvalidProblem(InvalidProblem::DuplicateVariable("A".into()))
        );
    }

    #[test]
    fn test_consistent_checks_both_orientations() {
        // Only "A before B" is meaningful; the reverse call must agree.
        let model = CspModel::builder()
            .add_variable("A", [1, 2])
            .add_variable("B", [1, 2])
            .build(|a: VarId, x: &i32, _b: VarId, y: &i32| {
                if a == VarId(0) {
                    x < y
                } else {
                    y < x
                }
            })
            .unwrap();

        assert!(model.consistent(VarId(0), &1, VarId(1), &2));
        assert!(model.consistent(VarId(1), &2, VarId(0), &1));
        assert!(!model.consistent(VarId(0), &2, VarId(1), &1));
    }

    #[test]
    fn test_count_conflicts() {
        let model = CspModel::builder()
            .add_variable("A", [1, 2])
            .add_variable("B", [1, 2])
            .add_variable("C", [1, 2])
            .build(different)
            .unwrap();

        assert_eq!(model.count_conflicts(&[1, 1, 1]), 3);
        assert_eq!(model.count_conflicts(&[1, 2, 1]), 1);
        assert!(!model.is_solution(&[1, 2]));
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_count_conflicts_short_assignment_panics() {
        let model = CspModel::builder()
            .add_variable("A", [1, 2])
            .add_variable("B", [1, 2])
            .build(different)
            .unwrap();

        model.count_conflicts(&[1]);
    }
}
