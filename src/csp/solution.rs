//! Complete assignments returned to callers.

use super::model::VarId;
use std::collections::HashMap;

/// A complete assignment, one value per variable in declaration order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution<V> {
    names: Vec<String>,
    values: Vec<V>,
}

impl<V> Solution<V> {
    pub(crate) fn new(names: Vec<String>, values: Vec<V>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the assignment is empty (a model without variables).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value assigned to the named variable.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Value assigned to `var`.
    pub fn value(&self, var: VarId) -> &V {
        &self.values[var.0]
    }

    /// All values in declaration order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Converts into a name-to-value map.
    pub fn into_map(self) -> HashMap<String, V> {
        self.names.into_iter().zip(self.values).collect()
    }
}
