//! Min-conflicts configuration.

/// Configuration parameters for min-conflicts local repair.
///
/// # Examples
///
/// ```
/// use u_csp::min_conflicts::MinConflictsConfig;
///
/// let config = MinConflictsConfig::default()
///     .with_max_steps(5_000)
///     .with_seed(42);
/// assert_eq!(config.max_steps, 5_000);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinConflictsConfig {
    /// Maximum number of repair steps.
    pub max_steps: usize,
    /// Random seed (None for random).
    pub seed: Option<u64>,
}

impl Default for MinConflictsConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            seed: None,
        }
    }
}

impl MinConflictsConfig {
    /// Sets the maximum number of repair steps.
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MinConflictsConfig::default();
        assert_eq!(config.max_steps, 1000);
        assert!(config.seed.is_none());
    }
}
