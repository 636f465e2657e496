//! Chain evaluation configuration.

/// How an `OR` node contributes to the chain length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrPolicy {
    /// The student takes the shortest alternative (best case).
    #[default]
    Shortest,

    /// The student takes the longest alternative (worst case).
    Longest,
}

/// Configuration for [`ChainRunner`](super::ChainRunner).
///
/// # Examples
///
/// ```
/// use u_prereq::chain::{ChainConfig, OrPolicy};
///
/// let config = ChainConfig::default()
///     .with_or_policy(OrPolicy::Longest)
///     .with_max_depth(64)
///     .with_parallel(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Policy for `OR` nodes.
    pub or_policy: OrPolicy,

    /// Maximum number of nested courses followed from the target. Deeper
    /// branches are cut off and the result is marked truncated.
    pub max_depth: usize,

    /// Whether batch evaluation runs in parallel using rayon.
    pub parallel: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            or_policy: OrPolicy::Shortest,
            max_depth: 256,
            parallel: false,
        }
    }
}

impl ChainConfig {
    pub fn with_or_policy(mut self, policy: OrPolicy) -> Self {
        self.or_policy = policy;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be at least 1".into());
        }
        Ok(())
    }
}
