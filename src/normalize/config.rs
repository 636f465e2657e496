//! Normalizer configuration.

/// Configuration for [`Normalizer`](super::Normalizer).
///
/// # Examples
///
/// ```
/// use u_prereq::normalize::NormalizerConfig;
///
/// let config = NormalizerConfig::default()
///     .with_default_authority("Department")
///     .with_advisory_trigger("see advisor")
///     .with_parallel(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Authority recorded for permission phrasing that names nobody
    /// ("permission required").
    pub default_authority: String,

    /// Whether a bare course number ("1020") takes the subject of the
    /// nearest preceding course code.
    ///
    /// When disabled, bare numbers fall back to `OTHER`.
    pub inherit_subject: bool,

    /// Whether input that is already a requirement JSON document is accepted
    /// as-is instead of being parsed as prose.
    pub accept_json: bool,

    /// Extra phrases that start non-gating advisory text. Matching is
    /// case-insensitive; everything from the phrase onward is dropped.
    pub advisory_triggers: Vec<String>,

    /// Whether batch normalization runs in parallel using rayon.
    pub parallel: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_authority: String::from("Instructor"),
            inherit_subject: true,
            accept_json: true,
            advisory_triggers: Vec::new(),
            parallel: false,
        }
    }
}

impl NormalizerConfig {
    pub fn with_default_authority(mut self, authority: impl Into<String>) -> Self {
        self.default_authority = authority.into();
        self
    }

    pub fn with_inherit_subject(mut self, inherit: bool) -> Self {
        self.inherit_subject = inherit;
        self
    }

    pub fn with_accept_json(mut self, accept: bool) -> Self {
        self.accept_json = accept;
        self
    }

    pub fn with_advisory_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.advisory_triggers.push(trigger.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_authority.trim().is_empty() {
            return Err("default_authority must not be empty".into());
        }
        if let Some(i) = self
            .advisory_triggers
            .iter()
            .position(|t| t.trim().is_empty())
        {
            return Err(format!("advisory_triggers[{i}] must not be empty"));
        }
        Ok(())
    }
}
