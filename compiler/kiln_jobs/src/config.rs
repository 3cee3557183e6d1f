//! Scheduler configuration.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use crate::error::JobError;

/// Environment variable overriding [`JobConfig::max_parallel`].
pub const JOBS_VAR: &str = "KILN_JOBS";

/// Limits and defaults applied to every job of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobConfig {
    max_parallel: usize,
    poll_interval: Duration,
    inherit: Vec<String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            max_parallel: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            poll_interval: Duration::from_millis(20),
            inherit: vec!["PATH".to_string()],
        }
    }
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `KILN_JOBS` from the process environment applied.
    pub fn from_env() -> Result<Self, JobError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults, with overrides read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, JobError> {
        let mut config = Self::default();
        if let Some(value) = lookup(JOBS_VAR) {
            let jobs = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(JobError::InvalidConfig {
                    var: JOBS_VAR,
                    value,
                })?;
            config.max_parallel = jobs;
        }
        Ok(config)
    }

    /// Maximum number of processes running at once (at least 1).
    #[must_use]
    pub fn max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = n.max(1);
        self
    }

    /// How often a waiting worker checks its child for exit or a kill
    /// request.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Host variables copied into every job's environment before the job's
    /// own entries.
    #[must_use]
    pub fn inherit(mut self, vars: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inherit = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn parallelism(&self) -> usize {
        self.max_parallel
    }

    pub fn interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn inherited(&self) -> &[String] {
        &self.inherit
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_lookup_overrides_parallelism() {
        let config = JobConfig::from_lookup(|var| (var == JOBS_VAR).then(|| "3".to_string()));
        assert_eq!(config.map(|c| c.parallelism()).ok(), Some(3));
    }

    #[test]
    fn test_missing_variable_keeps_default() {
        let config = JobConfig::from_lookup(|_| None).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config, JobConfig::default());
        assert!(config.parallelism() >= 1);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for bad in ["0", "-2", "many"] {
            let err = JobConfig::from_lookup(|_| Some(bad.to_string()));
            let rejected = matches!(
                err,
                Err(JobError::InvalidConfig { var: JOBS_VAR, ref value }) if value == bad
            );
            assert!(rejected, "{bad}");
        }
    }

    #[test]
    fn test_builder_setters() {
        let config = JobConfig::new()
            .max_parallel(0)
            .poll_interval(Duration::from_millis(1))
            .inherit(["PATH", "HOME"]);
        assert_eq!(config.parallelism(), 1);
        assert_eq!(config.interval(), Duration::from_millis(1));
        assert_eq!(config.inherited(), ["PATH".to_string(), "HOME".to_string()]);
    }
}
