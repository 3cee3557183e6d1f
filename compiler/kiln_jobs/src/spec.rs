//! Job descriptions.

use std::fmt;

use crate::error::JobError;

/// One external build step: what to run, where, with what input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobSpec {
    command: Vec<String>,
    env: Vec<String>,
    dir: String,
    stdin: String,
}

impl JobSpec {
    /// A job running `command` (program followed by its arguments).
    pub fn new(command: impl IntoIterator<Item = impl Into<String>>) -> Self {
        JobSpec {
            command: command.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// `KEY=VALUE` entries for the job environment.
    #[must_use]
    pub fn env(mut self, env: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.env = env.into_iter().map(Into::into).collect();
        self
    }

    /// Working directory. Empty means the host's current directory.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Bytes written to the job's standard input.
    #[must_use]
    pub fn stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn working_dir(&self) -> &str {
        &self.dir
    }

    pub fn input(&self) -> &str {
        &self.stdin
    }

    /// The environment as `(key, value)` pairs.
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().filter_map(|entry| entry.split_once('='))
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.command.first().map_or(true, String::is_empty) {
            return Err(JobError::EmptyCommand);
        }
        if let Some(bad) = self
            .env
            .iter()
            .find(|entry| !matches!(entry.split_once('='), Some((key, _)) if !key.is_empty()))
        {
            return Err(JobError::InvalidEnv(bad.clone()));
        }
        Ok(())
    }

    /// The command line as a shell would show it.
    pub fn display_command(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.command.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, "'{}'", arg.replace('\'', r"'\''"))?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display_quotes_whitespace() {
        let spec = JobSpec::new(["sh", "-c", "echo hi", ""]);
        assert_eq!(spec.display_command(), "sh -c 'echo hi' ''");
    }

    #[test]
    fn test_validate() {
        assert!(JobSpec::new(["cc", "-c"]).validate().is_ok());
        assert!(matches!(
            JobSpec::new(Vec::<String>::new()).validate(),
            Err(JobError::EmptyCommand)
        ));
        assert!(matches!(
            JobSpec::new([""]).validate(),
            Err(JobError::EmptyCommand)
        ));
        assert!(matches!(
            JobSpec::new(["cc"]).env(["A=1", "=2"]).validate(),
            Err(JobError::InvalidEnv(entry)) if entry == "=2"
        ));
    }

    #[test]
    fn test_env_pairs_split_on_first_equals() {
        let spec = JobSpec::new(["env"]).env(["A=1", "B=x=y"]);
        assert_eq!(spec.env_pairs().collect::<Vec<_>>(), vec![("A", "1"), ("B", "x=y")]);
    }
}
