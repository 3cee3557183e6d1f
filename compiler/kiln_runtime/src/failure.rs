//! Recoverable failures.
//!
//! Every failure a program can observe - wrong arity, wrong argument type,
//! a failed precondition, a failed build job - is delivered as an ordinary
//! value through the same channel as success. `Failure` is the `Send`
//! description of one; `make_failure` turns it into the canonical
//! `Fail(Error(cause, stack))` shape on the evaluator thread.

use std::fmt;

use crate::binding::Binding;
use crate::value::ValueKind;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FailureCause {
    /// Argument count mismatch at a primitive call site.
    #[error("{prim} expects {expected} arguments, got {got}")]
    Arity {
        prim: String,
        expected: usize,
        got: usize,
    },

    /// An argument did not narrow to the variant a primitive requires.
    #[error("{prim}: argument {position} expected {expected}, got {got}")]
    Type {
        prim: String,
        position: usize,
        expected: ValueKind,
        got: ValueKind,
    },

    /// A primitive-specific precondition was false.
    #[error("{prim}: {message}")]
    Require { prim: String, message: String },

    /// An external build step exited non-zero, failed to start or was killed.
    #[error("job `{command}` {reason}")]
    Job {
        command: String,
        reason: String,
        diagnostics: String,
    },

    /// A result promised by external work was never delivered.
    #[error("result abandoned before delivery: {0}")]
    Abandoned(String),

    /// Raised explicitly by the program.
    #[error("{0}")]
    Raised(String),
}

/// A failure plus the call chain it is attributed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub cause: FailureCause,
    /// Call sites, innermost first.
    pub stack: Vec<String>,
}

impl Failure {
    /// Attribute `cause` to the chain in `binding`.
    pub fn new(cause: FailureCause, binding: &Binding) -> Self {
        Failure {
            cause,
            stack: binding.stack(),
        }
    }

    /// A failure with an explicit stack snapshot.
    pub fn with_stack(cause: FailureCause, stack: Vec<String>) -> Self {
        Failure { cause, stack }
    }

    /// The cause text stored in the `Error` value.
    ///
    /// Job failures append the captured diagnostics on following lines.
    pub fn message(&self) -> String {
        match &self.cause {
            FailureCause::Job { diagnostics, .. } if !diagnostics.is_empty() => {
                format!("{}\n{}", self.cause, diagnostics.trim_end())
            }
            cause => cause.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())?;
        for site in &self.stack {
            write!(f, "\n  at {site}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arity_message() {
        let cause = FailureCause::Arity {
            prim: "iadd".to_string(),
            expected: 2,
            got: 3,
        };
        assert_eq!(cause.to_string(), "iadd expects 2 arguments, got 3");
    }

    #[test]
    fn type_message_names_expected_variant() {
        let cause = FailureCause::Type {
            prim: "iadd".to_string(),
            position: 0,
            expected: ValueKind::Integer,
            got: ValueKind::String,
        };
        assert_eq!(
            cause.to_string(),
            "iadd: argument 0 expected Integer, got String"
        );
    }

    #[test]
    fn job_message_includes_diagnostics() {
        let failure = Failure::with_stack(
            FailureCause::Job {
                command: "cc -c x.c".to_string(),
                reason: "exited with status 1".to_string(),
                diagnostics: "x.c:1: error\n".to_string(),
            },
            vec![],
        );
        assert_eq!(
            failure.message(),
            "job `cc -c x.c` exited with status 1\nx.c:1: error"
        );
    }

    #[test]
    fn display_appends_stack() {
        let binding = Binding::root().call("main").call("helper");
        let failure = Failure::new(FailureCause::Raised("boom".to_string()), &binding);
        assert_eq!(failure.to_string(), "boom\n  at helper\n  at main");
    }
}
