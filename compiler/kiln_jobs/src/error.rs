//! Scheduler errors.
//!
//! These are host-side configuration and bookkeeping errors. A job that
//! runs and fails is not an error here: it is delivered to the program as
//! a `Fail` value.

use crate::table::JobId;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job has an empty command line")]
    EmptyCommand,

    #[error("environment entry `{0}` is not of the form KEY=VALUE")]
    InvalidEnv(String),

    #[error("invalid value `{value}` for {var}")]
    InvalidConfig { var: &'static str, value: String },

    #[error("unknown job {0}")]
    UnknownJob(JobId),

    #[error("job {0} already delivered its result")]
    AlreadyDelivered(JobId),

    #[error("job {0} is run by the process launcher and reports its own result")]
    ProcessManaged(JobId),

    #[error("job {0} has not exited")]
    NotExited(JobId),

    #[error("could not start worker for job {id}: {source}")]
    Worker {
        id: JobId,
        #[source]
        source: std::io::Error,
    },
}
