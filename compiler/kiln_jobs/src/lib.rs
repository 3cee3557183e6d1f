//! Kiln Jobs - build job scheduling for the Kiln build runtime.
//!
//! External build steps run as OS processes, concurrently and off the
//! evaluator thread. The [`JobTable`] tracks each job from submission to
//! delivery and hands its result back to the evaluator through an inbox
//! [`Promise`](kiln_runtime::Promise), so the program sees a job as one
//! more future that resolves to `Pass stdout` or `Fail`.
//!
//! # Launchers
//!
//! - [`Launcher::Process`]: worker thread per job, bounded by
//!   [`JobConfig::max_parallel`] running processes
//! - [`Launcher::Manual`]: nothing is started; the host reports each
//!   result with [`JobTable::on_complete`]

mod config;
mod error;
mod launcher;
mod prim;
mod process;
mod semaphore;
mod spec;
mod table;

pub use config::{JobConfig, JOBS_VAR};
pub use error::JobError;
pub use launcher::Launcher;
pub use prim::register_job;
pub use spec::JobSpec;
pub use table::{JobId, JobState, JobTable, Outcome};
