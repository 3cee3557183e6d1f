//! The job table: every submitted job, its state, and the promise its
//! result is delivered through.
//!
//! A job moves `Queued -> Running -> Exited -> Delivered`, or straight
//! from `Queued` to `Delivered` when it is killed before it starts. Delivery
//! happens exactly once per job, whatever the outcome: a clean exit
//! passes stdout, anything else (non-zero status, signal, spawn failure,
//! kill) fails with the job's stderr and the call stack that submitted it.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use kiln_runtime::{
    Binding, Failure, FailureCause, FutureId, InboxSender, Payload, Promise, Value,
};

use crate::config::JobConfig;
use crate::error::JobError;
use crate::launcher::Launcher;
use crate::process;
use crate::semaphore::Semaphore;
use crate::spec::JobSpec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Submitted, waiting for a free slot.
    Queued,
    Running,
    /// The process is gone; its result is not delivered yet.
    Exited,
    Delivered,
}

/// How a job ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    /// Terminated by a signal without an exit status.
    Signalled,
    Killed,
    /// The process could not be started or waited for.
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Exited(0))
    }

    /// Reason shown after the command in a job failure.
    pub fn reason(&self) -> String {
        match self {
            Outcome::Exited(code) => format!("exited with status {code}"),
            Outcome::Signalled => "was terminated by a signal".to_string(),
            Outcome::Killed => "was killed".to_string(),
            Outcome::Failed(message) => format!("could not run: {message}"),
        }
    }
}

struct JobEntry {
    spec: JobSpec,
    stack: Vec<String>,
    state: JobState,
    promise: Option<Promise>,
    kill: Arc<AtomicBool>,
}

struct Inner {
    config: JobConfig,
    launcher: Launcher,
    inbox: InboxSender,
    semaphore: Semaphore,
    jobs: Mutex<FxHashMap<JobId, JobEntry>>,
    next_id: AtomicU64,
}

/// Shared handle to the job table. Cheap to clone; usable from any thread.
#[derive(Clone)]
pub struct JobTable(Arc<Inner>);

impl JobTable {
    /// A table delivering results through `inbox`.
    pub fn new(config: JobConfig, launcher: Launcher, inbox: InboxSender) -> Self {
        JobTable(Arc::new(Inner {
            semaphore: Semaphore::new(config.parallelism()),
            config,
            launcher,
            inbox,
            jobs: Mutex::new(FxHashMap::default()),
            next_id: AtomicU64::new(0),
        }))
    }

    pub fn config(&self) -> &JobConfig {
        &self.0.config
    }

    pub fn launcher(&self) -> Launcher {
        self.0.launcher
    }

    pub(crate) fn semaphore(&self) -> &Semaphore {
        &self.0.semaphore
    }

    /// Submit `spec`; its result will resolve `target`.
    ///
    /// Failures are attributed to `binding`. Only a malformed `JobSpec` is
    /// rejected here; everything that goes wrong later is delivered.
    #[tracing::instrument(level = "debug", skip_all, fields(command = %spec))]
    pub fn submit(
        &self,
        spec: JobSpec,
        binding: &Binding,
        target: FutureId,
    ) -> Result<JobId, JobError> {
        spec.validate()?;
        let id = JobId(self.0.next_id.fetch_add(1, Ordering::Relaxed));
        let kill = Arc::new(AtomicBool::new(false));
        let entry = JobEntry {
            spec: spec.clone(),
            stack: binding.stack(),
            state: JobState::Queued,
            promise: Some(self.0.inbox.promise(target)),
            kill: Arc::clone(&kill),
        };
        self.0.jobs.lock().insert(id, entry);
        tracing::debug!(%id, %target, "job queued");

        if self.0.launcher.spawns_processes() {
            if let Err(e) = process::spawn_worker(self.clone(), id, spec, kill) {
                let error = JobError::Worker { id, source: e };
                let outcome = Outcome::Failed(error.to_string());
                self.deliver(id, outcome, "", "", |_| true)?;
            }
        }
        Ok(id)
    }

    /// Report how job `id` ended and deliver its result.
    ///
    /// Only for [`Launcher::Manual`]: a job run by [`Launcher::Process`]
    /// reports its own result once its process has exited.
    pub fn on_complete(
        &self,
        id: JobId,
        outcome: Outcome,
        stdout: &str,
        stderr: &str,
    ) -> Result<(), JobError> {
        if self.0.launcher.spawns_processes() {
            return Err(JobError::ProcessManaged(id));
        }
        self.deliver(id, outcome, stdout, stderr, |_| true)
    }

    /// Deliver the result of a job whose process has exited.
    pub(crate) fn on_exit(
        &self,
        id: JobId,
        outcome: Outcome,
        stdout: &str,
        stderr: &str,
    ) -> Result<(), JobError> {
        self.deliver(id, outcome, stdout, stderr, |state| state == JobState::Exited)
    }

    /// Mark job `id` delivered and fulfil its promise, if it is in a state
    /// `ready` accepts. Otherwise fails with [`JobError::NotExited`].
    fn deliver(
        &self,
        id: JobId,
        outcome: Outcome,
        stdout: &str,
        stderr: &str,
        ready: impl FnOnce(JobState) -> bool,
    ) -> Result<(), JobError> {
        let (promise, payload) = {
            let mut jobs = self.0.jobs.lock();
            let entry = jobs.get_mut(&id).ok_or(JobError::UnknownJob(id))?;
            if entry.state == JobState::Delivered {
                return Err(JobError::AlreadyDelivered(id));
            }
            if !ready(entry.state) {
                return Err(JobError::NotExited(id));
            }
            entry.state = JobState::Delivered;
            let payload = if outcome.is_success() {
                Payload::Pass(Value::string(stdout))
            } else {
                let cause = FailureCause::Job {
                    command: entry.spec.display_command(),
                    reason: outcome.reason(),
                    diagnostics: stderr.to_string(),
                };
                Payload::Fail(Failure::with_stack(cause, entry.stack.clone()))
            };
            (entry.promise.take(), payload)
        };
        tracing::debug!(%id, ?outcome, "job delivered");
        if let Some(promise) = promise {
            promise.fulfil(payload);
        }
        Ok(())
    }

    /// Ask for job `id` to be stopped. It still delivers, as a failure.
    ///
    /// The failure is delivered immediately if no process is running for
    /// the job: always with [`Launcher::Manual`], and while the job is
    /// still `Queued` with [`Launcher::Process`]. A running process is
    /// stopped by its worker, which delivers once it has exited.
    pub fn kill(&self, id: JobId) -> Result<(), JobError> {
        {
            let jobs = self.0.jobs.lock();
            let entry = jobs.get(&id).ok_or(JobError::UnknownJob(id))?;
            if entry.state == JobState::Delivered {
                return Err(JobError::AlreadyDelivered(id));
            }
            entry.kill.store(true, Ordering::Release);
        }
        tracing::debug!(%id, "kill requested");
        if !self.0.launcher.spawns_processes() {
            return self.deliver(id, Outcome::Killed, "", "", |_| true);
        }
        match self.deliver(id, Outcome::Killed, "", "", |state| state == JobState::Queued) {
            Ok(()) | Err(JobError::NotExited(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn status(&self, id: JobId) -> Option<JobState> {
        self.0.jobs.lock().get(&id).map(|entry| entry.state)
    }

    /// Jobs whose result has not been delivered yet.
    pub fn outstanding(&self) -> usize {
        self.0
            .jobs
            .lock()
            .values()
            .filter(|entry| entry.state != JobState::Delivered)
            .count()
    }

    /// Ids of undelivered jobs, oldest first.
    pub fn pending(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self
            .0
            .jobs
            .lock()
            .iter()
            .filter(|(_, entry)| entry.state != JobState::Delivered)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Move a queued job to `Running`. False if it was delivered (killed)
    /// while it waited, in which case no process may be started.
    pub(crate) fn begin(&self, id: JobId) -> bool {
        let mut jobs = self.0.jobs.lock();
        match jobs.get_mut(&id) {
            Some(entry) if entry.state == JobState::Queued => {
                entry.state = JobState::Running;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_state(&self, id: JobId, state: JobState) {
        if let Some(entry) = self.0.jobs.lock().get_mut(&id) {
            if entry.state != JobState::Delivered {
                entry.state = state;
            }
        }
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobTable")
            .field("launcher", &self.0.launcher)
            .field("outstanding", &self.outstanding())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
