//! Process launcher: one worker thread per job.
//!
//! The worker waits for a semaphore slot, starts the process, feeds its
//! stdin, drains stdout and stderr on helper threads, and polls for exit
//! or a kill request. Whatever happens, it ends by reporting an
//! [`Outcome`] to the table.

use std::io::{self, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::JobConfig;
use crate::spec::JobSpec;
use crate::table::{JobId, JobState, JobTable, Outcome};

pub(crate) fn spawn_worker(
    table: JobTable,
    id: JobId,
    spec: JobSpec,
    kill: Arc<AtomicBool>,
) -> io::Result<()> {
    thread::Builder::new()
        .name(format!("kiln-{id}"))
        .spawn(move || run(&table, id, &spec, &kill))
        .map(drop)
}

fn run(table: &JobTable, id: JobId, spec: &JobSpec, kill: &AtomicBool) {
    let permit = table.semaphore().acquire();
    if !table.begin(id) {
        tracing::debug!(%id, "job killed while queued");
        return;
    }
    let (outcome, stdout, stderr) = if kill.load(Ordering::Acquire) {
        (Outcome::Killed, String::new(), String::new())
    } else {
        tracing::debug!(%id, command = %spec, "job running");
        execute(table.config(), spec, kill)
    };
    table.set_state(id, JobState::Exited);
    drop(permit);
    if let Err(e) = table.on_exit(id, outcome, &stdout, &stderr) {
        tracing::warn!(%id, error = %e, "job result not delivered");
    }
}

fn execute(config: &JobConfig, spec: &JobSpec, kill: &AtomicBool) -> (Outcome, String, String) {
    let mut child = match start(config, spec) {
        Ok(child) => child,
        Err(e) => return (Outcome::Failed(e.to_string()), String::new(), String::new()),
    };

    let writer = child.stdin.take().map(|mut pipe| {
        let input = spec.input().to_owned();
        // Broken pipe is expected if the child ignores its input.
        thread::spawn(move || drop(pipe.write_all(input.as_bytes())))
    });
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let outcome = wait(&mut child, config, kill);

    if let Some(writer) = writer {
        let _ = writer.join();
    }
    (outcome, collect(stdout), collect(stderr))
}

fn start(config: &JobConfig, spec: &JobSpec) -> io::Result<Child> {
    let (program, args) = spec
        .command()
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut command = Command::new(program);
    command.args(args).env_clear();
    for var in config.inherited() {
        if let Some(value) = std::env::var_os(var) {
            command.env(var, value);
        }
    }
    command.envs(spec.env_pairs());
    if !spec.working_dir().is_empty() {
        command.current_dir(spec.working_dir());
    }
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

fn wait(child: &mut Child, config: &JobConfig, kill: &AtomicBool) -> Outcome {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return status.code().map_or(Outcome::Signalled, Outcome::Exited),
            Ok(None) if kill.load(Ordering::Acquire) => {
                let _ = child.kill();
                let _ = child.wait();
                return Outcome::Killed;
            }
            Ok(None) => thread::sleep(config.interval()),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Outcome::Failed(e.to_string());
            }
        }
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
