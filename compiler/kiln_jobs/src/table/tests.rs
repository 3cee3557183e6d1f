use std::thread;
use std::time::{Duration, Instant};

use kiln_runtime::{make_list, Inbox, PrimRegistry, Receiver, Runtime};
use pretty_assertions::assert_eq;

use super::*;
use crate::prim::register_job;

fn setup(launcher: Launcher) -> (Runtime, JobTable) {
    setup_with(launcher, 2)
}

fn setup_with(launcher: Launcher, max_parallel: usize) -> (Runtime, JobTable) {
    let inbox = Inbox::new();
    let config = JobConfig::new()
        .max_parallel(max_parallel)
        .poll_interval(Duration::from_millis(5));
    let table = JobTable::new(config, launcher, inbox.sender());
    let mut registry = PrimRegistry::new();
    if let Err(e) = register_job(&mut registry, table.clone()) {
        panic!("{e}");
    }
    let rt = Runtime::builder()
        .inbox(inbox)
        .registry(registry.share())
        .build();
    (rt, table)
}

/// Call `job_launch` from a `compile` call site and return the result future.
fn launch(rt: &mut Runtime, cmd: &[&str], env: &[&str], dir: &str, stdin: &str) -> FutureId {
    let strings = |rt: &mut Runtime, items: &[&str]| {
        let values = items.iter().map(|s| Value::string(*s)).collect();
        make_list(rt.heap_mut(), values)
    };
    let args = [
        strings(rt, cmd),
        strings(rt, env),
        Value::string(dir),
        Value::string(stdin),
    ];
    let futures = args.into_iter().map(|v| rt.resolved(v)).collect();
    let out = rt.future();
    let binding = Binding::root().call("compile");
    rt.call_named("job_launch", binding, futures, Receiver::Fill(out));
    out
}

fn passed(rt: &Runtime, out: FutureId) -> String {
    let value = rt.value(out).cloned().unwrap_or(Value::Unit);
    match rt.heap().read_result(&value) {
        Some((true, stdout)) => stdout.as_str().map(str::to_string).unwrap_or_default(),
        _ => panic!("expected Pass, got {}", rt.heap().render(&value)),
    }
}

fn failed(rt: &Runtime, out: FutureId) -> (String, Vec<String>) {
    let value = rt.value(out).cloned().unwrap_or(Value::Unit);
    rt.heap()
        .read_failure(&value)
        .unwrap_or_else(|| panic!("expected Fail, got {}", rt.heap().render(&value)))
}

fn only_pending(table: &JobTable) -> JobId {
    match table.pending().as_slice() {
        [id] => *id,
        other => panic!("expected one pending job, got {other:?}"),
    }
}

#[test]
fn test_manual_job_waits_for_completion() {
    let (mut rt, table) = setup(Launcher::Manual);
    let out = launch(&mut rt, &["cc", "-c", "main.c"], &[], "", "");
    rt.run_until_idle();

    let id = only_pending(&table);
    assert_eq!(table.status(id), Some(JobState::Queued));
    assert_eq!(table.outstanding(), 1);
    assert_eq!(rt.value(out), None);

    assert!(table.on_complete(id, Outcome::Exited(0), "ok", "").is_ok());
    rt.run();

    assert_eq!(passed(&rt, out), "ok");
    assert_eq!(table.status(id), Some(JobState::Delivered));
    assert_eq!(table.outstanding(), 0);
    assert!(matches!(
        table.on_complete(id, Outcome::Exited(0), "", ""),
        Err(JobError::AlreadyDelivered(_))
    ));
}

#[test]
fn test_manual_kill_delivers_failure_with_stack() {
    let (mut rt, table) = setup(Launcher::Manual);
    let out = launch(&mut rt, &["cc", "-c", "main.c"], &[], "", "");
    rt.run_until_idle();

    let id = only_pending(&table);
    assert!(table.kill(id).is_ok());
    rt.run();

    let (cause, stack) = failed(&rt, out);
    assert_eq!(cause, "job `cc -c main.c` was killed");
    assert_eq!(stack, vec!["compile".to_string()]);
    assert!(matches!(table.kill(id), Err(JobError::AlreadyDelivered(_))));
}

#[test]
fn test_unknown_job() {
    let (_, table) = setup(Launcher::Manual);
    assert!(matches!(
        table.on_complete(JobId(99), Outcome::Killed, "", ""),
        Err(JobError::UnknownJob(JobId(99)))
    ));
    assert_eq!(table.status(JobId(99)), None);
}

#[test]
fn test_invalid_spec_fails_without_submitting() {
    let (mut rt, table) = setup(Launcher::Manual);
    let out = launch(&mut rt, &[], &[], "", "");
    rt.run();

    let (cause, _) = failed(&rt, out);
    assert_eq!(cause, "job `` rejected: job has an empty command line");
    assert!(table.pending().is_empty());
}

#[test]
fn test_process_success_passes_stdout() {
    let (mut rt, table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", "printf ok"], &[], "", "");
    rt.run();

    assert_eq!(passed(&rt, out), "ok");
    assert_eq!(table.outstanding(), 0);
}

#[test]
fn test_process_nonzero_exit_fails_with_stderr() {
    let (mut rt, _table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", "echo bad >&2; exit 3"], &[], "", "");
    rt.run();

    let (cause, stack) = failed(&rt, out);
    assert_eq!(cause, "job `sh -c 'echo bad >&2; exit 3'` exited with status 3\nbad");
    assert_eq!(stack, vec!["compile".to_string()]);
}

#[test]
fn test_process_env_dir_and_stdin() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = dir
        .path()
        .canonicalize()
        .unwrap_or_else(|e| panic!("{e}"));
    let path = path.to_string_lossy().into_owned();
    let (mut rt, _table) = setup(Launcher::Process);

    let out = launch(
        &mut rt,
        &["sh", "-c", r#"printf '%s:' "$GREETING"; pwd; cat"#],
        &["GREETING=hi"],
        &path,
        "from stdin",
    );
    rt.run();

    assert_eq!(passed(&rt, out), format!("hi:{path}\nfrom stdin"));
}

#[test]
fn test_process_environment_is_explicit() {
    let (mut rt, _table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", r#"printf '%s' "${HOME-unset}""#], &[], "", "");
    rt.run();
    assert_eq!(passed(&rt, out), "unset");
}

#[test]
fn test_spawn_failure_is_delivered() {
    let (mut rt, _table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["/nonexistent/kiln-tool"], &[], "", "");
    rt.run();

    let (cause, _) = failed(&rt, out);
    assert!(
        cause.starts_with("job `/nonexistent/kiln-tool` could not run: "),
        "{cause}"
    );
}

#[test]
fn test_process_kill() {
    let (mut rt, table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", "exec sleep 30"], &[], "", "");
    rt.run_until_idle();

    let id = only_pending(&table);
    assert!(table.kill(id).is_ok());
    rt.run();

    let (cause, _) = failed(&rt, out);
    assert_eq!(cause, "job `sh -c 'exec sleep 30'` was killed");
    assert_eq!(table.status(id), Some(JobState::Delivered));
}

#[test]
fn test_many_jobs_all_deliver() {
    let (mut rt, table) = setup(Launcher::Process);
    let outs: Vec<FutureId> = (0..6)
        .map(|i| {
            let script = format!("printf {i}");
            launch(&mut rt, &["sh", "-c", &script], &[], "", "")
        })
        .collect();
    let stats = rt.run();

    assert_eq!(stats.delivered, 6);
    for (i, out) in outs.into_iter().enumerate() {
        assert_eq!(passed(&rt, out), i.to_string());
    }
    assert_eq!(table.outstanding(), 0);
}

/// Poll until job `id` reaches `state`.
fn wait_for_state(table: &JobTable, id: JobId, state: JobState) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while table.status(id) != Some(state) {
        assert!(Instant::now() < deadline, "{id} never reached {state:?}");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_process_result_waits_for_exit() {
    let (mut rt, table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", "sleep 1; printf done"], &[], "", "");
    rt.run_until_idle();

    let id = only_pending(&table);
    wait_for_state(&table, id, JobState::Running);
    rt.run_until_idle();
    assert_eq!(rt.value(out), None);
    assert_eq!(table.status(id), Some(JobState::Running));

    rt.run();
    assert_eq!(passed(&rt, out), "done");
    assert_eq!(table.status(id), Some(JobState::Delivered));
}

#[test]
fn test_process_jobs_reject_external_completion() {
    let (mut rt, table) = setup(Launcher::Process);
    let out = launch(&mut rt, &["sh", "-c", "sleep 1; printf real"], &[], "", "");
    rt.run_until_idle();

    let id = only_pending(&table);
    wait_for_state(&table, id, JobState::Running);
    assert!(matches!(
        table.on_complete(id, Outcome::Exited(0), "fake", ""),
        Err(JobError::ProcessManaged(_))
    ));
    assert_eq!(table.status(id), Some(JobState::Running));

    rt.run();
    assert_eq!(passed(&rt, out), "real");
}

#[test]
fn test_kill_while_queued_delivers_at_once() {
    let (mut rt, table) = setup_with(Launcher::Process, 1);
    let blocker = launch(&mut rt, &["sh", "-c", "exec sleep 30"], &[], "", "");
    rt.run_until_idle();
    let first = only_pending(&table);
    wait_for_state(&table, first, JobState::Running);

    let queued = launch(&mut rt, &["sh", "-c", "printf never"], &[], "", "");
    rt.run_until_idle();
    let second = table
        .pending()
        .into_iter()
        .find(|&id| id != first)
        .unwrap_or_else(|| panic!("second job not pending"));
    assert_eq!(table.status(second), Some(JobState::Queued));

    assert!(table.kill(second).is_ok());
    rt.run_until_idle();
    let (cause, _) = failed(&rt, queued);
    assert_eq!(cause, "job `sh -c 'printf never'` was killed");
    assert_eq!(table.status(first), Some(JobState::Running));
    assert_eq!(rt.value(blocker), None);

    assert!(table.kill(first).is_ok());
    rt.run();
    assert_eq!(failed(&rt, blocker).0, "job `sh -c 'exec sleep 30'` was killed");
    assert_eq!(table.outstanding(), 0);
}

#[test]
fn test_outcome_reasons() {
    assert_eq!(Outcome::Exited(2).reason(), "exited with status 2");
    assert_eq!(Outcome::Signalled.reason(), "was terminated by a signal");
    assert!(Outcome::Exited(0).is_success());
    assert!(!Outcome::Killed.is_success());
}
