//! Out-of-process workers
//!
//! The manager re-executes its own binary in worker mode and remembers
//! the PIDs in a file; stopping reads that file back and signals each PID
//! that still looks like one of our workers.

use crate::UrlqError;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use sysinfo::{Pid, Signal, System};

/// Command-line flag that puts the binary into single-worker mode
pub const WORKER_FLAG: &str = "--run-worker";

/// Everything needed to start worker processes
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    /// Number of processes to start
    pub count: u32,
    /// Arguments forwarded to every worker after the worker flag
    pub forward_args: Vec<OsString>,
    /// File the PIDs are appended to
    pub pid_file: PathBuf,
    /// File receiving the workers' stdout and stderr
    pub log_file: PathBuf,
    /// Executable to launch; defaults to the current one
    pub program: Option<PathBuf>,
}

/// Outcome of a stop request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Workers that were sent SIGTERM
    pub stopped: usize,
    /// PIDs that no longer belong to a worker
    pub skipped: usize,
}

/// Identity used in a worker process's logs
pub fn process_worker_id() -> String {
    format!("process-{}", std::process::id())
}

/// Starts worker processes and records their PIDs
///
/// Each PID is appended as soon as its process starts, so a failure part
/// way through still leaves the earlier workers stoppable.
///
/// # Returns
///
/// * `Ok(Vec<u32>)` - PIDs of the started workers
/// * `Err(UrlqError)` - A process could not be started or the PID file written
pub fn spawn_processes(options: &SpawnOptions) -> Result<Vec<u32>, UrlqError> {
    let program = match &options.program {
        Some(program) => program.clone(),
        None => std::env::current_exe()?,
    };
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.log_file)?;

    spawn_recorded(options.count, &options.pid_file, |n| {
        let child = Command::new(&program)
            .arg(WORKER_FLAG)
            .args(&options.forward_args)
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log.try_clone()?)
            .spawn()
            .map_err(|e| {
                UrlqError::Launch(format!("failed to start {}: {}", program.display(), e))
            })?;

        tracing::info!("Started worker {} with pid {}", n, child.id());
        Ok(child.id())
    })
}

/// Runs `spawn_one` `count` times, appending each returned PID right away
fn spawn_recorded<F>(count: u32, pid_file: &Path, mut spawn_one: F) -> Result<Vec<u32>, UrlqError>
where
    F: FnMut(u32) -> Result<u32, UrlqError>,
{
    let mut pids = Vec::with_capacity(count as usize);
    for n in 0..count {
        let pid = spawn_one(n)?;
        append_pids(pid_file, &[pid])?;
        pids.push(pid);
    }
    Ok(pids)
}

/// Appends one PID per line to the PID file
pub fn append_pids(pid_file: &Path, pids: &[u32]) -> Result<(), UrlqError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(pid_file)?;
    for pid in pids {
        writeln!(file, "{}", pid)?;
    }
    Ok(())
}

/// Parses a PID file, ignoring lines that are not numbers
pub fn parse_pid_file(content: &str) -> Vec<u32> {
    content
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

/// Returns true if a command line belongs to a urlq worker
pub fn is_worker_command_line(command_line: &str) -> bool {
    command_line.split_whitespace().any(|arg| arg == WORKER_FLAG)
}

/// Stops every worker listed in the PID file, then removes the file
///
/// PIDs whose process is gone, or was reused by something that is not a
/// worker, are skipped rather than signalled. A PID that cannot be
/// signalled is skipped too; the remaining PIDs are still handled.
pub fn stop_processes(pid_file: &Path) -> Result<StopReport, UrlqError> {
    if !pid_file.exists() {
        tracing::warn!(
            "No PID file at {}; no workers to stop. Please verify it manually",
            pid_file.display()
        );
        return Ok(StopReport::default());
    }

    let content = std::fs::read_to_string(pid_file)?;
    let mut system = System::new();

    let report = stop_listed(
        &parse_pid_file(&content),
        |pid| {
            let pid = Pid::from_u32(pid);
            system.refresh_process(pid)
                && system
                    .process(pid)
                    .map(|process| is_worker_command_line(&process.cmd().join(" ")))
                    .unwrap_or(false)
        },
        terminate,
    );

    std::fs::remove_file(pid_file)?;
    tracing::info!("Stopped {} workers", report.stopped);
    Ok(report)
}

/// Signals each PID that `is_worker` accepts, counting the rest as skipped
fn stop_listed<C, T>(pids: &[u32], mut is_worker: C, mut terminate: T) -> StopReport
where
    C: FnMut(u32) -> bool,
    T: FnMut(u32) -> Result<(), UrlqError>,
{
    let mut report = StopReport::default();

    for &pid in pids {
        if !is_worker(pid) {
            tracing::debug!("Skipping pid {}: not a running worker", pid);
            report.skipped += 1;
            continue;
        }

        tracing::info!("Stopping worker process: {}", pid);
        match terminate(pid) {
            Ok(()) => report.stopped += 1,
            Err(e) => {
                tracing::warn!("Could not stop worker {}: {}", pid, e);
                report.skipped += 1;
            }
        }
    }

    report
}

/// Sends SIGTERM to a single process
fn terminate(pid: u32) -> Result<(), UrlqError> {
    let mut system = System::new();
    let sys_pid = Pid::from_u32(pid);
    if !system.refresh_process(sys_pid) {
        return Err(UrlqError::Launch(format!("process {} is gone", pid)));
    }

    match system.process(sys_pid).and_then(|p| p.kill_with(Signal::Term)) {
        Some(true) => Ok(()),
        Some(false) => Err(UrlqError::Launch(format!("SIGTERM to {} failed", pid))),
        None => Err(UrlqError::Launch(format!(
            "SIGTERM is not supported for process {} on this platform",
            pid
        ))),
    }
}
