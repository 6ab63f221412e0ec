//! External processes with captured output and a cancellation-aware wait.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use fdbatch_core::error::BatchError;
use fdbatch_core::progress::CancellationToken;

/// A spawned process whose stdout and stderr go to one scratch file.
pub struct CapturedProcess {
    program: PathBuf,
    label: String,
    child: Child,
    status: Option<ExitStatus>,
    capture: NamedTempFile,
}

impl CapturedProcess {
    /// Spawn `program` with `args`, capturing combined output.
    pub fn spawn<I, S>(program: &Path, args: I, label: impl Into<String>) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let capture = NamedTempFile::new().map_err(|e| BatchError::io(std::env::temp_dir(), e))?;
        // Both handles share one file offset, so the streams interleave
        // instead of overwriting each other.
        let stdout = capture
            .as_file()
            .try_clone()
            .map_err(|e| BatchError::io(capture.path(), e))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| BatchError::io(capture.path(), e))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        // Tools get their own process group, so a terminal interrupt reaches
        // only the coordinator and the tools are stopped through cancellation.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let child = command
            .spawn()
            .map_err(|source| BatchError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let label = label.into();
        debug!(pid = child.id(), job = %label, "Spawned {}", program.display());
        Ok(Self {
            program: program.to_path_buf(),
            label,
            child,
            status: None,
            capture,
        })
    }

    /// Label given at spawn time (the dataset name for fitting jobs).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// OS process id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Whether the process has not been observed to exit yet.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.is_none()
    }

    /// Exit status, once observed.
    #[must_use]
    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }

    /// Non-blocking liveness check. Returns `true` once the process exited.
    pub fn poll(&mut self) -> Result<bool, BatchError> {
        if self.status.is_some() {
            return Ok(true);
        }
        self.status = self
            .child
            .try_wait()
            .map_err(|e| BatchError::io(&self.program, e))?;
        Ok(self.status.is_some())
    }

    /// Kill the process (if still running) and reap it.
    pub fn kill(&mut self) -> Result<(), BatchError> {
        if self.status.is_some() {
            return Ok(());
        }
        if let Err(e) = self.child.kill() {
            debug!(job = %self.label, "kill failed, process likely exited: {e}");
        }
        self.status = Some(
            self.child
                .wait()
                .map_err(|e| BatchError::io(&self.program, e))?,
        );
        Ok(())
    }

    /// Everything the process wrote to stdout and stderr so far.
    pub fn output(&self) -> Result<String, BatchError> {
        let bytes = std::fs::read(self.capture.path())
            .map_err(|e| BatchError::io(self.capture.path(), e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Drop for CapturedProcess {
    fn drop(&mut self) {
        if self.status.is_none() {
            if let Err(e) = self.kill() {
                warn!(job = %self.label, "could not stop process: {e}");
            }
        }
    }
}

/// How a wait on a group of processes ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every process exited on its own.
    Exited,
    /// Cancellation was observed; every live process was killed.
    Cancelled,
}

/// Wait until every process exited, polling every `poll_interval`.
///
/// On each tick all live processes are polled first; if some are still
/// running and `cancel` is set, they are killed and the wait ends with
/// [`WaitOutcome::Cancelled`]. Processes that already exited are left alone.
pub fn wait_all(
    processes: &mut [CapturedProcess],
    cancel: &CancellationToken,
    poll_interval: Duration,
) -> Result<WaitOutcome, BatchError> {
    loop {
        let mut running = 0usize;
        for process in processes.iter_mut() {
            if !process.poll()? {
                running += 1;
            }
        }
        if running == 0 {
            return Ok(WaitOutcome::Exited);
        }
        if cancel.is_cancelled() {
            for process in processes.iter_mut().filter(|p| p.is_running()) {
                debug!(job = %process.label(), "Killing on cancellation");
                process.kill()?;
            }
            return Ok(WaitOutcome::Cancelled);
        }
        std::thread::sleep(poll_interval);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use fdbatch_tests::write_script;
    use std::time::Instant;
    use tempfile::TempDir;

    const TICK: Duration = Duration::from_millis(5);

    #[test]
    fn captures_stdout_and_stderr_together() {
        let dir = TempDir::new().unwrap();
        let tool = write_script(dir.path(), "tool", "echo out-line\necho err-line >&2\necho \"arg=$1\"\n").unwrap();
        let mut procs = vec![CapturedProcess::spawn(&tool, ["x"], "job").unwrap()];
        let outcome = wait_all(&mut procs, &CancellationToken::new(), TICK).unwrap();
        assert_eq!(outcome, WaitOutcome::Exited);

        let output = procs[0].output().unwrap();
        assert!(output.contains("out-line"));
        assert!(output.contains("err-line"));
        assert!(output.contains("arg=x"));
        assert_eq!(procs[0].label(), "job");
    }

    #[test]
    fn exit_code_does_not_matter() {
        let dir = TempDir::new().unwrap();
        let tool = write_script(dir.path(), "tool", "echo bye\nexit 3\n").unwrap();
        let mut procs = vec![CapturedProcess::spawn(&tool, Vec::<String>::new(), "job").unwrap()];
        assert_eq!(
            wait_all(&mut procs, &CancellationToken::new(), TICK).unwrap(),
            WaitOutcome::Exited
        );
        assert_eq!(procs[0].status().and_then(|s| s.code()), Some(3));
    }

    #[test]
    fn cancellation_kills_live_processes() {
        let dir = TempDir::new().unwrap();
        let slow = write_script(dir.path(), "slow", "exec sleep 30\n").unwrap();
        let fast = write_script(dir.path(), "fast", "echo done\n").unwrap();
        let mut procs = vec![
            CapturedProcess::spawn(&fast, Vec::<String>::new(), "fast").unwrap(),
            CapturedProcess::spawn(&slow, Vec::<String>::new(), "slow").unwrap(),
        ];

        let cancel = CancellationToken::new();
        let remote = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });

        let start = Instant::now();
        let outcome = wait_all(&mut procs, &cancel, TICK).unwrap();
        canceller.join().unwrap();

        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(procs.iter().all(|p| !p.is_running()));
        assert!(procs[0].output().unwrap().contains("done"));
    }

    #[test]
    fn already_exited_group_is_not_cancelled() {
        let dir = TempDir::new().unwrap();
        let fast = write_script(dir.path(), "fast", "echo done\n").unwrap();
        let mut procs = vec![CapturedProcess::spawn(&fast, Vec::<String>::new(), "fast").unwrap()];
        while !procs[0].poll().unwrap() {
            std::thread::sleep(TICK);
        }
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(wait_all(&mut procs, &cancel, TICK).unwrap(), WaitOutcome::Exited);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn tools_lead_their_own_process_group() {
        let dir = TempDir::new().unwrap();
        let slow = write_script(dir.path(), "slow", "exec sleep 30\n").unwrap();
        let mut process = CapturedProcess::spawn(&slow, Vec::<String>::new(), "slow").unwrap();

        let stat = std::fs::read_to_string(format!("/proc/{}/stat", process.id())).unwrap();
        // Fields after the command name: state, ppid, pgrp.
        let fields: Vec<&str> = stat[stat.rfind(')').unwrap() + 1..].split_whitespace().collect();
        assert_eq!(fields[2], process.id().to_string());
        assert_ne!(fields[1], fields[2]);

        process.kill().unwrap();
        assert!(!process.is_running());
    }

    #[test]
    fn spawn_failure_reports_program() {
        let err = CapturedProcess::spawn(Path::new("/no/such/tool"), ["a"], "job")
            .err()
            .unwrap();
        assert!(matches!(err, BatchError::Spawn { .. }));
        assert!(err.to_string().contains("/no/such/tool"));
    }
}
