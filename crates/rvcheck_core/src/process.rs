//! Process runner: launch the emulator under a wall-clock budget.
//!
//! The runner only classifies what happened to the child process. It never looks at the output it captures and
//! never touches the filesystem; deciding pass/fail is the job of [`crate::verify`].
//!
//! ## Outcomes
//!
//! | child behaviour                   | result                         |
//! |-----------------------------------|--------------------------------|
//! | exits 0 before the deadline       | `Completed { stdout }`         |
//! | still running at the deadline     | `TimedOut` (child is killed)   |
//! | exits non-zero / killed by signal | `NonZeroExit { code }`         |
//! | cannot be spawned at all          | `Err(HarnessError::Spawn)`     |

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{HarnessError, HarnessResult};

/// Budget for `--compliance` runs.
pub const DEFAULT_COMPLIANCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Budget for generic runs. Longer: these are whole benchmark programs.
pub const DEFAULT_GENERIC_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Classification of a finished invocation, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Completed,
    TimedOut,
    NonZeroExit,
}

/// Outcome of one external invocation.
///
/// Output exists only for `Completed`: a timed-out or failing emulator's output is not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    Completed { stdout: Vec<u8> },
    TimedOut,
    /// `code` is `None` when the child was terminated by a signal. It is informational only.
    NonZeroExit { code: Option<i32> },
}

impl ProcessResult {
    pub fn status(&self) -> ProcessStatus {
        match self {
            ProcessResult::Completed { .. } => ProcessStatus::Completed,
            ProcessResult::TimedOut => ProcessStatus::TimedOut,
            ProcessResult::NonZeroExit { .. } => ProcessStatus::NonZeroExit,
        }
    }

    pub fn stdout(&self) -> Option<&[u8]> {
        match self {
            ProcessResult::Completed { stdout } => Some(stdout),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProcessResult::Completed { .. })
    }
}

/// Launch an executable and classify the result.
///
/// The seam exists so orchestration can be exercised without a real emulator.
pub trait ProcessRunner {
    fn run(&self, executable: &Path, args: &[OsString], timeout: Duration) -> HarnessResult<ProcessResult>;
}

/// Runs real child processes via `std::process`.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    poll_interval: Duration,
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often the child is polled for exit while waiting on the deadline.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[tracing::instrument(
        skip_all,
        fields(executable = %executable.display(), timeout_ms = timeout.as_millis() as u64)
    )]
    fn run(&self, executable: &Path, args: &[OsString], timeout: Duration) -> HarnessResult<ProcessResult> {
        // A budget too large to represent as an instant never expires.
        let deadline = Instant::now().checked_add(timeout);

        let mut child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                executable: executable.to_path_buf(),
                source,
            })?;
        tracing::debug!(pid = child.id(), "spawned");

        // Drained concurrently so a chatty child never stalls on a full pipe.
        let stdout = child.stdout.take().map(drain_stdout);

        let Some(status) = self.wait_until(&mut child, deadline, executable)? else {
            tracing::warn!("timed out after {:?}", timeout);
            return Ok(ProcessResult::TimedOut);
        };

        if !status.success() {
            tracing::warn!(code = ?status.code(), "non-zero exit");
            return Ok(ProcessResult::NonZeroExit { code: status.code() });
        }

        let Some(stdout) = stdout else {
            return Ok(ProcessResult::Completed { stdout: Vec::new() });
        };

        // A grandchild can keep the pipe open after the child exits; the budget still applies.
        let received = match deadline {
            Some(deadline) => stdout.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => stdout.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(Ok(bytes)) => {
                tracing::debug!(bytes = bytes.len(), "completed");
                Ok(ProcessResult::Completed { stdout: bytes })
            }
            Ok(Err(source)) => Err(HarnessError::Wait {
                executable: executable.to_path_buf(),
                source,
            }),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("stdout still open after {:?}", timeout);
                Ok(ProcessResult::TimedOut)
            }
            Err(RecvTimeoutError::Disconnected) => Err(HarnessError::Wait {
                executable: executable.to_path_buf(),
                source: std::io::Error::other("stdout reader exited without reporting"),
            }),
        }
    }
}

impl SystemProcessRunner {
    /// Poll until the child exits (`Some`) or the deadline passes (`None`, child killed and reaped).
    fn wait_until(
        &self,
        child: &mut Child,
        deadline: Option<Instant>,
        executable: &Path,
    ) -> HarnessResult<Option<ExitStatus>> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) => {}
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(HarnessError::Wait {
                        executable: executable.to_path_buf(),
                        source,
                    });
                }
            }

            let Some(deadline) = deadline else {
                thread::sleep(self.poll_interval);
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

fn drain_stdout(mut pipe: ChildStdout) -> Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = pipe.read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone when the run was abandoned.
        let _ = tx.send(result);
    });
    rx
}
