//! Subprocess execution for build migration.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Exit code reported when the process was terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for output readers after the child exits. Grandchildren
/// (e.g. a build daemon) may keep the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Errors launching or waiting for the migration command.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

/// Runs the migration command. Tests substitute a fake.
pub trait MigrationExecutor: Send + Sync {
    /// Run `command args...` in `dir` and return its exit code.
    fn run(
        &self,
        dir: &Path,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<i32, ExecError>;
}

/// Executes the command as a real child process.
///
/// Both output streams are drained into one merged transcript that is logged
/// at debug level; only the exit status is inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl MigrationExecutor for ProcessExecutor {
    fn run(
        &self,
        dir: &Path,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<i32, ExecError> {
        let mut child = Command::new(command)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let transcript = Arc::new(Mutex::new(Vec::new()));
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(drain(stdout, Arc::clone(&transcript)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(drain(stderr, Arc::clone(&transcript)));
        }

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= timeout => {
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill {}: {}", command, e);
                    }
                    let _ = child.wait();
                    return Err(ExecError::Timeout {
                        command: command.to_string(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(ExecError::Wait {
                        command: command.to_string(),
                        source,
                    })
                }
            }
        };

        settle_readers(readers);
        if let Ok(lines) = transcript.lock() {
            for line in lines.iter() {
                log::debug!("[{}] {}", command, line);
            }
        }

        Ok(status.code().unwrap_or(SIGNALED_EXIT_CODE))
    }
}

fn drain<R: Read + Send + 'static>(
    stream: R,
    transcript: Arc<Mutex<Vec<String>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            if let Ok(mut lines) = transcript.lock() {
                lines.push(line);
            }
        }
    })
}

/// Join readers that finish within the grace period; detach the rest.
fn settle_readers(readers: Vec<thread::JoinHandle<()>>) {
    let deadline = Instant::now() + DRAIN_GRACE;
    while Instant::now() < deadline && !readers.iter().all(|r| r.is_finished()) {
        thread::sleep(POLL_INTERVAL);
    }
    for reader in readers {
        if reader.is_finished() {
            let _ = reader.join();
        }
    }
}
