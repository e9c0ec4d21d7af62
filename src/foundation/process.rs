use std::io::Read;
use std::process::{Child, ExitStatus};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{TradeAnimError, TradeAnimResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a child process that ran to completion.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }
}

/// Wait for `child` to exit, killing it once `timeout` elapses.
///
/// Stdout and stderr (when piped) are drained on helper threads so a chatty child cannot block
/// on a full pipe while we poll.
pub fn wait_with_timeout(
    mut child: Child,
    program: &str,
    timeout: Duration,
) -> TradeAnimResult<ProcessOutput> {
    let stdout_drain = child.stdout.take().map(spawn_drain);
    let stderr_drain = child.stderr.take().map(spawn_drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                return Err(TradeAnimError::service(format!(
                    "failed to wait for {program}: {e}"
                )));
            }
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(program, timeout_ms = timeout.as_millis() as u64, "child process timed out");
            return Err(TradeAnimError::service(format!(
                "{program} timed out after {:.1}s",
                timeout.as_secs_f64()
            )));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    Ok(ProcessOutput {
        status,
        stdout: join_drain(stdout_drain, program, "stdout")?,
        stderr: join_drain(stderr_drain, program, "stderr")?,
    })
}

pub(crate) fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

pub(crate) fn join_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    program: &str,
    stream: &str,
) -> TradeAnimResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| TradeAnimError::service(format!("{program} {stream} drain thread panicked")))?
            .map_err(|e| TradeAnimError::service(format!("{program} {stream} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

#[cfg(all(test, unix))]
#[path = "../../tests/unit/foundation/process.rs"]
mod tests;
