use std::error::Error;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use log::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The captured result of an external command which ran to completion
#[derive(Debug)]
pub struct CommandOutput {
    /// exit status of the process
    pub status: ExitStatus,
    /// everything written to stdout
    pub stdout: String,
    /// everything written to stderr
    pub stderr: String,
}

impl CommandOutput {
    /// did the command exit with status zero?
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Failure to run an external command to completion
#[derive(Debug)]
pub enum CommandError {
    /// the process could not be started -- usually it is not installed
    Launch {
        /// the program we tried to run
        program: String,
        /// the underlying error
        source: std::io::Error,
    },
    /// error while waiting on a running process
    Wait(std::io::Error),
    /// the process was killed after running for longer than its timeout
    TimedOut {
        /// the program which was killed
        program: String,
        /// how long it was allowed to run
        timeout: Duration,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Launch { program, source } => {
                write!(f, "Error launching {} -- is it installed? ({})", program, source)
            }
            CommandError::Wait(e) => write!(f, "Error waiting on process: {}", e),
            CommandError::TimedOut { program, timeout } => {
                write!(f, "Command {} timed out after {}s", program, timeout.as_secs())
            }
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CommandError::Launch { source, .. } => Some(source),
            CommandError::Wait(e) => Some(e),
            CommandError::TimedOut { .. } => None,
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Run `program` with `args` in the directory `cwd`, capturing its output.
///
/// The process is killed if it has not exited within `timeout`, and that is reported
/// as `CommandError::TimedOut`. A non-zero exit status is *not* an error here;
/// callers decide what a failed run means via `CommandOutput::success`.
pub fn run_command<P: AsRef<Path>>(
    program: &str,
    args: &[&str],
    cwd: P,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    debug!("running {} {:?} in {}", program, args, cwd.as_ref().display());
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd.as_ref())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CommandError::Launch {
            program: program.to_string(),
            source,
        })?;

    // pipes are drained on their own threads so a chatty process can't fill them and stall
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().map_err(CommandError::Wait)? {
            break status;
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::TimedOut {
                program: program.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(CommandOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_output() {
        let out = run_command("sh", &["-c", "echo hello; echo oops >&2"], ".", Duration::from_secs(10))
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn nonzero_exit_is_not_an_error() {
        let out = run_command("sh", &["-c", "exit 3"], ".", Duration::from_secs(10)).unwrap();
        assert!(!out.success());
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = run_command("ls", &[], dir.path(), Duration::from_secs(10)).unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn slow_process_is_killed() {
        let err = run_command("sleep", &["5"], ".", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let err = run_command("definitely-not-a-real-program-xyz", &[], ".", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, CommandError::Launch { .. }));
        assert!(err.to_string().contains("is it installed"));
    }
}
