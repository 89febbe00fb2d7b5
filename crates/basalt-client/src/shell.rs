//! Process-spawning transport that drives a node through its CLI.
//!
//! Queries become `basalt-client --key=value ... --query <sql>`
//! invocations; host commands go through `sh -c`. Child output is
//! redirected to spool files instead of pipes so a chatty child can
//! never fill a pipe buffer and deadlock the poll loop, and the poll
//! loop enforces the per-call timeout by killing the child at the
//! deadline.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use basalt_error::{BasaltError, Result};
use tracing::debug;

use crate::{QueryOutput, Settings, SqlClient};

const POLL_INTERVAL_MILLIS: u64 = 25;

static SPOOL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Client transport backed by the node's command-line client.
#[derive(Debug, Clone)]
pub struct ShellClient {
    program: String,
    base_args: Vec<String>,
    timeout_secs: u64,
    spool_dir: PathBuf,
}

impl ShellClient {
    /// New transport for `program` with a per-call timeout.
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            timeout_secs,
            spool_dir: std::env::temp_dir(),
        }
    }

    /// Arguments placed before the per-call flags on every invocation
    /// (host, port, credentials).
    #[must_use]
    pub fn with_base_args(mut self, args: Vec<String>) -> Self {
        self.base_args = args;
        self
    }

    /// Directory for child output spool files.
    #[must_use]
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }

    fn spool_path(&self, stream: &str) -> PathBuf {
        let seq = SPOOL_SEQ.fetch_add(1, Ordering::Relaxed);
        self.spool_dir.join(format!(
            "basalt-client-{}-{seq}-{stream}.log",
            std::process::id()
        ))
    }

    fn run(&self, mut command: Command, program: &str) -> Result<QueryOutput> {
        let out_path = self.spool_path("out");
        let err_path = self.spool_path("err");
        let stdout_file = File::create(&out_path)?;
        let stderr_file = File::create(&err_path)?;
        command.stdin(Stdio::null());
        command.stdout(Stdio::from(stdout_file));
        command.stderr(Stdio::from(stderr_file));

        let spawned = command.spawn().map_err(|error| BasaltError::SpawnFailed {
            program: program.to_owned(),
            detail: error.to_string(),
        });
        let mut child = match spawned {
            Ok(child) => child,
            Err(error) => {
                remove_spool(&out_path, &err_path);
                return Err(error);
            }
        };

        let waited = wait_for_child(&mut child, self.timeout_secs);
        let output = fs::read_to_string(&out_path).unwrap_or_default();
        let stderr = fs::read_to_string(&err_path).unwrap_or_default();
        remove_spool(&out_path, &err_path);

        let status = waited?;
        if status.timed_out {
            return Err(BasaltError::Timeout {
                timeout_secs: self.timeout_secs,
            });
        }

        Ok(QueryOutput {
            output,
            stderr,
            // A killed or signalled child has no code; treat it as a
            // generic failure the scenario can report.
            exitcode: status.exit_code.unwrap_or(-1),
        })
    }
}

impl SqlClient for ShellClient {
    fn query(&self, sql: &str, settings: &Settings) -> Result<QueryOutput> {
        debug!(
            program = %self.program,
            sql_bytes = sql.len(),
            settings = %settings.canonical(),
            timeout_secs = self.timeout_secs,
            "query_dispatch"
        );
        let mut command = Command::new(&self.program);
        command.args(&self.base_args);
        command.args(settings.render_flags());
        command.arg("--query").arg(sql);
        self.run(command, &self.program)
    }

    fn command(&self, cmd: &str) -> Result<QueryOutput> {
        debug!(cmd_bytes = cmd.len(), timeout_secs = self.timeout_secs, "command_dispatch");
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd);
        self.run(command, "sh")
    }

    fn identity(&self) -> String {
        format!("shell:{}", self.program)
    }
}

struct ChildStatus {
    exit_code: Option<i32>,
    timed_out: bool,
}

fn wait_for_child(child: &mut Child, timeout_secs: u64) -> Result<ChildStatus> {
    let started_at = Instant::now();
    let timeout = Duration::from_secs(timeout_secs.max(1));
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MILLIS);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(ChildStatus {
                    exit_code: status.code(),
                    timed_out: false,
                });
            }
            Ok(None) => {
                if started_at.elapsed() >= timeout {
                    let _ = child.kill();
                    let status = child.wait().map_err(|error| {
                        BasaltError::internal(format!("wait_after_kill_failed: {error}"))
                    })?;
                    return Ok(ChildStatus {
                        exit_code: status.code(),
                        timed_out: true,
                    });
                }
                std::thread::sleep(poll_interval);
            }
            Err(error) => {
                return Err(BasaltError::internal(format!("try_wait_failed: {error}")));
            }
        }
    }
}

fn remove_spool(out_path: &Path, err_path: &Path) {
    let _ = fs::remove_file(out_path);
    let _ = fs::remove_file(err_path);
}
