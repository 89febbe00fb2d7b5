//! Client transport for driving a Basalt cluster from test scenarios.
//!
//! Everything a scenario does against the system under test goes through
//! the [`SqlClient`] trait: SQL statements via [`SqlClient::query`] and
//! host-level operations (keystore manipulation, config installs,
//! restarts) via [`SqlClient::command`]. The trait keeps suites
//! independent of how the cluster is reached: production runs use
//! [`shell::ShellClient`], which spawns the `basalt-client` binary, while
//! tests use [`scripted::ScriptedClient`], a deterministic in-process
//! double.
//!
//! Exit codes are data, not errors. A non-zero exit code comes back in
//! [`QueryOutput`] and the caller decides whether it is tolerable; the
//! convenience wrappers [`SqlClient::query_ok`] and
//! [`SqlClient::command_expect`] convert unexpected codes into transport
//! errors for the common case.

use basalt_error::{BasaltError, Result};

pub mod scripted;
pub mod settings;
pub mod shell;

pub use settings::{SettingValue, Settings};

/// Captured result of one query or command against a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    /// Standard output, verbatim.
    pub output: String,
    /// Standard error, verbatim.
    pub stderr: String,
    /// Process exit code. Zero means success.
    pub exitcode: i32,
}

impl QueryOutput {
    /// Successful output with empty stderr.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            stderr: String::new(),
            exitcode: 0,
        }
    }

    /// Failed output carrying an exit code and stderr text.
    pub fn failed(exitcode: i32, stderr: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            stderr: stderr.into(),
            exitcode,
        }
    }

    /// Whether the call exited with code zero.
    pub const fn succeeded(&self) -> bool {
        self.exitcode == 0
    }

    /// Output with surrounding whitespace removed, the form scenarios
    /// compare and snapshot.
    pub fn trimmed(&self) -> &str {
        self.output.trim()
    }
}

/// Synchronous interface to a cluster node.
///
/// Implementations must be callable from pooled worker threads, so the
/// trait requires `Send + Sync`. All methods block until the call
/// completes or the transport's timeout fires.
pub trait SqlClient: Send + Sync {
    /// Run one SQL statement with per-call session settings.
    fn query(&self, sql: &str, settings: &Settings) -> Result<QueryOutput>;

    /// Run a host-level shell command on the node.
    fn command(&self, cmd: &str) -> Result<QueryOutput>;

    /// Identity string for reports and logs, e.g. the program invoked or
    /// the double's label.
    fn identity(&self) -> String;

    /// Run a query and treat any non-zero exit code as a failure.
    fn query_ok(&self, sql: &str, settings: &Settings) -> Result<QueryOutput> {
        let out = self.query(sql, settings)?;
        if out.succeeded() {
            Ok(out)
        } else {
            Err(BasaltError::QueryFailed {
                exitcode: out.exitcode,
                stderr: out.stderr,
            })
        }
    }

    /// Run a command and require a specific exit code, tolerating nothing
    /// else.
    fn command_expect(&self, cmd: &str, expected: i32) -> Result<QueryOutput> {
        let out = self.command(cmd)?;
        if out.exitcode == expected {
            Ok(out)
        } else {
            Err(BasaltError::CommandFailed {
                exitcode: out.exitcode,
                expected,
                stderr: out.stderr,
            })
        }
    }
}
