use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for the Basalt conformance suite.
///
/// Variants are grouped by where they arise in a run: loading
/// configuration, talking to the cluster, handling snapshot baselines,
/// and preparing fixtures. Assertion outcomes (snapshot mismatch,
/// equivalence mismatch) are deliberately not errors; they are scenario
/// results and travel through the suite report instead.
#[derive(Error, Debug)]
pub enum BasaltError {
    // === Configuration Errors ===
    /// Run configuration file not found.
    #[error("config file not found: '{path}'")]
    ConfigNotFound { path: PathBuf },

    /// Run configuration failed to parse.
    #[error("config parse failed for '{path}': {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    /// Run configuration parsed but failed validation.
    #[error("invalid config: {}", .diagnostics.join("; "))]
    ConfigInvalid { diagnostics: Vec<String> },

    /// A credential required by the selected features is not set.
    #[error("required credential is not set: {name}")]
    CredentialMissing { name: String },

    // === Client Transport Errors ===
    /// The client process could not be started at all.
    #[error("failed to spawn '{program}': {detail}")]
    SpawnFailed { program: String, detail: String },

    /// A query or command exceeded its configured timeout.
    #[error("client call exceeded timeout of {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A query returned a non-zero exit code the caller did not tolerate.
    #[error("query failed with exit code {exitcode}: {stderr}")]
    QueryFailed { exitcode: i32, stderr: String },

    /// A host-level command returned an unexpected exit code.
    #[error("command failed with exit code {exitcode} (expected {expected}): {stderr}")]
    CommandFailed {
        exitcode: i32,
        expected: i32,
        stderr: String,
    },

    /// The scripted client has no response registered for a statement.
    #[error("no scripted response for: {statement}")]
    UnscriptedStatement { statement: String },

    // === Snapshot Errors ===
    /// Snapshot name contains characters that cannot form a store key.
    #[error("invalid snapshot name '{name}': {detail}")]
    SnapshotName { name: String, detail: String },

    // === Setup Errors ===
    /// Creating or populating a fixture table failed.
    #[error("fixture setup failed for '{fixture}': {detail}")]
    FixtureSetup { fixture: String, detail: String },

    /// Feature-level setup failed before any scenario could run.
    #[error("feature setup failed: {detail}")]
    FeatureSetup { detail: String },

    // === I/O and Serialization ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    /// Internal harness defect (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Blast radius of an error inside a running suite.
///
/// Scenario-level errors fail the enclosing scenario only; feature-level
/// errors abort the remaining scenarios of that feature; run-level errors
/// stop the whole invocation before any scenario executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Scenario,
    Feature,
    Run,
}

impl BasaltError {
    /// How far this error propagates when raised inside a suite.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                Severity::Run
            }
            Self::CredentialMissing { .. }
            | Self::FixtureSetup { .. }
            | Self::FeatureSetup { .. } => Severity::Feature,
            Self::SpawnFailed { .. }
            | Self::Timeout { .. }
            | Self::QueryFailed { .. }
            | Self::CommandFailed { .. }
            | Self::UnscriptedStatement { .. }
            | Self::SnapshotName { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Internal(_) => Severity::Scenario,
        }
    }

    /// Whether this error came back from the external system under test
    /// rather than from the harness itself.
    pub const fn is_external(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailed { .. }
                | Self::Timeout { .. }
                | Self::QueryFailed { .. }
                | Self::CommandFailed { .. }
        )
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a feature setup error.
    pub fn feature_setup(detail: impl Into<String>) -> Self {
        Self::FeatureSetup {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `BasaltError`.
pub type Result<T> = std::result::Result<T, BasaltError>;
