//! Run configuration.
//!
//! One JSON document configures a run: how to reach the cluster, the
//! snapshot policy, pool width, feature selection, credentials for
//! scenarios that need them, and the expected-failure list. Every field
//! has a default, so `{}` is a valid config and the runner works out of
//! the box against a local node.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use basalt_client::shell::ShellClient;
use basalt_error::{BasaltError, Result};

use crate::snapshot::{SnapshotMode, SnapshotStore};

/// Per-query wall-clock budget when the config does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Pool width when the config does not set one.
pub const DEFAULT_WORKERS: usize = 3;

// ─── Sections ───────────────────────────────────────────────────────────

/// How to reach the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Client binary to spawn.
    pub program: String,
    /// Arguments placed before per-call flags (host, port, user).
    pub args: Vec<String>,
    /// Per-query wall-clock budget; the transport kills the child at
    /// the deadline.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program: "basalt-client".to_owned(),
            args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Snapshot store location and missing-baseline policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub root: PathBuf,
    pub mode: SnapshotMode,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("snapshots"),
            mode: SnapshotMode::Verify,
        }
    }
}

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

// ─── Run Config ─────────────────────────────────────────────────────────

/// Full configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub client: ClientConfig,
    pub snapshot: SnapshotConfig,
    pub pool: PoolConfig,
    /// Features to run; empty means all.
    pub features: Vec<String>,
    /// Named secrets (keystore passwords and the like). Scenarios
    /// declare what they need and [`RunConfig::preflight`] checks it
    /// before anything executes.
    pub credentials: BTreeMap<String, String>,
    /// `feature::scenario` (or `feature::scenario/case`) names expected
    /// to fail, each with a reason.
    pub expected_failures: BTreeMap<String, String>,
    /// Where report artifacts land; `artifacts` when unset.
    pub artifacts_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Load a config document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(BasaltError::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(error) => return Err(error.into()),
        };
        let config: Self = serde_json::from_str(&raw).map_err(|error| BasaltError::ConfigParse {
            path: path.to_path_buf(),
            detail: error.to_string(),
        })?;
        debug!(path = %path.display(), "config_loaded");
        Ok(config)
    }

    /// Structural diagnostics; an empty list means the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut diagnostics = Vec::new();
        if self.client.program.trim().is_empty() {
            diagnostics.push("client.program must not be empty".to_owned());
        }
        if self.client.timeout_secs == 0 {
            diagnostics.push("client.timeout_secs must be at least 1".to_owned());
        }
        if self.pool.workers == 0 {
            diagnostics.push("pool.workers must be at least 1".to_owned());
        }
        if self.snapshot.root.as_os_str().is_empty() {
            diagnostics.push("snapshot.root must not be empty".to_owned());
        }
        for (name, reason) in &self.expected_failures {
            if reason.trim().is_empty() {
                diagnostics.push(format!("expected_failures[\"{name}\"] needs a reason"));
            }
        }
        diagnostics
    }

    /// Fail fast when a scenario's named credentials are not configured.
    pub fn preflight(&self, required: &[&str]) -> Result<()> {
        for name in required {
            if !self.credentials.contains_key(*name) {
                return Err(BasaltError::CredentialMissing {
                    name: (*name).to_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn credential(&self, name: &str) -> Option<&str> {
        self.credentials.get(name).map(String::as_str)
    }

    /// Whether a feature is selected by this config.
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.is_empty() || self.features.iter().any(|feature| feature == name)
    }

    /// Reason a scenario is expected to fail, if it is on the list.
    pub fn expected_failure(&self, full_name: &str) -> Option<&str> {
        self.expected_failures.get(full_name).map(String::as_str)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("artifacts"))
    }

    /// Transport configured from the client section.
    pub fn shell_client(&self) -> ShellClient {
        ShellClient::new(self.client.program.clone(), self.client.timeout_secs)
            .with_base_args(self.client.args.clone())
    }

    /// Snapshot store configured from the snapshot section.
    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.snapshot.root.clone(), self.snapshot.mode)
    }
}
