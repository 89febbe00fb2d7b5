//! Regression feature suites for the Basalt conformance harness.
//!
//! Each feature module enumerates scenarios over provisioned fixtures
//! and returns per-case verdicts; [`runner`] owns feature setup, the
//! bounded scenario pool, and report assembly. Scenarios receive an
//! explicit [`SuiteContext`] carrying the client, snapshot store, and
//! run configuration; nothing reaches for ambient or global state.
//!
//! Features:
//!
//! - [`final_modifier`]: `FINAL` vs `force_select_final` equivalence,
//!   with negative controls.
//! - [`parquet_glob`]: Parquet imports through glob patterns, checked
//!   against snapshot baselines.
//! - [`aggregates`]: aggregate functions over a datatype matrix.
//! - [`key_value`]: key-value pair extraction from column input.
//! - [`ssl_config`]: keystore provisioning and secure port wiring via
//!   host-level commands.

use std::sync::atomic::{AtomicU64, Ordering};

use basalt_client::{Settings, SqlClient};
use basalt_error::Result;
use basalt_harness::config::RunConfig;
use basalt_harness::snapshot::{SnapshotOutcome, SnapshotStore};

pub mod aggregates;
pub mod final_modifier;
pub mod fixtures;
pub mod key_value;
pub mod parquet_glob;
pub mod runner;
pub mod ssl_config;

// ─── Suite Context ──────────────────────────────────────────────────────

/// Everything a scenario needs, passed explicitly.
///
/// The context is shared by reference across pooled scenario threads;
/// the only mutable piece is the name counter, which hands out unique
/// identifiers for tables a scenario creates and drops itself.
pub struct SuiteContext<'a> {
    pub client: &'a dyn SqlClient,
    pub snapshots: &'a SnapshotStore,
    pub config: &'a RunConfig,
    names: AtomicU64,
}

impl<'a> SuiteContext<'a> {
    pub fn new(
        client: &'a dyn SqlClient,
        snapshots: &'a SnapshotStore,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            client,
            snapshots,
            config,
            names: AtomicU64::new(0),
        }
    }

    /// Identifier unique within this run, e.g. `parquet_import_3`.
    pub fn unique_name(&self, prefix: &str) -> String {
        let seq = self.names.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}_{seq}")
    }

    /// Run `sql` and check its trimmed output against the baseline
    /// stored under `name`, producing a case verdict.
    pub fn check_snapshot(&self, name: &str, sql: &str) -> Result<CaseVerdict> {
        let out = self.client.query_ok(sql, &Settings::new())?;
        let outcome = self.snapshots.check(name, out.trimmed())?;
        Ok(match outcome {
            SnapshotOutcome::Matched | SnapshotOutcome::Recorded => {
                CaseVerdict::pass().for_case(name)
            }
            SnapshotOutcome::Mismatch { expected, actual } => CaseVerdict::fail(format!(
                "snapshot '{name}' differs\nexpected:\n{expected}\nactual:\n{actual}"
            ))
            .for_case(name),
            SnapshotOutcome::MissingBaseline => CaseVerdict::fail(format!(
                "no baseline for snapshot '{name}'; run once with snapshot mode 'record' or 'bootstrap'"
            ))
            .for_case(name),
        })
    }
}

// ─── Case Verdicts ──────────────────────────────────────────────────────

/// Outcome of one case inside a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Fail,
    Skip,
}

/// One case's verdict as a scenario reports it. Assertion failures are
/// verdicts, not errors; only transport and setup trouble escapes a
/// scenario as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseVerdict {
    /// Case label when the scenario is parameterized; `None` for a
    /// scenario with a single check.
    pub case: Option<String>,
    pub status: CaseStatus,
    pub detail: Option<String>,
}

impl CaseVerdict {
    pub const fn pass() -> Self {
        Self {
            case: None,
            status: CaseStatus::Pass,
            detail: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            case: None,
            status: CaseStatus::Fail,
            detail: Some(detail.into()),
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            case: None,
            status: CaseStatus::Skip,
            detail: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn for_case(mut self, case: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self
    }
}
