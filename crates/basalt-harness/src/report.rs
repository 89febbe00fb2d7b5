//! Run reports and artifacts.
//!
//! Every scenario the runner observes becomes one [`ScenarioRecord`];
//! a [`SuiteReport`] collects them for a run and serializes to a JSON
//! artifact. The report digest is canonical: it ignores the run id and
//! per-scenario timings, so two runs over the same suite state produce
//! the same digest and artifact diffing stays meaningful.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use basalt_error::Result;

use crate::snapshot::SnapshotMode;

/// Current report document schema version.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

// ─── Scenario Status ────────────────────────────────────────────────────

/// Terminal status of one observed scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Assertions held.
    Pass,
    /// An assertion failed; the rest of the suite keeps running.
    Fail,
    /// The scenario could not run to a verdict (transport or setup error).
    Error,
    /// The scenario body panicked; confined to that scenario.
    Panicked,
    /// Filtered out before execution (capability or feature selection).
    Skipped,
    /// Failed and was on the expected-failure list.
    Xfail,
    /// Passed but was on the expected-failure list; the list is stale.
    Xpass,
}

impl ScenarioStatus {
    pub const ALL: [ScenarioStatus; 7] = [
        ScenarioStatus::Pass,
        ScenarioStatus::Fail,
        ScenarioStatus::Error,
        ScenarioStatus::Panicked,
        ScenarioStatus::Skipped,
        ScenarioStatus::Xfail,
        ScenarioStatus::Xpass,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
            Self::Panicked => "panicked",
            Self::Skipped => "skipped",
            Self::Xfail => "xfail",
            Self::Xpass => "xpass",
        }
    }

    /// Whether this status makes the run exit non-zero.
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Error | Self::Panicked | Self::Xpass)
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Records ────────────────────────────────────────────────────────────

/// One observed scenario (or one matrix case within a scenario).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub feature: String,
    pub scenario: String,
    /// Matrix case label, e.g. `Int8-UInt64`, when the scenario is
    /// parameterized.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub case: Option<String>,
    pub status: ScenarioStatus,
    /// Failure or error text; absent on pass and skip.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    /// Requirement names this scenario verifies.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requirements: Vec<String>,
    pub elapsed_ms: u64,
}

impl ScenarioRecord {
    pub fn new(
        feature: impl Into<String>,
        scenario: impl Into<String>,
        status: ScenarioStatus,
    ) -> Self {
        Self {
            feature: feature.into(),
            scenario: scenario.into(),
            case: None,
            status,
            detail: None,
            requirements: Vec::new(),
            elapsed_ms: 0,
        }
    }

    #[must_use]
    pub fn case(mut self, case: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn requirements(mut self, requirements: Vec<String>) -> Self {
        self.requirements = requirements;
        self
    }

    #[must_use]
    pub const fn elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// `feature::scenario` or `feature::scenario/case`.
    pub fn full_name(&self) -> String {
        match &self.case {
            Some(case) => format!("{}::{}/{case}", self.feature, self.scenario),
            None => format!("{}::{}", self.feature, self.scenario),
        }
    }
}

/// Per-status counts over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
    pub panicked: usize,
    pub skipped: usize,
    pub xfail: usize,
    pub xpass: usize,
    pub total: usize,
}

// ─── Suite Report ───────────────────────────────────────────────────────

/// All records of one run plus the run's identifying metadata.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub run_id: String,
    pub client_identity: String,
    pub snapshot_mode: SnapshotMode,
    pub results: Vec<ScenarioRecord>,
}

impl SuiteReport {
    pub fn new(client_identity: impl Into<String>, snapshot_mode: SnapshotMode) -> Self {
        Self {
            run_id: generate_run_id(),
            client_identity: client_identity.into(),
            snapshot_mode,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, record: ScenarioRecord) {
        self.results.push(record);
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for record in &self.results {
            match record.status {
                ScenarioStatus::Pass => tally.pass += 1,
                ScenarioStatus::Fail => tally.fail += 1,
                ScenarioStatus::Error => tally.error += 1,
                ScenarioStatus::Panicked => tally.panicked += 1,
                ScenarioStatus::Skipped => tally.skipped += 1,
                ScenarioStatus::Xfail => tally.xfail += 1,
                ScenarioStatus::Xpass => tally.xpass += 1,
            }
            tally.total += 1;
        }
        tally
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|record| !record.status.is_failure())
    }

    /// Records grouped by feature, in feature name order.
    pub fn by_feature(&self) -> BTreeMap<&str, Vec<&ScenarioRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&ScenarioRecord>> = BTreeMap::new();
        for record in &self.results {
            grouped.entry(record.feature.as_str()).or_default().push(record);
        }
        grouped
    }

    /// Canonical content hash over the report's significant fields.
    ///
    /// # Invariant
    ///
    /// Two reports that differ only in `run_id` or per-record timings
    /// MUST produce the same digest.
    #[must_use]
    pub fn digest(&self) -> String {
        let canonical = CanonicalReport {
            schema_version: REPORT_SCHEMA_VERSION,
            client_identity: &self.client_identity,
            snapshot_mode: self.snapshot_mode.name(),
            results: self
                .results
                .iter()
                .map(|record| CanonicalRecord {
                    feature: &record.feature,
                    scenario: &record.scenario,
                    case: record.case.as_deref(),
                    status: record.status.name(),
                    detail: record.detail.as_deref(),
                    requirements: &record.requirements,
                })
                .collect(),
        };
        let json =
            serde_json::to_string(&canonical).expect("report serialization must not fail");
        sha256_hex(json.as_bytes())
    }

    /// Write the report document as pretty JSON, creating parent
    /// directories as needed.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let document = ReportDocument {
            schema_version: REPORT_SCHEMA_VERSION,
            run_id: &self.run_id,
            client_identity: &self.client_identity,
            snapshot_mode: self.snapshot_mode,
            digest: self.digest(),
            tally: self.tally(),
            results: &self.results,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');
        fs::write(path, json)?;
        info!(path = %path.display(), records = self.results.len(), "report_written");
        Ok(())
    }

    /// One-line human summary for runner output.
    pub fn summary(&self) -> String {
        let tally = self.tally();
        let mut out = String::new();
        let _ = write!(
            out,
            "total={} pass={} fail={} error={} panicked={} skipped={} xfail={} xpass={}",
            tally.total,
            tally.pass,
            tally.fail,
            tally.error,
            tally.panicked,
            tally.skipped,
            tally.xfail,
            tally.xpass
        );
        out
    }
}

/// On-disk shape of a report artifact.
#[derive(Serialize)]
struct ReportDocument<'a> {
    schema_version: u32,
    run_id: &'a str,
    client_identity: &'a str,
    snapshot_mode: SnapshotMode,
    digest: String,
    tally: Tally,
    results: &'a [ScenarioRecord],
}

// Copy without run_id or timings for canonical hashing.
#[derive(Serialize)]
struct CanonicalReport<'a> {
    schema_version: u32,
    client_identity: &'a str,
    snapshot_mode: &'a str,
    results: Vec<CanonicalRecord<'a>>,
}

#[derive(Serialize)]
struct CanonicalRecord<'a> {
    feature: &'a str,
    scenario: &'a str,
    case: Option<&'a str>,
    status: &'a str,
    detail: Option<&'a str>,
    requirements: &'a [String],
}

fn generate_run_id() -> String {
    let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => duration.as_secs(),
        Err(_) => 0,
    };
    format!("basalt-{timestamp}")
}

fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SuiteReport {
        let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);
        report.record(ScenarioRecord::new("final", "select_count", ScenarioStatus::Pass));
        report.record(
            ScenarioRecord::new("final", "select_limit", ScenarioStatus::Fail)
                .detail("outputs differ")
                .elapsed_ms(12),
        );
        report.record(
            ScenarioRecord::new("aggregates", "arg_min", ScenarioStatus::Pass)
                .case("Int8-UInt64")
                .requirements(vec!["RQ.Basalt.ArgMin".to_owned()]),
        );
        report
    }

    #[test]
    fn tally_counts_statuses() {
        let report = sample_report();
        let tally = report.tally();
        assert_eq!(tally.total, 3);
        assert_eq!(tally.pass, 2);
        assert_eq!(tally.fail, 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn failure_statuses() {
        assert!(ScenarioStatus::Fail.is_failure());
        assert!(ScenarioStatus::Error.is_failure());
        assert!(ScenarioStatus::Panicked.is_failure());
        assert!(ScenarioStatus::Xpass.is_failure());
        assert!(!ScenarioStatus::Pass.is_failure());
        assert!(!ScenarioStatus::Skipped.is_failure());
        assert!(!ScenarioStatus::Xfail.is_failure());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ScenarioStatus::Xfail).expect("serialize");
        assert_eq!(json, "\"xfail\"");
        let back: ScenarioStatus = serde_json::from_str("\"panicked\"").expect("deserialize");
        assert_eq!(back, ScenarioStatus::Panicked);
    }

    #[test]
    fn digest_ignores_run_id_and_timings() {
        let mut a = sample_report();
        let mut b = sample_report();
        a.run_id = "basalt-1".to_owned();
        b.run_id = "basalt-2".to_owned();
        b.results[1].elapsed_ms = 9_999;
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn digest_tracks_status_changes() {
        let a = sample_report();
        let mut b = sample_report();
        b.results[1].status = ScenarioStatus::Pass;
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn full_name_includes_case() {
        let record =
            ScenarioRecord::new("aggregates", "arg_min", ScenarioStatus::Pass).case("Int8-UInt64");
        assert_eq!(record.full_name(), "aggregates::arg_min/Int8-UInt64");
        let bare = ScenarioRecord::new("final", "select_count", ScenarioStatus::Pass);
        assert_eq!(bare.full_name(), "final::select_count");
    }

    #[test]
    fn write_json_round_trips_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("artifacts").join("report.json");
        let report = sample_report();
        report.write_json(&path).expect("write");

        let raw = std::fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["schema_version"], REPORT_SCHEMA_VERSION);
        assert_eq!(value["snapshot_mode"], "verify");
        assert_eq!(value["tally"]["total"], 3);
        assert_eq!(value["digest"], report.digest());
        let results: Vec<ScenarioRecord> =
            serde_json::from_value(value["results"].clone()).expect("records parse");
        assert_eq!(results, report.results);
    }

    #[test]
    fn by_feature_groups_in_name_order() {
        let report = sample_report();
        let grouped = report.by_feature();
        let features: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(features, vec!["aggregates", "final"]);
        assert_eq!(grouped["final"].len(), 2);
    }
}
