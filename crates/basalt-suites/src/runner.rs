//! Feature orchestration.
//!
//! A run walks the selected features in a fixed order. Each feature
//! provisions its fixtures once, then dispatches its scenarios over the
//! bounded pool and waits for all of them before concluding. Failure
//! containment follows the severity ladder: a failed assertion is one
//! failed record, a scenario error or panic ends that scenario only,
//! and a setup or credential failure ends the feature, skipping its
//! scenarios. Only a broken config stops the run itself.

use std::time::Instant;

use tracing::{debug, info, warn};

use basalt_client::SqlClient;
use basalt_error::{BasaltError, Result};
use basalt_harness::capability::FixtureTable;
use basalt_harness::config::RunConfig;
use basalt_harness::pool::{run_bounded, BoxedCheck, TaskOutcome, TaskResult};
use basalt_harness::report::{ScenarioRecord, ScenarioStatus, SuiteReport};
use basalt_requirements::traceability::{requirements_for, validate_coverage};

use crate::fixtures::{self, KeyValueTables};
use crate::{aggregates, final_modifier, key_value, parquet_glob, ssl_config};
use crate::{CaseStatus, CaseVerdict, SuiteContext};

// ─── Features ───────────────────────────────────────────────────────────

/// Feature suites this runner knows about, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Final,
    Parquet,
    Aggregates,
    KeyValue,
    Ssl,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Final,
        Feature::Parquet,
        Feature::Aggregates,
        Feature::KeyValue,
        Feature::Ssl,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Final => "final",
            Self::Parquet => "parquet",
            Self::Aggregates => "aggregates",
            Self::KeyValue => "key_value",
            Self::Ssl => "ssl",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.name() == name)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixtures a feature's setup provisioned for its scenarios.
#[derive(Debug, Clone, Default)]
pub struct FeatureState {
    /// FINAL-equivalence fixture tables, core and duplicate roles.
    pub tables: Vec<FixtureTable>,
    /// The wide typed table for aggregate matrices.
    pub aggregate_table: Option<FixtureTable>,
    /// Key-value input tables.
    pub key_value_tables: Option<KeyValueTables>,
}

// ─── Scenario Catalog ───────────────────────────────────────────────────

/// A scenario body: runs its checks and reports one verdict per case.
pub type ScenarioFn = fn(&SuiteContext<'_>, &FeatureState) -> Result<Vec<CaseVerdict>>;

pub struct Scenario {
    pub name: &'static str,
    pub run: ScenarioFn,
}

/// Scenarios of one feature, in dispatch (and report) order. The
/// catalog and the requirement coverage table list the same scenarios;
/// a mismatch is caught in tests.
pub fn scenario_catalog(feature: Feature) -> Vec<Scenario> {
    match feature {
        Feature::Final => vec![
            Scenario { name: "simple_select", run: final_modifier::simple_select },
            Scenario { name: "simple_select_negative", run: final_modifier::simple_select_negative },
            Scenario { name: "select_count", run: final_modifier::select_count },
            Scenario { name: "select_count_negative", run: final_modifier::select_count_negative },
            Scenario { name: "select_limit", run: final_modifier::select_limit },
            Scenario { name: "select_limit_negative", run: final_modifier::select_limit_negative },
            Scenario { name: "select_group_by", run: final_modifier::select_group_by },
            Scenario { name: "select_group_by_negative", run: final_modifier::select_group_by_negative },
            Scenario { name: "select_distinct", run: final_modifier::select_distinct },
            Scenario { name: "select_distinct_negative", run: final_modifier::select_distinct_negative },
            Scenario { name: "select_where", run: final_modifier::select_where },
            Scenario { name: "select_where_negative", run: final_modifier::select_where_negative },
            Scenario { name: "select_join_clause", run: final_modifier::select_join_clause },
            Scenario { name: "select_join_clause_select", run: final_modifier::select_join_clause_select },
            Scenario {
                name: "select_join_clause_select_negative",
                run: final_modifier::select_join_clause_select_negative,
            },
            Scenario {
                name: "select_multiple_join_clause_select",
                run: final_modifier::select_multiple_join_clause_select,
            },
            Scenario { name: "select_union_clause", run: final_modifier::select_union_clause },
            Scenario { name: "select_union_clause_negative", run: final_modifier::select_union_clause_negative },
            Scenario { name: "select_with_clause", run: final_modifier::select_with_clause },
            Scenario { name: "select_with_clause_negative", run: final_modifier::select_with_clause_negative },
        ],
        Feature::Parquet => vec![
            Scenario { name: "glob", run: parquet_glob::glob },
            Scenario { name: "nested_glob", run: parquet_glob::nested_glob },
        ],
        Feature::Aggregates => vec![
            Scenario { name: "min", run: aggregates::min },
            Scenario { name: "arg_min", run: aggregates::arg_min },
        ],
        Feature::KeyValue => vec![
            Scenario { name: "column_input", run: key_value::column_input },
            Scenario {
                name: "column_input_special_characters",
                run: key_value::column_input_special_characters,
            },
        ],
        Feature::Ssl => vec![
            Scenario { name: "certificate_provisioning", run: ssl_config::certificate_provisioning },
            Scenario { name: "secure_client_port", run: ssl_config::secure_client_port },
        ],
    }
}

// ─── Execution ──────────────────────────────────────────────────────────

fn feature_setup(ctx: &SuiteContext<'_>, feature: Feature) -> Result<FeatureState> {
    let mut state = FeatureState::default();
    match feature {
        Feature::Final => state.tables = fixtures::provision_final_tables(ctx)?,
        Feature::Parquet => fixtures::seed_parquet_files(ctx)?,
        Feature::Aggregates => {
            state.aggregate_table = Some(fixtures::provision_aggregate_table(ctx)?);
        }
        Feature::KeyValue => {
            state.key_value_tables = Some(fixtures::provision_key_value_tables(ctx)?);
        }
        Feature::Ssl => ctx.config.preflight(&ssl_config::REQUIRED_CREDENTIALS)?,
    }
    Ok(state)
}

struct ScenarioRun {
    elapsed_ms: u64,
    verdicts: Result<Vec<CaseVerdict>>,
}

/// Run one feature end to end, appending its records to the report.
pub fn run_feature(ctx: &SuiteContext<'_>, feature: Feature, report: &mut SuiteReport) {
    let scenarios = scenario_catalog(feature);
    info!(feature = feature.name(), scenarios = scenarios.len(), "feature_start");

    let state = match feature_setup(ctx, feature) {
        Ok(state) => state,
        Err(error) => {
            warn!(feature = feature.name(), %error, "feature_setup_failed");
            report.record(
                ScenarioRecord::new(feature.name(), "setup", ScenarioStatus::Error)
                    .detail(error.to_string()),
            );
            for scenario in &scenarios {
                report.record(
                    ScenarioRecord::new(feature.name(), scenario.name, ScenarioStatus::Skipped)
                        .detail("feature setup failed"),
                );
            }
            return;
        }
    };

    let state = &state;
    let jobs: Vec<(String, BoxedCheck<'_, ScenarioRun>)> = scenarios
        .iter()
        .map(|scenario| {
            let run = scenario.run;
            let job: BoxedCheck<'_, ScenarioRun> = Box::new(move || {
                let started = Instant::now();
                let verdicts = run(ctx, state);
                ScenarioRun {
                    elapsed_ms: elapsed_ms(started),
                    verdicts,
                }
            });
            (scenario.name.to_owned(), job)
        })
        .collect();

    for result in run_bounded(ctx.config.pool.workers, jobs) {
        append_records(ctx, feature, result, report);
    }
    debug!(feature = feature.name(), "feature_done");
}

fn append_records(
    ctx: &SuiteContext<'_>,
    feature: Feature,
    result: TaskResult<ScenarioRun>,
    report: &mut SuiteReport,
) {
    let scenario = result.id;
    let requirements = requirements_for(feature.name(), &scenario);
    match result.outcome {
        // A panic is never an expected failure; the list covers
        // assertion outcomes, not harness crashes.
        TaskOutcome::Panicked { message } => {
            report.record(
                ScenarioRecord::new(feature.name(), scenario.as_str(), ScenarioStatus::Panicked)
                    .detail(format!("scenario panicked: {message}"))
                    .requirements(requirements),
            );
        }
        TaskOutcome::Completed(run) => match run.verdicts {
            Err(error) => {
                let record =
                    ScenarioRecord::new(feature.name(), scenario.as_str(), ScenarioStatus::Error)
                        .detail(error.to_string())
                        .requirements(requirements)
                        .elapsed_ms(run.elapsed_ms);
                report.record(apply_expectation(ctx, record));
            }
            Ok(verdicts) if verdicts.is_empty() => {
                report.record(
                    ScenarioRecord::new(feature.name(), scenario.as_str(), ScenarioStatus::Skipped)
                        .detail("no eligible fixtures")
                        .requirements(requirements)
                        .elapsed_ms(run.elapsed_ms),
                );
            }
            Ok(verdicts) => {
                for verdict in verdicts {
                    let status = match verdict.status {
                        CaseStatus::Pass => ScenarioStatus::Pass,
                        CaseStatus::Fail => ScenarioStatus::Fail,
                        CaseStatus::Skip => ScenarioStatus::Skipped,
                    };
                    let mut record =
                        ScenarioRecord::new(feature.name(), scenario.as_str(), status)
                            .requirements(requirements.clone())
                            .elapsed_ms(run.elapsed_ms);
                    if let Some(case) = verdict.case {
                        record = record.case(case);
                    }
                    if let Some(detail) = verdict.detail {
                        record = record.detail(detail);
                    }
                    report.record(apply_expectation(ctx, record));
                }
            }
        },
    }
}

/// Rewrite a record's status when it is on the expected-failure list.
/// The list is keyed by `feature::scenario/case` or, for a whole
/// scenario, `feature::scenario`.
fn apply_expectation(ctx: &SuiteContext<'_>, mut record: ScenarioRecord) -> ScenarioRecord {
    let scenario_name = format!("{}::{}", record.feature, record.scenario);
    let Some(reason) = ctx
        .config
        .expected_failure(&record.full_name())
        .or_else(|| ctx.config.expected_failure(&scenario_name))
    else {
        return record;
    };

    match record.status {
        ScenarioStatus::Fail | ScenarioStatus::Error => {
            let reason = format!("expected failure: {reason}");
            record.detail = Some(match record.detail.take() {
                Some(detail) => format!("{reason}\n{detail}"),
                None => reason,
            });
            record.status = ScenarioStatus::Xfail;
        }
        ScenarioStatus::Pass => {
            record.detail = Some(format!("expected to fail ({reason}) but passed"));
            record.status = ScenarioStatus::Xpass;
        }
        _ => {}
    }
    record
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run every selected feature and return the report.
///
/// The config is validated first and a broken one is fatal to the run;
/// so is a coverage table that lost referential integrity, since the
/// report's requirement annotations would be lies.
pub fn run_suite(client: &dyn SqlClient, config: &RunConfig) -> Result<SuiteReport> {
    let diagnostics = config.validate();
    if !diagnostics.is_empty() {
        return Err(BasaltError::ConfigInvalid { diagnostics });
    }
    let coverage = validate_coverage();
    if !coverage.is_empty() {
        return Err(BasaltError::internal(format!(
            "coverage table lost integrity: {}",
            coverage.join("; ")
        )));
    }

    let snapshots = config.snapshot_store();
    let ctx = SuiteContext::new(client, &snapshots, config);
    let mut report = SuiteReport::new(client.identity(), config.snapshot.mode);
    for feature in Feature::ALL {
        if !config.feature_enabled(feature.name()) {
            debug!(feature = feature.name(), "feature_not_selected");
            continue;
        }
        run_feature(&ctx, feature, &mut report);
    }
    info!(summary = %report.summary(), "suite_complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_client::scripted::ScriptedClient;
    use basalt_client::QueryOutput;
    use basalt_harness::snapshot::{SnapshotMode, SnapshotStore};
    use basalt_requirements::traceability::COVERAGE;

    #[test]
    fn feature_names_parse_back() {
        for feature in Feature::ALL {
            assert_eq!(Feature::parse(feature.name()), Some(feature));
        }
        assert_eq!(Feature::parse("window_views"), None);
    }

    #[test]
    fn catalog_and_coverage_table_list_the_same_scenarios() {
        let expected: Vec<(&str, &str)> = COVERAGE
            .iter()
            .map(|row| (row.feature, row.scenario))
            .collect();
        let mut actual = Vec::new();
        for feature in Feature::ALL {
            for scenario in scenario_catalog(feature) {
                actual.push((feature.name(), scenario.name));
            }
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn setup_failure_errors_the_feature_and_skips_its_scenarios() {
        let client = ScriptedClient::new();
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);
        let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);

        run_feature(&ctx, Feature::Final, &mut report);

        assert_eq!(report.results.len(), 21);
        assert_eq!(report.results[0].scenario, "setup");
        assert_eq!(report.results[0].status, ScenarioStatus::Error);
        assert!(report.results[1..]
            .iter()
            .all(|r| r.status == ScenarioStatus::Skipped));
        assert_eq!(report.results[1].scenario, "simple_select");
    }

    #[test]
    fn missing_credentials_stop_ssl_before_any_command() {
        let client = ScriptedClient::new().with_default(QueryOutput::ok(""));
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);
        let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);

        run_feature(&ctx, Feature::Ssl, &mut report);

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].status, ScenarioStatus::Error);
        let detail = report.results[0].detail.as_deref().expect("detail");
        assert!(detail.contains("keystore_password"));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn expected_failures_rewrite_fail_and_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient::new().with_default(QueryOutput::ok("kv\n"));
        // Verify mode with an empty store: both snapshots miss their
        // baselines and fail.
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Verify);
        let mut config = RunConfig::default();
        config.expected_failures.insert(
            "key_value::column_input".to_owned(),
            "extractor regressed upstream".to_owned(),
        );
        let ctx = SuiteContext::new(&client, &store, &config);
        let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);

        run_feature(&ctx, Feature::KeyValue, &mut report);

        assert_eq!(report.results.len(), 4);
        // All three column_input cases inherit the scenario-level entry.
        for record in &report.results[..3] {
            assert_eq!(record.status, ScenarioStatus::Xfail);
        }
        assert!(report.results[0]
            .detail
            .as_deref()
            .expect("detail")
            .starts_with("expected failure: extractor regressed upstream"));
        assert_eq!(report.results[3].status, ScenarioStatus::Fail);

        // The same scenario passing under Bootstrap makes the list stale.
        let store = SnapshotStore::new(dir.path().join("fresh"), SnapshotMode::Bootstrap);
        let ctx = SuiteContext::new(&client, &store, &config);
        let mut report = SuiteReport::new("scripted", SnapshotMode::Bootstrap);
        run_feature(&ctx, Feature::KeyValue, &mut report);
        assert_eq!(report.results[0].status, ScenarioStatus::Xpass);
        assert!(!report.all_passed());
    }

    #[test]
    fn records_carry_requirement_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient::new().with_default(QueryOutput::ok("kv\n"));
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Bootstrap);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);
        let mut report = SuiteReport::new("scripted", SnapshotMode::Bootstrap);

        run_feature(&ctx, Feature::KeyValue, &mut report);

        assert!(report.results[0]
            .requirements
            .iter()
            .any(|name| name == "RQ.SRS-033.Basalt.ExtractKeyValuePairs"));
    }

    #[test]
    fn broken_config_is_fatal_to_the_run() {
        let client = ScriptedClient::new();
        let mut config = RunConfig::default();
        config.pool.workers = 0;
        let err = run_suite(&client, &config).unwrap_err();
        assert!(matches!(err, BasaltError::ConfigInvalid { .. }));
    }

    #[test]
    fn feature_selection_limits_the_run_and_digest_is_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient::new().with_default(QueryOutput::ok("kv\n"));
        let mut config = RunConfig::default();
        config.features = vec!["key_value".to_owned()];
        config.snapshot.root = dir.path().to_path_buf();
        config.snapshot.mode = SnapshotMode::Bootstrap;

        let first = run_suite(&client, &config).expect("run");
        assert_eq!(first.results.len(), 4);
        assert!(first.results.iter().all(|r| r.feature == "key_value"));
        assert!(first.all_passed());

        let second = run_suite(&client, &config).expect("run again");
        assert_eq!(first.digest(), second.digest());
    }
}
