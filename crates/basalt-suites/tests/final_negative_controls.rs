//! The whole final feature against a client that answers every query
//! identically, which is exactly the world a broken comparator would
//! see.
//!
//! Validates:
//! - Fixture provisioning and all twenty scenarios run to verdicts
//! - Every positive scenario passes when outputs agree
//! - Every negative control fails, flagging the comparison logic
//! - Per-case record counts match the fixture and join-type matrices

use basalt_client::scripted::ScriptedClient;
use basalt_client::QueryOutput;
use basalt_harness::config::RunConfig;
use basalt_harness::report::{ScenarioStatus, SuiteReport};
use basalt_harness::snapshot::{SnapshotMode, SnapshotStore};
use basalt_suites::runner::{run_feature, Feature};
use basalt_suites::SuiteContext;

#[test]
fn identical_outputs_pass_positives_and_trip_every_negative_control() {
    let client = ScriptedClient::new().with_default(QueryOutput::ok("same\n"));
    let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
    let config = RunConfig::default();
    let ctx = SuiteContext::new(&client, &store, &config);
    let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);

    run_feature(&ctx, Feature::Final, &mut report);

    let tally = report.tally();
    assert_eq!(tally.total, 491);
    assert_eq!(tally.pass, 402);
    assert_eq!(tally.fail, 89);
    assert_eq!(tally.error, 0);
    assert_eq!(tally.panicked, 0);
    assert_eq!(tally.skipped, 0);

    for record in &report.results {
        if record.status == ScenarioStatus::Fail {
            assert!(
                record.scenario.ends_with("_negative"),
                "unexpected failure in {}",
                record.full_name()
            );
            assert!(record
                .detail
                .as_deref()
                .expect("failure detail")
                .contains("comparison logic is suspect"));
        } else {
            assert_eq!(record.status, ScenarioStatus::Pass);
            assert!(!record.scenario.ends_with("_negative"));
        }
    }
}

#[test]
fn case_counts_follow_the_fixture_and_join_matrices() {
    let client = ScriptedClient::new().with_default(QueryOutput::ok("same\n"));
    let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
    let config = RunConfig::default();
    let ctx = SuiteContext::new(&client, &store, &config);
    let mut report = SuiteReport::new("scripted", SnapshotMode::Verify);

    run_feature(&ctx, Feature::Final, &mut report);

    let count_for = |scenario: &str| {
        report
            .results
            .iter()
            .filter(|record| record.scenario == scenario)
            .count()
    };

    // Six collapsing core fixtures.
    assert_eq!(count_for("simple_select"), 6);
    assert_eq!(count_for("select_count_negative"), 6);
    // Fourteen table-join strategies per core.
    assert_eq!(count_for("select_join_clause"), 84);
    // Eleven subquery-join strategies per core, three forced-arm
    // decorations each.
    assert_eq!(count_for("select_join_clause_select"), 198);
    // Seven count-sensitive strategies per core.
    assert_eq!(count_for("select_join_clause_select_negative"), 42);
    // Eleven nested-join strategies per core.
    assert_eq!(count_for("select_multiple_join_clause_select"), 66);
    // UNION ALL and UNION DISTINCT per core.
    assert_eq!(count_for("select_union_clause"), 12);
    // The versioned collapsing core sits out the WITH negative.
    assert_eq!(count_for("select_with_clause_negative"), 5);

    let join_cases: Vec<&str> = report
        .results
        .iter()
        .filter(|record| record.scenario == "select_join_clause")
        .filter_map(|record| record.case.as_deref())
        .collect();
    assert_eq!(join_cases.len(), 84);
    assert!(join_cases.contains(&"replacing_merge_tree_core_asof"));
    assert!(join_cases.contains(&"replicated_replacing_merge_tree_core_cross"));
}
