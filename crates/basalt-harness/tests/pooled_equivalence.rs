//! Pool plus equivalence checker, end to end against a scripted client.
//!
//! Validates:
//! - Pairs run on a bounded pool and results come back in submission order
//! - A panicking check is confined to its own slot
//! - Relation verdicts (match, mismatch, negative control) survive pooling

use basalt_client::scripted::ScriptedClient;
use basalt_client::{QueryOutput, Settings};
use basalt_error::BasaltError;
use basalt_harness::compose::SelectSpec;
use basalt_harness::equivalence::{
    check_pair, EquivalenceOutcome, EquivalencePair, EquivalenceReport, PairExpectation,
};
use basalt_harness::pool::{run_bounded, BoxedCheck, TaskOutcome};

fn forced() -> Settings {
    Settings::one("force_select_final", 1)
}

fn scripted_fixture() -> ScriptedClient {
    ScriptedClient::new()
        .on_query("SELECT count() FROM t FINAL", QueryOutput::ok("2\n"))
        .on_query_with("SELECT count() FROM t", &forced(), QueryOutput::ok("2\n"))
        .on_query(
            "SELECT * FROM t FINAL ORDER BY id LIMIT 3",
            QueryOutput::ok("1\n2\n"),
        )
        .on_query_with(
            "SELECT * FROM t ORDER BY id LIMIT 3",
            &forced(),
            QueryOutput::ok("1\n2\n"),
        )
        .on_query("SELECT count() FROM t FINAL WHERE x > 10", QueryOutput::ok("1\n"))
        .on_query_with(
            "SELECT count() FROM t WHERE x > 10",
            &forced(),
            QueryOutput::ok("3\n"),
        )
        .on_query_with(
            "SELECT count() FROM t WHERE x > 5",
            &forced(),
            QueryOutput::ok("5\n"),
        )
}

fn fixture_pairs() -> Vec<EquivalencePair> {
    vec![
        EquivalencePair::from_selects(
            "select_count",
            &SelectSpec::new("count()", "t").final_modifier(true),
            Settings::new(),
            &SelectSpec::new("count()", "t"),
            forced(),
            PairExpectation::MustMatch,
        ),
        EquivalencePair::from_selects(
            "select_limit",
            &SelectSpec::new("*", "t").final_modifier(true).order_by("id").limit(3),
            Settings::new(),
            &SelectSpec::new("*", "t").order_by("id").limit(3),
            forced(),
            PairExpectation::MustMatch,
        ),
        EquivalencePair::from_selects(
            "select_where",
            &SelectSpec::new("count()", "t").final_modifier(true).where_clause("x > 10"),
            Settings::new(),
            &SelectSpec::new("count()", "t").where_clause("x > 10"),
            forced(),
            PairExpectation::MustMatch,
        ),
        EquivalencePair::from_selects(
            "select_where_negative",
            &SelectSpec::new("count()", "t").final_modifier(true).where_clause("x > 10"),
            Settings::new(),
            &SelectSpec::new("count()", "t").where_clause("x > 5"),
            forced(),
            PairExpectation::MustDiffer,
        ),
    ]
}

#[test]
fn pooled_pairs_keep_order_and_confine_panics() {
    let client = scripted_fixture();
    let client_ref = &client;

    type CheckResult = Result<EquivalenceReport, BasaltError>;
    let mut jobs: Vec<(String, BoxedCheck<'_, CheckResult>)> = Vec::new();
    for pair in fixture_pairs() {
        let id = pair.id.clone();
        jobs.push((id, Box::new(move || check_pair(client_ref, &pair))));
    }
    // A scenario body blowing up mid-suite must not take the pool down.
    jobs.insert(
        1,
        (
            "exploding_scenario".to_owned(),
            Box::new(|| panic!("scenario body exploded")),
        ),
    );

    let results = run_bounded(3, jobs);

    let ids: Vec<&str> = results.iter().map(|result| result.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "select_count",
            "exploding_scenario",
            "select_limit",
            "select_where",
            "select_where_negative"
        ]
    );

    let outcome_of = |index: usize| -> &EquivalenceReport {
        match &results[index].outcome {
            TaskOutcome::Completed(Ok(report)) => report,
            other => panic!("job {index} should complete, got {other:?}"),
        }
    };

    assert_eq!(outcome_of(0).outcome, EquivalenceOutcome::Pass);
    assert_eq!(outcome_of(2).outcome, EquivalenceOutcome::Pass);
    assert_eq!(outcome_of(3).outcome, EquivalenceOutcome::Mismatch);
    assert_eq!(outcome_of(4).outcome, EquivalenceOutcome::Pass);

    match &results[1].outcome {
        TaskOutcome::Panicked { message } => assert!(message.contains("exploded")),
        other => panic!("expected panic capture, got {other:?}"),
    }

    // Four executed pairs, two queries each; the panicking job never
    // reached the client.
    assert_eq!(client.calls().len(), 8);
}

#[test]
fn mismatch_detail_survives_pooling() {
    let client = scripted_fixture();
    let pairs = fixture_pairs();

    let report = check_pair(&client, &pairs[2]).expect("pair runs");
    assert_eq!(report.outcome, EquivalenceOutcome::Mismatch);
    let detail = report.failure_detail().expect("detail");
    assert!(detail.contains("left:\n1"));
    assert!(detail.contains("right:\n3"));
}
