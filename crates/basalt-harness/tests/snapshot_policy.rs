//! Integration tests for the snapshot store's baseline policies.
//!
//! Validates:
//! - Verify mode fails explicitly on a missing baseline and writes nothing
//! - Bootstrap mode records once, then verifies on later runs
//! - Record mode always overwrites
//! - Any recorded candidate verifies against itself (round-trip)

use basalt_harness::snapshot::{
    normalize, sanitize_name, SnapshotMode, SnapshotOutcome, SnapshotStore,
};
use proptest::prelude::*;

fn store_in(dir: &tempfile::TempDir, mode: SnapshotMode) -> SnapshotStore {
    SnapshotStore::new(dir.path().join("snapshots"), mode)
}

// ─── Mode Semantics ─────────────────────────────────────────────────────

#[test]
fn verify_mode_makes_missing_baseline_explicit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir, SnapshotMode::Verify);

    let outcome = store
        .check("select_from_file_with_asterisk", "2\t1\n3\t2")
        .expect("check runs");
    assert_eq!(outcome, SnapshotOutcome::MissingBaseline);
    assert!(!outcome.passed());

    // Nothing was written behind the scenario's back.
    assert_eq!(
        store
            .read("select_from_file_with_asterisk")
            .expect("read runs"),
        None
    );
}

#[test]
fn bootstrap_records_once_then_verifies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir, SnapshotMode::Bootstrap);

    let first = store.check("create_table_with_globstar", "9\n").expect("check");
    assert_eq!(first, SnapshotOutcome::Recorded);

    let second = store.check("create_table_with_globstar", "9\n").expect("check");
    assert_eq!(second, SnapshotOutcome::Matched);

    // A later drifted candidate is a real mismatch, not a re-record.
    let third = store.check("create_table_with_globstar", "12\n").expect("check");
    match third {
        SnapshotOutcome::Mismatch { expected, actual } => {
            assert_eq!(expected, "9");
            assert_eq!(actual, "12");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}

#[test]
fn record_mode_overwrites_previous_baseline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recorder = store_in(&dir, SnapshotMode::Record);
    let verifier = store_in(&dir, SnapshotMode::Verify);

    recorder.check("select_count", "4\n").expect("record");
    recorder.check("select_count", "2\n").expect("re-record");

    let outcome = verifier.check("select_count", "2\n").expect("verify");
    assert_eq!(outcome, SnapshotOutcome::Matched);
}

#[test]
fn normalization_absorbs_line_ending_drift() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir, SnapshotMode::Bootstrap);

    store
        .check("kv_pairs", "{'a': '1'}\r\n{'b': '2'}  \r\n")
        .expect("record");
    let outcome = store
        .check("kv_pairs", "{'a': '1'}\n{'b': '2'}\n")
        .expect("verify");
    assert_eq!(outcome, SnapshotOutcome::Matched);
}

#[test]
fn sanitized_labels_make_valid_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir, SnapshotMode::Bootstrap);

    let name = format!("arg_min_{}", sanitize_name("Nullable(Int8),UInt64"));
    let outcome = store.check(&name, "0\t1\n").expect("check");
    assert_eq!(outcome, SnapshotOutcome::Recorded);
}

// ─── Round-Trip Property ────────────────────────────────────────────────

proptest! {
    #[test]
    fn recorded_candidate_always_verifies(candidate in "\\PC{0,120}") {
        let dir = tempfile::tempdir().expect("tempdir");
        let bootstrap = store_in(&dir, SnapshotMode::Bootstrap);
        let verify = store_in(&dir, SnapshotMode::Verify);

        prop_assert_eq!(
            bootstrap.check("round_trip", &candidate).expect("record"),
            SnapshotOutcome::Recorded
        );
        prop_assert_eq!(
            verify.check("round_trip", &candidate).expect("verify"),
            SnapshotOutcome::Matched
        );
        prop_assert_eq!(
            verify.read("round_trip").expect("read"),
            Some(normalize(&candidate))
        );
    }
}
