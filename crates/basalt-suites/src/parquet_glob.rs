//! Parquet glob-import scenarios.
//!
//! Each pattern is exercised twice: reading through the `file()` table
//! function directly, and importing the same glob into a MergeTree table
//! with `CREATE TABLE ... AS SELECT`. Both reads carry `ORDER BY j` and
//! land in snapshots, so a pattern that silently matches a different
//! file set shows up as a baseline diff. Imported tables get a unique
//! name per run and are dropped before the scenario concludes.

use basalt_client::Settings;
use basalt_error::Result;
use basalt_harness::compose::{create_table_as, sql_quote, SelectSpec};

use crate::runner::FeatureState;
use crate::{CaseVerdict, SuiteContext};

/// Flat-directory patterns over `glob/t1.parquet`, `glob/t2.parquet`
/// and `glob/sub/t3.parquet`.
pub const GLOB_PATTERNS: [(&str, &str); 4] = [
    ("asterisk", "glob/*.parquet"),
    ("globstar", "glob/**/*.parquet"),
    ("question_mark", "glob/t?.parquet"),
    ("range", "glob/t{1..2}.parquet"),
];

/// Patterns that have to descend through intermediate directories.
pub const NESTED_GLOB_PATTERNS: [(&str, &str); 4] = [
    ("directory_asterisk", "nested/*/inner/*.parquet"),
    ("directory_globstar", "nested/**/*.parquet"),
    ("file_globstar", "nested/**/a.parquet"),
    ("single_directory", "nested/first/*/a.parquet"),
];

/// Ordered read of one glob through the `file()` table function.
pub fn file_select(pattern: &str) -> SelectSpec {
    SelectSpec::new("*", format!("file({}, Parquet)", sql_quote(pattern))).order_by("j")
}

// ─── Scenarios ──────────────────────────────────────────────────────────

pub fn glob(ctx: &SuiteContext<'_>, _state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    run_patterns(ctx, &GLOB_PATTERNS)
}

pub fn nested_glob(ctx: &SuiteContext<'_>, _state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    run_patterns(ctx, &NESTED_GLOB_PATTERNS)
}

fn run_patterns(ctx: &SuiteContext<'_>, patterns: &[(&str, &str)]) -> Result<Vec<CaseVerdict>> {
    let mut verdicts = Vec::with_capacity(patterns.len() * 2);
    for (label, pattern) in patterns {
        let select = file_select(pattern);
        verdicts
            .push(ctx.check_snapshot(&format!("select_from_file_with_{label}"), &select.render())?);

        let table = ctx.unique_name("parquet_import");
        ctx.client.query_ok(
            &create_table_as(&table, "MergeTree", "tuple()", &select),
            &Settings::new(),
        )?;
        let verify = SelectSpec::new("*", table.as_str()).order_by("j");
        // Drop before surfacing the verdict so a mismatch never strands
        // the imported table.
        let verdict = ctx.check_snapshot(&format!("create_table_with_{label}"), &verify.render());
        ctx.client.query_ok(
            &format!("DROP TABLE IF EXISTS {table} SYNC"),
            &Settings::new(),
        )?;
        verdicts.push(verdict?);
    }
    Ok(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaseStatus;
    use basalt_client::scripted::ScriptedClient;
    use basalt_client::QueryOutput;
    use basalt_harness::config::RunConfig;
    use basalt_harness::snapshot::{SnapshotMode, SnapshotStore};

    #[test]
    fn file_select_orders_by_j() {
        assert_eq!(
            file_select("glob/*.parquet").render(),
            "SELECT * FROM file('glob/*.parquet', Parquet) ORDER BY j"
        );
    }

    #[test]
    fn every_pattern_reads_imports_and_drops() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient::new().with_default(QueryOutput::ok("1\n2\n3\n"));
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Bootstrap);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);

        let verdicts = glob(&ctx, &FeatureState::default()).expect("scenario runs");
        assert_eq!(verdicts.len(), 8);
        assert!(verdicts.iter().all(|v| v.status == CaseStatus::Pass));
        assert_eq!(
            verdicts[0].case.as_deref(),
            Some("select_from_file_with_asterisk")
        );
        assert_eq!(
            verdicts[1].case.as_deref(),
            Some("create_table_with_asterisk")
        );

        let calls = client.calls();
        assert!(calls.iter().any(|c| c.starts_with(
            "query:CREATE TABLE parquet_import_1 ENGINE = MergeTree ORDER BY tuple() AS \
             SELECT * FROM file('glob/*.parquet', Parquet) ORDER BY j"
        )));
        assert!(calls
            .iter()
            .any(|c| c.starts_with("query:DROP TABLE IF EXISTS parquet_import_1 SYNC")));
    }

    #[test]
    fn verify_mode_flags_changed_file_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let client = ScriptedClient::new().with_default(QueryOutput::ok("1\n2\n3\n"));
            let store = SnapshotStore::new(dir.path(), SnapshotMode::Record);
            let config = RunConfig::default();
            let ctx = SuiteContext::new(&client, &store, &config);
            let verdicts = nested_glob(&ctx, &FeatureState::default()).expect("record pass");
            assert!(verdicts.iter().all(|v| v.status == CaseStatus::Pass));
        }

        let client = ScriptedClient::new().with_default(QueryOutput::ok("1\n2\n999\n"));
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Verify);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);
        let verdicts = nested_glob(&ctx, &FeatureState::default()).expect("verify runs");
        assert!(verdicts.iter().all(|v| v.status == CaseStatus::Fail));
        let detail = verdicts[0].detail.as_deref().expect("detail");
        assert!(detail.contains("expected:"));
        assert!(detail.contains("999"));
    }
}
