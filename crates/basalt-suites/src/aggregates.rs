//! Aggregate-function datatype matrix scenarios.
//!
//! Each family starts with fixture-independent checks: constants, an
//! empty source, grouped keys, NULL handling, the documentation
//! example, and the floating-point specials. `min` then snapshots one
//! aggregate per fixture column. `arg_min` adds string-paired passes in
//! both argument orders, then walks the unique unordered pairs of the
//! non-string columns and snapshots `argMin(value, comparison)` for
//! each, dispatching the pairs over the bounded pool. Matrix order is
//! the sorted pair order, so reports read the same run to run; a pair
//! that panics or mismatches never stops the rest of the matrix.

use basalt_error::Result;
use basalt_harness::capability::{Column, FixtureTable};
use basalt_harness::compose::SelectSpec;
use basalt_harness::matrix::unordered_pairs;
use basalt_harness::pool::{run_bounded, BoxedCheck, TaskOutcome};

use crate::runner::FeatureState;
use crate::{CaseVerdict, SuiteContext};

/// The fixture column argMin pairs against in the dedicated passes.
const STRING_COLUMN: &str = "str";

/// The salary table from the aggregate-function documentation.
const SALARY_SOURCE: &str = "values('user String, salary Int32', \
                             ('director', 5000), ('teacher', 3000), ('worker', 1000))";

// ─── Function Checks ────────────────────────────────────────────────────

fn min_checks() -> Vec<(&'static str, SelectSpec)> {
    vec![
        ("min_constant", SelectSpec::new("min(1)", "system.one")),
        ("min_zero_rows", SelectSpec::new("min(number)", "numbers(0)")),
        (
            "min_group_by",
            SelectSpec::new("number % 2 AS even, min(number)", "numbers(10)")
                .group_by("even")
                .order_by("even"),
        ),
        (
            "min_nulls",
            SelectSpec::new("min(x)", "values('x Nullable(Int8)', 1, NULL, 2)"),
        ),
        ("min_doc_example", SelectSpec::new("min(salary)", SALARY_SOURCE)),
        (
            "min_inf",
            SelectSpec::new("min(x)", "values('x Float64', 0.5, inf)"),
        ),
        (
            "min_neg_inf",
            SelectSpec::new("min(x)", "values('x Float64', 0.5, -inf)"),
        ),
        (
            "min_nan",
            SelectSpec::new("min(x)", "values('x Float64', 0.5, nan)"),
        ),
        (
            "min_mixed_specials",
            SelectSpec::new("min(x)", "values('x Float64', inf, -inf, nan, 1.5)"),
        ),
    ]
}

fn arg_min_checks() -> Vec<(&'static str, SelectSpec)> {
    vec![
        ("arg_min_constant", SelectSpec::new("argMin(1, 2)", "system.one")),
        (
            "arg_min_zero_rows",
            SelectSpec::new("argMin(number, number)", "numbers(0)"),
        ),
        (
            "arg_min_nulls",
            SelectSpec::new(
                "argMin(x, y)",
                "values('x Nullable(Int8), y Int64', (1, 10), (NULL, 5), (2, 20))",
            ),
        ),
        (
            "arg_min_doc_example",
            SelectSpec::new("argMin(user, salary)", SALARY_SOURCE),
        ),
    ]
}

// ─── Scenarios ──────────────────────────────────────────────────────────

pub fn min(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    let Some(table) = state.aggregate_table.as_ref() else {
        return Ok(Vec::new());
    };
    let mut verdicts = Vec::new();
    for (name, select) in min_checks() {
        verdicts.push(ctx.check_snapshot(name, &select.render())?);
    }
    for column in &table.columns {
        let select = SelectSpec::new(format!("min({})", column.name), table.name.as_str());
        verdicts.push(ctx.check_snapshot(&format!("min_{}", column.name), &select.render())?);
    }
    Ok(verdicts)
}

pub fn arg_min(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    let Some(table) = state.aggregate_table.as_ref() else {
        return Ok(Vec::new());
    };
    let mut verdicts = Vec::new();
    for (name, select) in arg_min_checks() {
        verdicts.push(ctx.check_snapshot(name, &select.render())?);
    }
    verdicts.extend(string_passes(ctx, table)?);

    // The string pairs above already cover both argument orders, so the
    // matrix runs over the remaining columns.
    let non_string: Vec<Column> = table
        .columns
        .iter()
        .filter(|column| column.name != STRING_COLUMN)
        .cloned()
        .collect();
    verdicts.extend(matrix_verdicts(ctx, table, &non_string, self_pair_skip)?);
    Ok(verdicts)
}

// ─── Pair Dispatch ──────────────────────────────────────────────────────

/// `argMin` with the string column as value, then as comparison,
/// against every other column.
fn string_passes(ctx: &SuiteContext<'_>, table: &FixtureTable) -> Result<Vec<CaseVerdict>> {
    let mut verdicts = Vec::new();
    for column in table.columns.iter().filter(|c| c.name != STRING_COLUMN) {
        let directions = [
            (STRING_COLUMN, column.name.as_str()),
            (column.name.as_str(), STRING_COLUMN),
        ];
        for (value, comparison) in directions {
            let case = format!("arg_min_{value}_{comparison}");
            let select = SelectSpec::new(
                format!("argMin({value}, {comparison})"),
                table.name.as_str(),
            );
            verdicts.push(ctx.check_snapshot(&case, &select.render())?);
        }
    }
    Ok(verdicts)
}

/// Reason to skip one matrix pair, or `None` to dispatch it.
type SkipRule = fn(&Column, &Column) -> Option<String>;

/// Self pairs collapse to the single-argument family, which the
/// per-column pass already snapshots.
fn self_pair_skip(value: &Column, comparison: &Column) -> Option<String> {
    (value.name == comparison.name).then(|| format!("argMin({0}, {0}) is min({0})", value.name))
}

fn matrix_verdicts(
    ctx: &SuiteContext<'_>,
    table: &FixtureTable,
    columns: &[Column],
    skip: SkipRule,
) -> Result<Vec<CaseVerdict>> {
    let pairs = unordered_pairs(columns);
    let jobs: Vec<(String, BoxedCheck<'_, Result<CaseVerdict>>)> = pairs
        .into_iter()
        .map(|(value, comparison)| {
            let case = format!("arg_min_{}_{}", value.name, comparison.name);
            let id = case.clone();
            let job: BoxedCheck<'_, Result<CaseVerdict>> = Box::new(move || {
                if let Some(reason) = skip(&value, &comparison) {
                    return Ok(CaseVerdict::skip(reason).for_case(case.as_str()));
                }
                let select = SelectSpec::new(
                    format!("argMin({}, {})", value.name, comparison.name),
                    table.name.as_str(),
                );
                ctx.check_snapshot(&case, &select.render())
            });
            (id, job)
        })
        .collect();

    let mut verdicts = Vec::with_capacity(jobs.len());
    for result in run_bounded(ctx.config.pool.workers, jobs) {
        verdicts.push(match result.outcome {
            TaskOutcome::Completed(verdict) => verdict?,
            TaskOutcome::Panicked { message } => {
                CaseVerdict::fail(format!("check panicked: {message}")).for_case(result.id.as_str())
            }
        });
    }
    Ok(verdicts)
}
