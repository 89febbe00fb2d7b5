//! FINAL-modifier equivalence scenarios.
//!
//! Each positive scenario phrases the same question twice: once with an
//! explicit `FINAL` (and `force_select_final = 0`), once without `FINAL`
//! but under `force_select_final = 1`. Over any fixture whose engine
//! collapses on FINAL, the two phrasings must produce identical output.
//!
//! Negative-control scenarios compare phrasings that are mismatched on
//! purpose (different WHERE thresholds or LIMIT values) and must observe
//! a difference; if they ever report equality, the comparator has
//! stopped comparing. Multi-row comparisons always carry an ORDER BY;
//! single-row aggregates are ordered by construction.

use basalt_client::Settings;
use basalt_error::Result;
use basalt_harness::capability::{EngineFamily, FixtureRole, FixtureTable};
use basalt_harness::compose::{
    scalar_cte, JoinOperand, JoinSpec, JoinType, SelectSpec, UnionMode, UnionSpec,
};
use basalt_harness::equivalence::{check_pair, EquivalencePair, PairExpectation, QueryArm};

use crate::runner::FeatureState;
use crate::{CaseVerdict, SuiteContext};

// ─── Arm Settings ───────────────────────────────────────────────────────

/// Settings for the arm that spells out `FINAL` itself.
pub fn plain_settings() -> Settings {
    Settings::one("force_select_final", 0)
}

/// Settings for the arm that relies on the server applying FINAL.
pub fn forced_settings() -> Settings {
    Settings::one("force_select_final", 1)
}

/// Subquery joins additionally waive the mandatory subquery alias so the
/// two phrasings stay syntactically parallel.
fn subquery_settings(base: Settings) -> Settings {
    base.with("joined_subquery_requires_alias", 0)
}

// ─── Eligibility ────────────────────────────────────────────────────────

/// Whether a fixture is a comparison subject: a core base table whose
/// engine collapses on FINAL.
pub fn eligible(table: &FixtureTable) -> bool {
    table.role == FixtureRole::Core
        && table.is_base_table()
        && table.capabilities.final_collapses_rows
}

/// The WITH-clause negative control does not run over versioned
/// collapsing fixtures.
pub fn with_negative_eligible(table: &FixtureTable) -> bool {
    eligible(table) && table.engine.family != EngineFamily::VersionedCollapsingMergeTree
}

/// Same-engine duplicate partner for joins and unions.
pub fn duplicate_partner<'t>(
    tables: &'t [FixtureTable],
    core: &FixtureTable,
) -> Option<&'t FixtureTable> {
    tables
        .iter()
        .find(|t| t.role == FixtureRole::Duplicate && t.engine == core.engine)
}

// ─── Pair Builders ──────────────────────────────────────────────────────

pub fn simple_select_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .order_by("id");
    let forced = SelectSpec::new("*", table.name.as_str()).order_by("id");
    must_match(table, &explicit, &forced)
}

pub fn simple_select_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .where_clause("x > 10")
        .order_by("id");
    let wide = SelectSpec::new("*", table.name.as_str())
        .where_clause("x > 5")
        .order_by("id");
    must_differ(table, &narrow, &wide)
}

pub fn select_count_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("count()", table.name.as_str()).final_modifier(true);
    let forced = SelectSpec::new("count()", table.name.as_str());
    must_match(table, &explicit, &forced)
}

pub fn select_count_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = SelectSpec::new("count()", table.name.as_str())
        .final_modifier(true)
        .where_clause("x > 10");
    let wide = SelectSpec::new("count()", table.name.as_str()).where_clause("x > 5");
    must_differ(table, &narrow, &wide)
}

pub fn select_limit_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .order_by("id")
        .limit(2);
    let forced = SelectSpec::new("*", table.name.as_str()).order_by("id").limit(2);
    must_match(table, &explicit, &forced)
}

pub fn select_limit_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let two = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .order_by("id")
        .limit(2);
    let one = SelectSpec::new("*", table.name.as_str()).order_by("id").limit(1);
    must_differ(table, &two, &one)
}

pub fn select_group_by_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("id, count(x)", table.name.as_str())
        .final_modifier(true)
        .group_by("id")
        .order_by("id");
    let forced = SelectSpec::new("id, count(x)", table.name.as_str())
        .group_by("id")
        .order_by("id");
    must_match(table, &explicit, &forced)
}

pub fn select_group_by_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = SelectSpec::new("id, count(x)", table.name.as_str())
        .final_modifier(true)
        .where_clause("x > 10")
        .group_by("id")
        .order_by("id");
    let wide = SelectSpec::new("id, count(x)", table.name.as_str())
        .where_clause("x > 5")
        .group_by("id")
        .order_by("id");
    must_differ(table, &narrow, &wide)
}

pub fn select_distinct_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("*", table.name.as_str())
        .distinct(true)
        .final_modifier(true)
        .order_by("id");
    let forced = SelectSpec::new("*", table.name.as_str()).distinct(true).order_by("id");
    must_match(table, &explicit, &forced)
}

pub fn select_distinct_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = SelectSpec::new("*", table.name.as_str())
        .distinct(true)
        .final_modifier(true)
        .where_clause("x > 10")
        .order_by("id");
    let wide = SelectSpec::new("*", table.name.as_str())
        .distinct(true)
        .where_clause("x > 5")
        .order_by("id");
    must_differ(table, &narrow, &wide)
}

pub fn select_where_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .where_clause("x > 5")
        .order_by("id");
    let forced = SelectSpec::new("*", table.name.as_str())
        .where_clause("x > 5")
        .order_by("id");
    must_match(table, &explicit, &forced)
}

pub fn select_where_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = SelectSpec::new("*", table.name.as_str())
        .final_modifier(true)
        .where_clause("x > 10")
        .order_by("id");
    let wide = SelectSpec::new("*", table.name.as_str())
        .where_clause("x > 5")
        .order_by("id");
    must_differ(table, &narrow, &wide)
}

/// Join strategies whose subquery phrasing keys on a plain equality ON
/// clause; CROSS (no condition) and the ASOF variants (inequality) are
/// exercised by the table-join scenario only.
pub const SUBQUERY_JOIN_TYPES: [JoinType; 11] = [
    JoinType::Inner,
    JoinType::LeftOuter,
    JoinType::RightOuter,
    JoinType::FullOuter,
    JoinType::LeftSemi,
    JoinType::RightSemi,
    JoinType::LeftAnti,
    JoinType::RightAnti,
    JoinType::LeftAny,
    JoinType::RightAny,
    JoinType::InnerAny,
];

/// Join strategies whose matched-row count responds to a predicate
/// change on the right side; strategies that keep every left (or every
/// combined) row regardless cannot witness the mismatch and are left
/// out of the negative control.
pub const NEGATIVE_JOIN_TYPES: [JoinType; 7] = [
    JoinType::Inner,
    JoinType::RightOuter,
    JoinType::LeftSemi,
    JoinType::RightSemi,
    JoinType::LeftAnti,
    JoinType::RightAny,
    JoinType::InnerAny,
];

pub fn join_clause_pairs(core: &FixtureTable, partner: &FixtureTable) -> Vec<EquivalencePair> {
    JoinType::ALL
        .iter()
        .map(|&join| {
            let condition = join_condition(join, &core.name, &partner.name);
            let mut explicit = JoinSpec::new(
                "count()",
                core.name.as_str(),
                join,
                JoinOperand::table_final(partner.name.as_str()),
            )
            .left_final(true);
            let mut forced = JoinSpec::new(
                "count()",
                core.name.as_str(),
                join,
                JoinOperand::table(partner.name.as_str()),
            );
            if let Some(condition) = &condition {
                explicit = explicit.on(condition.as_str());
                forced = forced.on(condition.as_str());
            }
            join_pair(core, join, &explicit, &forced, PairExpectation::MustMatch)
        })
        .collect()
}

/// FINAL decoration of the forced table-join arm: bare, left side only,
/// and both sides. `force_select_final=1` already collapses every
/// side, so the explicit keywords must be no-ops and all three arms
/// have to agree with the subquery phrasing.
const FORCED_FINAL_DECORATIONS: [(&str, bool, bool); 3] = [
    ("forced_bare", false, false),
    ("forced_left_final", true, false),
    ("forced_both_final", true, true),
];

pub fn join_select_pairs(core: &FixtureTable, partner: &FixtureTable) -> Vec<EquivalencePair> {
    SUBQUERY_JOIN_TYPES
        .iter()
        .flat_map(|&join| {
            let explicit = subquery_join(core, partner, join, true, true, None);
            FORCED_FINAL_DECORATIONS
                .iter()
                .map(move |&(decoration, left_final, right_final)| {
                    let right = if right_final {
                        JoinOperand::table_final(partner.name.as_str())
                    } else {
                        JoinOperand::table(partner.name.as_str())
                    };
                    let forced = JoinSpec::new("count()", core.name.as_str(), join, right)
                        .left_final(left_final)
                        .on(format!("{}.id = {}.id", core.name, partner.name));
                    subquery_pair(
                        format!("{}_{}_{}", core.name, join.name(), decoration),
                        &explicit,
                        &forced,
                        PairExpectation::MustMatch,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// FINAL across two nested joined subqueries, against a forced join
/// whose right operand is itself a join.
pub fn multiple_join_pairs(core: &FixtureTable, partner: &FixtureTable) -> Vec<EquivalencePair> {
    SUBQUERY_JOIN_TYPES
        .iter()
        .map(|&join| {
            let inner = JoinSpec::new(
                "*",
                core.name.as_str(),
                join,
                JoinOperand::subquery(
                    SelectSpec::new("*", partner.name.as_str()).final_modifier(true),
                    "b",
                ),
            )
            .left_alias("a")
            .left_final(true)
            .on("a.id = b.id");
            let explicit = JoinSpec::new(
                "count()",
                core.name.as_str(),
                join,
                JoinOperand::nested_join(inner, "d"),
            )
            .left_alias("c")
            .left_final(true)
            .on("c.id = d.id");

            let forced_inner = JoinSpec::new(
                "*",
                core.name.as_str(),
                join,
                JoinOperand::table(partner.name.as_str()),
            )
            .on(format!("{}.id = {}.id", core.name, partner.name));
            let forced = JoinSpec::new(
                "count()",
                core.name.as_str(),
                join,
                JoinOperand::nested_join(forced_inner, "b"),
            )
            .left_alias("a")
            .on("a.id = b.id");

            subquery_pair(
                format!("{}_{}", core.name, join.name()),
                &explicit,
                &forced,
                PairExpectation::MustMatch,
            )
        })
        .collect()
}

pub fn join_select_negative_pairs(
    core: &FixtureTable,
    partner: &FixtureTable,
) -> Vec<EquivalencePair> {
    NEGATIVE_JOIN_TYPES
        .iter()
        .map(|&join| {
            let narrow = subquery_join(core, partner, join, true, true, Some("x > 10"));
            let wide = subquery_join(core, partner, join, false, false, Some("x > 5"));
            subquery_pair(
                format!("{}_{}", core.name, join.name()),
                &narrow,
                &wide,
                PairExpectation::MustDiffer,
            )
        })
        .collect()
}

pub fn union_pairs(core: &FixtureTable, partner: &FixtureTable) -> Vec<EquivalencePair> {
    UnionMode::ALL_MODES
        .iter()
        .map(|&mode| {
            let explicit = union_spec(core, partner, mode, true, None);
            let forced = union_spec(core, partner, mode, false, None);
            EquivalencePair::from_arms(
                format!("{}_{}", core.name, mode.name()),
                QueryArm::new(explicit.render(), plain_settings()),
                QueryArm::new(forced.render(), forced_settings()),
                PairExpectation::MustMatch,
                explicit.deterministic() && forced.deterministic(),
            )
        })
        .collect()
}

/// UNION DISTINCT absorbs the row-count difference the mismatched
/// thresholds create, so the negative control runs UNION ALL only.
pub fn union_negative_pair(core: &FixtureTable, partner: &FixtureTable) -> EquivalencePair {
    let narrow = union_spec(core, partner, UnionMode::All, true, Some("x > 10"));
    let wide = union_spec(core, partner, UnionMode::All, false, Some("x > 5"));
    EquivalencePair::from_arms(
        core.name.as_str(),
        QueryArm::new(narrow.render(), plain_settings()),
        QueryArm::new(wide.render(), forced_settings()),
        PairExpectation::MustDiffer,
        narrow.deterministic() && wide.deterministic(),
    )
}

pub fn with_clause_pair(table: &FixtureTable) -> EquivalencePair {
    let explicit = with_clause_select(table, true, None);
    let forced = with_clause_select(table, false, None);
    must_match(table, &explicit, &forced)
}

pub fn with_clause_negative_pair(table: &FixtureTable) -> EquivalencePair {
    let narrow = with_clause_select(table, true, Some("x > 10"));
    let wide = with_clause_select(table, false, Some("x > 5"));
    must_differ(table, &narrow, &wide)
}

fn must_match(table: &FixtureTable, explicit: &SelectSpec, forced: &SelectSpec) -> EquivalencePair {
    EquivalencePair::from_selects(
        table.name.as_str(),
        explicit,
        plain_settings(),
        forced,
        forced_settings(),
        PairExpectation::MustMatch,
    )
}

fn must_differ(table: &FixtureTable, narrow: &SelectSpec, wide: &SelectSpec) -> EquivalencePair {
    EquivalencePair::from_selects(
        table.name.as_str(),
        narrow,
        plain_settings(),
        wide,
        forced_settings(),
        PairExpectation::MustDiffer,
    )
}

fn join_pair(
    core: &FixtureTable,
    join: JoinType,
    explicit: &JoinSpec,
    forced: &JoinSpec,
    expectation: PairExpectation,
) -> EquivalencePair {
    // count() projects a single row, so the pair is ordered by
    // construction.
    EquivalencePair::from_arms(
        format!("{}_{}", core.name, join.name()),
        QueryArm::new(explicit.render(), plain_settings()),
        QueryArm::new(forced.render(), forced_settings()),
        expectation,
        true,
    )
}

fn subquery_pair(
    id: String,
    explicit: &JoinSpec,
    forced: &JoinSpec,
    expectation: PairExpectation,
) -> EquivalencePair {
    EquivalencePair::from_arms(
        id,
        QueryArm::new(explicit.render(), subquery_settings(plain_settings())),
        QueryArm::new(forced.render(), subquery_settings(forced_settings())),
        expectation,
        true,
    )
}

fn join_condition(join: JoinType, left: &str, right: &str) -> Option<String> {
    match join {
        JoinType::Cross => None,
        // ASOF requires one inequality next to the equality.
        JoinType::Asof | JoinType::LeftAsof => {
            Some(format!("{left}.id = {right}.id AND {left}.x >= {right}.x"))
        }
        _ => Some(format!("{left}.id = {right}.id")),
    }
}

fn subquery_join(
    core: &FixtureTable,
    partner: &FixtureTable,
    join: JoinType,
    left_final: bool,
    inner_final: bool,
    threshold: Option<&str>,
) -> JoinSpec {
    let mut inner = SelectSpec::new("*", partner.name.as_str()).final_modifier(inner_final);
    if let Some(threshold) = threshold {
        inner = inner.where_clause(threshold);
    }
    JoinSpec::new(
        "count()",
        core.name.as_str(),
        join,
        JoinOperand::subquery(inner, "b"),
    )
    .left_alias("a")
    .left_final(left_final)
    .on("a.id = b.id")
}

fn union_spec(
    core: &FixtureTable,
    partner: &FixtureTable,
    mode: UnionMode,
    final_modifier: bool,
    partner_threshold: Option<&str>,
) -> UnionSpec {
    let mut partner_arm = SelectSpec::new("id, count(*) AS c", partner.name.as_str())
        .final_modifier(final_modifier)
        .group_by("id");
    if let Some(threshold) = partner_threshold {
        partner_arm = partner_arm.where_clause(threshold);
    }
    UnionSpec::new(mode)
        .arm(
            SelectSpec::new("id, count(*) AS c", core.name.as_str())
                .final_modifier(final_modifier)
                .group_by("id"),
        )
        .arm(partner_arm)
        .order_by("id, c")
}

fn with_clause_select(
    table: &FixtureTable,
    final_modifier: bool,
    cte_threshold: Option<&str>,
) -> SelectSpec {
    let mut total = SelectSpec::new("count(id)", table.name.as_str()).final_modifier(final_modifier);
    if let Some(threshold) = cte_threshold {
        total = total.where_clause(threshold);
    }
    SelectSpec::new("(x / total_ids) AS something, someCol", table.name.as_str())
        .with_clause(scalar_cte(&total, "total_ids"))
        .final_modifier(final_modifier)
        .group_by("(x, someCol)")
        .order_by("something, someCol DESC")
}

// ─── Scenarios ──────────────────────────────────────────────────────────

pub fn simple_select(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, simple_select_pair))
}

pub fn simple_select_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, simple_select_negative_pair))
}

pub fn select_count(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_count_pair))
}

pub fn select_count_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_count_negative_pair))
}

pub fn select_limit(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_limit_pair))
}

pub fn select_limit_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_limit_negative_pair))
}

pub fn select_group_by(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_group_by_pair))
}

pub fn select_group_by_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_group_by_negative_pair))
}

pub fn select_distinct(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_distinct_pair))
}

pub fn select_distinct_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_distinct_negative_pair))
}

pub fn select_where(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_where_pair))
}

pub fn select_where_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, select_where_negative_pair))
}

pub fn select_join_clause(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect_partnered(&state.tables, join_clause_pairs))
}

pub fn select_join_clause_select(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect_partnered(&state.tables, join_select_pairs))
}

pub fn select_join_clause_select_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect_partnered(&state.tables, join_select_negative_pairs))
}

pub fn select_multiple_join_clause_select(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect_partnered(&state.tables, multiple_join_pairs))
}

pub fn select_union_clause(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect_partnered(&state.tables, union_pairs))
}

pub fn select_union_clause_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    let pairs: Vec<EquivalencePair> = state
        .tables
        .iter()
        .filter(|t| eligible(t))
        .filter_map(|core| {
            duplicate_partner(&state.tables, core).map(|partner| union_negative_pair(core, partner))
        })
        .collect();
    check_pairs(ctx, &pairs)
}

pub fn select_with_clause(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    check_pairs(ctx, &collect(&state.tables, with_clause_pair))
}

pub fn select_with_clause_negative(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    let pairs: Vec<EquivalencePair> = state
        .tables
        .iter()
        .filter(|t| with_negative_eligible(t))
        .map(with_clause_negative_pair)
        .collect();
    check_pairs(ctx, &pairs)
}

// ─── Execution ──────────────────────────────────────────────────────────

fn collect(
    tables: &[FixtureTable],
    build: impl Fn(&FixtureTable) -> EquivalencePair,
) -> Vec<EquivalencePair> {
    tables.iter().filter(|t| eligible(t)).map(build).collect()
}

fn collect_partnered(
    tables: &[FixtureTable],
    build: impl Fn(&FixtureTable, &FixtureTable) -> Vec<EquivalencePair>,
) -> Vec<EquivalencePair> {
    tables
        .iter()
        .filter(|t| eligible(t))
        .filter_map(|core| duplicate_partner(tables, core).map(|partner| build(core, partner)))
        .flatten()
        .collect()
}

fn check_pairs(ctx: &SuiteContext<'_>, pairs: &[EquivalencePair]) -> Result<Vec<CaseVerdict>> {
    let mut verdicts = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let report = check_pair(ctx.client, pair)?;
        verdicts.push(match report.failure_detail() {
            None => CaseVerdict::pass().for_case(pair.id.as_str()),
            Some(detail) => CaseVerdict::fail(detail).for_case(pair.id.as_str()),
        });
    }
    Ok(verdicts)
}
