//! Fixture provisioning.
//!
//! All DDL and seed data live here, next to the capability declarations
//! that describe them. Provisioning is idempotent: tables are dropped
//! before they are created, and file seeds truncate on insert, so a
//! re-run against the same node starts from the same state.
//!
//! Seed data contract for the FINAL fixtures: after collapsing, every
//! table holds ids 1..3 with `x` around {3, 7, 12} (ReplacingMergeTree
//! may keep the earlier part's {2, 6, 11} instead). Under either
//! outcome the predicates `x > 5` and `x > 10` select two rows and one
//! row respectively, which the negative controls rely on.

use basalt_client::{Settings, SqlClient};
use basalt_error::{BasaltError, Result};
use basalt_harness::capability::{Column, Engine, EngineFamily, FixtureRole, FixtureTable};
use basalt_harness::compose::sql_quote;
use tracing::{debug, info};

use crate::SuiteContext;

// ─── FINAL Fixtures ─────────────────────────────────────────────────────

/// Engine families provisioned for the FINAL equivalence feature.
pub const FINAL_FAMILIES: [EngineFamily; 5] = [
    EngineFamily::ReplacingMergeTree,
    EngineFamily::CollapsingMergeTree,
    EngineFamily::VersionedCollapsingMergeTree,
    EngineFamily::SummingMergeTree,
    EngineFamily::AggregatingMergeTree,
];

/// The full fixture plan: a core and a duplicate table per plain family,
/// plus a replicated ReplacingMergeTree pair.
pub fn final_fixture_plan() -> Vec<FixtureTable> {
    let mut engines: Vec<Engine> = FINAL_FAMILIES.iter().copied().map(Engine::plain).collect();
    engines.push(Engine::replicated(EngineFamily::ReplacingMergeTree));

    let mut tables = Vec::with_capacity(engines.len() * 2);
    for engine in engines {
        for role in [FixtureRole::Core, FixtureRole::Duplicate] {
            let name = format!("{}_{}", table_ident(engine), role.name());
            tables.push(FixtureTable::new(
                name,
                engine,
                role,
                fixture_columns(engine.family),
            ));
        }
    }
    tables
}

/// Drop, create, and seed every table in the plan.
pub fn provision_final_tables(ctx: &SuiteContext<'_>) -> Result<Vec<FixtureTable>> {
    let tables = final_fixture_plan();
    for table in &tables {
        apply(ctx, &table.name, &drop_ddl(&table.name))?;
        apply(ctx, &table.name, &create_ddl(table))?;
        for statement in insert_statements(table) {
            apply(ctx, &table.name, &statement)?;
        }
    }
    info!(tables = tables.len(), "final_fixtures_ready");
    Ok(tables)
}

/// CREATE TABLE statement for a fixture, ordered by `id` when the
/// fixture has one.
pub fn create_ddl(table: &FixtureTable) -> String {
    let columns = table
        .columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let order_key = if table.column("id").is_some() {
        "id"
    } else {
        "tuple()"
    };
    format!(
        "CREATE TABLE {} ({columns}) ENGINE = {} ORDER BY {order_key}",
        table.name,
        engine_clause(table)
    )
}

fn drop_ddl(name: &str) -> String {
    format!("DROP TABLE IF EXISTS {name} SYNC")
}

/// Engine expression with its family arguments; replicated engines get
/// a keeper path derived from the table name.
fn engine_clause(table: &FixtureTable) -> String {
    let family_args = match table.engine.family {
        EngineFamily::CollapsingMergeTree => "sign",
        EngineFamily::VersionedCollapsingMergeTree => "sign, version",
        _ => "",
    };
    if table.engine.replicated {
        let keeper_path = format!("/basalt/tables/{}", table.name);
        if family_args.is_empty() {
            format!("{}('{keeper_path}', 'replica1')", table.engine.sql_name())
        } else {
            format!(
                "{}('{keeper_path}', 'replica1', {family_args})",
                table.engine.sql_name()
            )
        }
    } else {
        format!("{}({family_args})", table.engine.sql_name())
    }
}

fn fixture_columns(family: EngineFamily) -> Vec<Column> {
    let mut columns = match family {
        // AggregatingMergeTree collapses through aggregate states.
        EngineFamily::AggregatingMergeTree => vec![
            Column::new("id", "UInt64"),
            Column::new("x", "SimpleAggregateFunction(sum, Int64)"),
            Column::new("someCol", "SimpleAggregateFunction(any, String)"),
        ],
        _ => vec![
            Column::new("id", "UInt64"),
            Column::new("x", "Int64"),
            Column::new("someCol", "String"),
        ],
    };
    match family {
        EngineFamily::CollapsingMergeTree => columns.push(Column::new("sign", "Int8")),
        EngineFamily::VersionedCollapsingMergeTree => {
            columns.push(Column::new("sign", "Int8"));
            columns.push(Column::new("version", "UInt64"));
        }
        _ => {}
    }
    columns
}

/// Two inserts per table, shaped so that a plain read sees duplicate or
/// cancelled rows while a FINAL read collapses to one row per id.
fn insert_statements(table: &FixtureTable) -> Vec<String> {
    let name = &table.name;
    match table.engine.family {
        EngineFamily::ReplacingMergeTree => vec![
            format!(
                "INSERT INTO {name} (id, x, someCol) VALUES \
                 (1, 2, 'first'), (2, 6, 'second'), (3, 11, 'third')"
            ),
            format!(
                "INSERT INTO {name} (id, x, someCol) VALUES \
                 (1, 3, 'first'), (2, 7, 'second'), (3, 12, 'third')"
            ),
        ],
        // Summing and aggregating families collapse by summing x across
        // parts; the two inserts split each target value.
        EngineFamily::SummingMergeTree | EngineFamily::AggregatingMergeTree => vec![
            format!(
                "INSERT INTO {name} (id, x, someCol) VALUES \
                 (1, 1, 'first'), (2, 3, 'second'), (3, 5, 'third')"
            ),
            format!(
                "INSERT INTO {name} (id, x, someCol) VALUES \
                 (1, 2, 'first'), (2, 4, 'second'), (3, 7, 'third')"
            ),
        ],
        EngineFamily::CollapsingMergeTree => vec![
            format!(
                "INSERT INTO {name} (id, x, someCol, sign) VALUES \
                 (1, 2, 'first', 1), (2, 6, 'second', 1), (3, 11, 'third', 1)"
            ),
            format!(
                "INSERT INTO {name} (id, x, someCol, sign) VALUES \
                 (1, 2, 'first', -1), (2, 6, 'second', -1), (3, 11, 'third', -1), \
                 (1, 3, 'first', 1), (2, 7, 'second', 1), (3, 12, 'third', 1)"
            ),
        ],
        EngineFamily::VersionedCollapsingMergeTree => vec![
            format!(
                "INSERT INTO {name} (id, x, someCol, sign, version) VALUES \
                 (1, 2, 'first', 1, 1), (2, 6, 'second', 1, 1), (3, 11, 'third', 1, 1)"
            ),
            format!(
                "INSERT INTO {name} (id, x, someCol, sign, version) VALUES \
                 (1, 2, 'first', -1, 1), (2, 6, 'second', -1, 1), (3, 11, 'third', -1, 1), \
                 (1, 3, 'first', 1, 2), (2, 7, 'second', 1, 2), (3, 12, 'third', 1, 2)"
            ),
        ],
        _ => Vec::new(),
    }
}

fn table_ident(engine: Engine) -> String {
    let sql_name = engine.sql_name();
    let mut ident = String::with_capacity(sql_name.len() + 8);
    for (i, c) in sql_name.char_indices() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
        } else {
            ident.push(c);
        }
    }
    ident
}

// ─── Parquet Seeds ──────────────────────────────────────────────────────

/// Parquet files seeded under the server's user-files directory, as
/// `(relative path, first j value, row count)`. Ranges never overlap,
/// so any glob's expected rows are the union of its matched files.
pub const PARQUET_SEED_FILES: [(&str, i64, i64); 5] = [
    ("glob/t1.parquet", 1, 3),
    ("glob/t2.parquet", 4, 3),
    ("glob/sub/t3.parquet", 7, 3),
    ("nested/first/inner/a.parquet", 1, 2),
    ("nested/second/inner/b.parquet", 3, 2),
];

/// Write every seed file through the `file` table function.
pub fn seed_parquet_files(ctx: &SuiteContext<'_>) -> Result<()> {
    let truncate = Settings::one("engine_file_truncate_on_insert", 1);
    for (path, start, count) in PARQUET_SEED_FILES {
        let sql = format!(
            "INSERT INTO FUNCTION file({}, Parquet, 'j Int64') \
             SELECT number + {start} AS j FROM numbers({count})",
            sql_quote(path)
        );
        debug!(path, "parquet_seed");
        ctx.client
            .query_ok(&sql, &truncate)
            .map(|_| ())
            .map_err(|err| BasaltError::FixtureSetup {
                fixture: path.to_owned(),
                detail: err.to_string(),
            })?;
    }
    info!(files = PARQUET_SEED_FILES.len(), "parquet_seeds_ready");
    Ok(())
}

// ─── Aggregate Fixture ──────────────────────────────────────────────────

/// Column set the aggregate matrix runs over.
pub const AGGREGATE_COLUMNS: [(&str, &str); 9] = [
    ("uint8", "UInt8"),
    ("uint64", "UInt64"),
    ("int8", "Int8"),
    ("int64", "Int64"),
    ("float64", "Float64"),
    ("date", "Date"),
    ("datetime", "DateTime"),
    ("str", "String"),
    ("nullable_int64", "Nullable(Int64)"),
];

/// The wide typed table aggregate scenarios query.
pub fn aggregate_fixture() -> FixtureTable {
    FixtureTable::new(
        "aggregate_datatypes",
        Engine::plain(EngineFamily::MergeTree),
        FixtureRole::Core,
        AGGREGATE_COLUMNS
            .iter()
            .map(|(name, datatype)| Column::new(*name, *datatype))
            .collect(),
    )
}

pub fn provision_aggregate_table(ctx: &SuiteContext<'_>) -> Result<FixtureTable> {
    let table = aggregate_fixture();
    apply(ctx, &table.name, &drop_ddl(&table.name))?;
    apply(ctx, &table.name, &create_ddl(&table))?;
    apply(
        ctx,
        &table.name,
        &format!(
            "INSERT INTO {} (uint8, uint64, int8, int64, float64, date, datetime, str, nullable_int64) VALUES \
             (1, 100, -1, -100, 0.5, '2023-01-01', '2023-01-01 00:00:01', 'alpha', 10), \
             (2, 200, -2, -200, 1.5, '2023-01-02', '2023-01-02 00:00:02', 'beta', NULL), \
             (3, 300, -3, -300, 2.5, '2023-01-03', '2023-01-03 00:00:03', 'gamma', 30)",
            table.name
        ),
    )?;
    info!(table = %table.name, "aggregate_fixture_ready");
    Ok(table)
}

// ─── Key-Value Fixtures ─────────────────────────────────────────────────

/// Names of the key-value input tables, one per input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueTables {
    pub plain: String,
    pub noisy: String,
    pub delimited: String,
    pub quoted: String,
}

impl KeyValueTables {
    /// Every table name, for teardown.
    pub fn names(&self) -> [&str; 4] {
        [&self.plain, &self.noisy, &self.delimited, &self.quoted]
    }
}

/// Well-formed key-value input rows.
pub const KEY_VALUE_INPUTS: [&str; 3] = [
    "name:neymar, age:31 team:psg, nationality:brazil",
    "color:red, size:M, material:cotton",
    "city:lisbon district:alfama",
];

/// Rows padded with noise around the extractable pairs. The empty row
/// keeps the extractor honest about producing an empty map.
pub const KEY_VALUE_NOISY_INPUTS: [&str; 4] = [
    "@ mail doc@company.com flag!! name:neymar age:31",
    "team : psg , nationality : brazil 123%",
    "just;; punctuation::: and, commas,, around key:value",
    "",
];

/// Rows phrased with `=` between key and value and `;` between pairs.
pub const KEY_VALUE_DELIMITED_INPUTS: [&str; 3] = [
    "name=neymar;age=31;team=psg",
    "color=red;size=M",
    "city=lisbon",
];

/// Rows whose values are wrapped in single quotes; the embedded quotes
/// also exercise statement escaping on insert.
pub const KEY_VALUE_QUOTED_INPUTS: [&str; 2] = [
    "name:'neymar jr', team:'paris saint-germain'",
    "motto:'never settle', club:'ac milan'",
];

pub fn provision_key_value_tables(ctx: &SuiteContext<'_>) -> Result<KeyValueTables> {
    let tables = KeyValueTables {
        plain: "key_value_input".to_owned(),
        noisy: "key_value_noisy_input".to_owned(),
        delimited: "key_value_delimited_input".to_owned(),
        quoted: "key_value_quoted_input".to_owned(),
    };
    create_key_value_table(ctx, &tables.plain, &KEY_VALUE_INPUTS)?;
    create_key_value_table(ctx, &tables.noisy, &KEY_VALUE_NOISY_INPUTS)?;
    create_key_value_table(ctx, &tables.delimited, &KEY_VALUE_DELIMITED_INPUTS)?;
    create_key_value_table(ctx, &tables.quoted, &KEY_VALUE_QUOTED_INPUTS)?;
    info!("key_value_fixtures_ready");
    Ok(tables)
}

fn create_key_value_table(ctx: &SuiteContext<'_>, name: &str, inputs: &[&str]) -> Result<()> {
    apply(ctx, name, &drop_ddl(name))?;
    apply(
        ctx,
        name,
        &format!("CREATE TABLE {name} (x String) ENGINE = MergeTree ORDER BY tuple()"),
    )?;
    let values = inputs
        .iter()
        .map(|input| format!("({})", sql_quote(input)))
        .collect::<Vec<_>>()
        .join(", ");
    apply(ctx, name, &format!("INSERT INTO {name} (x) VALUES {values}"))
}

// ─── Shared ─────────────────────────────────────────────────────────────

fn apply(ctx: &SuiteContext<'_>, fixture: &str, sql: &str) -> Result<()> {
    debug!(fixture, sql, "fixture_statement");
    ctx.client
        .query_ok(sql, &Settings::new())
        .map(|_| ())
        .map_err(|err| BasaltError::FixtureSetup {
            fixture: fixture.to_owned(),
            detail: err.to_string(),
        })
}
