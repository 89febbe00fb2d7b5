//! Structured SQL fragment composition.
//!
//! Scenarios never paste clauses together at the call site. A select is
//! a [`SelectSpec`] whose optional clauses render in one fixed order, so
//! the cross product of scenario toggles (distinct, where, group-by,
//! order-by, limit) is a set of booleans and strings rather than a set
//! of string-concatenation branches. Joins and unions compose the same
//! way through [`JoinSpec`] and [`UnionSpec`].
//!
//! Composition also carries the determinism contract: a spec knows
//! whether its result set has a stable order ([`SelectSpec::deterministic`]),
//! which the equivalence checker uses to reject comparisons that would
//! be flaky by construction.

use std::fmt;

// ─── Select Composition ─────────────────────────────────────────────────

/// One composed SELECT statement.
///
/// Clause order in the rendered SQL is fixed: WITH, SELECT [DISTINCT],
/// projection, FROM, FINAL, WHERE, GROUP BY, ORDER BY, LIMIT, FORMAT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectSpec {
    with_clause: Option<String>,
    distinct: bool,
    columns: String,
    from: String,
    final_modifier: bool,
    where_clause: Option<String>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<u64>,
    format: Option<String>,
}

impl SelectSpec {
    pub fn new(columns: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            with_clause: None,
            distinct: false,
            columns: columns.into(),
            from: from.into(),
            final_modifier: false,
            where_clause: None,
            group_by: None,
            order_by: None,
            limit: None,
            format: None,
        }
    }

    /// Prefix the statement with `WITH <cte> `. See [`scalar_cte`].
    #[must_use]
    pub fn with_clause(mut self, cte: impl Into<String>) -> Self {
        self.with_clause = Some(cte.into());
        self
    }

    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    #[must_use]
    pub fn final_modifier(mut self, final_modifier: bool) -> Self {
        self.final_modifier = final_modifier;
        self
    }

    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    #[must_use]
    pub fn group_by(mut self, keys: impl Into<String>) -> Self {
        self.group_by = Some(keys.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, keys: impl Into<String>) -> Self {
        self.order_by = Some(keys.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn has_order_by(&self) -> bool {
        self.order_by.is_some()
    }

    /// Whether the rendered query has a stable result order: either an
    /// explicit ORDER BY, or a single ungrouped aggregate (one row).
    pub fn deterministic(&self) -> bool {
        self.order_by.is_some()
            || (self.group_by.is_none() && single_aggregate_projection(&self.columns))
    }

    pub fn render(&self) -> String {
        let mut sql = String::new();
        if let Some(cte) = &self.with_clause {
            sql.push_str("WITH ");
            sql.push_str(cte);
            sql.push(' ');
        }
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns);
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        if self.final_modifier {
            sql.push_str(" FINAL");
        }
        if let Some(condition) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        if let Some(keys) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(keys);
        }
        if let Some(keys) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(keys);
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(format) = &self.format {
            sql.push_str(" FORMAT ");
            sql.push_str(format);
        }
        sql
    }
}

impl fmt::Display for SelectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Scalar correlated CTE fragment: `(SELECT ...) AS alias`.
pub fn scalar_cte(select: &SelectSpec, alias: &str) -> String {
    format!("({}) AS {alias}", select.render())
}

/// True when the projection is exactly one aggregate call, e.g.
/// `count()` or `argMin(a, b)`. A top-level comma or a bare column list
/// disqualifies it.
fn single_aggregate_projection(columns: &str) -> bool {
    let mut depth = 0u32;
    for c in columns.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    columns.contains('(')
}

// ─── Join Composition ───────────────────────────────────────────────────

/// Join strategies the FINAL-equivalence scenarios exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
    LeftSemi,
    RightSemi,
    LeftAnti,
    RightAnti,
    LeftAny,
    RightAny,
    InnerAny,
    Asof,
    LeftAsof,
}

impl JoinType {
    pub const ALL: [JoinType; 14] = [
        JoinType::Inner,
        JoinType::LeftOuter,
        JoinType::RightOuter,
        JoinType::FullOuter,
        JoinType::Cross,
        JoinType::LeftSemi,
        JoinType::RightSemi,
        JoinType::LeftAnti,
        JoinType::RightAnti,
        JoinType::LeftAny,
        JoinType::RightAny,
        JoinType::InnerAny,
        JoinType::Asof,
        JoinType::LeftAsof,
    ];

    /// SQL spelling.
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::LeftSemi => "LEFT SEMI JOIN",
            Self::RightSemi => "RIGHT SEMI JOIN",
            Self::LeftAnti => "LEFT ANTI JOIN",
            Self::RightAnti => "RIGHT ANTI JOIN",
            Self::LeftAny => "LEFT ANY JOIN",
            Self::RightAny => "RIGHT ANY JOIN",
            Self::InnerAny => "INNER ANY JOIN",
            Self::Asof => "ASOF JOIN",
            Self::LeftAsof => "LEFT ASOF JOIN",
        }
    }

    /// Scenario-name spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::LeftOuter => "left_outer",
            Self::RightOuter => "right_outer",
            Self::FullOuter => "full_outer",
            Self::Cross => "cross",
            Self::LeftSemi => "left_semi",
            Self::RightSemi => "right_semi",
            Self::LeftAnti => "left_anti",
            Self::RightAnti => "right_anti",
            Self::LeftAny => "left_any",
            Self::RightAny => "right_any",
            Self::InnerAny => "inner_any",
            Self::Asof => "asof",
            Self::LeftAsof => "left_asof",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// Right-hand side of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOperand {
    Table {
        name: String,
        final_modifier: bool,
    },
    Subquery {
        select: Box<SelectSpec>,
        alias: String,
    },
    /// A parenthesised join used as the right operand, for join chains
    /// that nest one join inside another.
    NestedJoin {
        join: Box<JoinSpec>,
        alias: String,
    },
}

impl JoinOperand {
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            final_modifier: false,
        }
    }

    pub fn table_final(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            final_modifier: true,
        }
    }

    pub fn subquery(select: SelectSpec, alias: impl Into<String>) -> Self {
        Self::Subquery {
            select: Box::new(select),
            alias: alias.into(),
        }
    }

    pub fn nested_join(join: JoinSpec, alias: impl Into<String>) -> Self {
        Self::NestedJoin {
            join: Box::new(join),
            alias: alias.into(),
        }
    }
}

/// One composed join statement over a left table and a right operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    columns: String,
    left_table: String,
    left_final: bool,
    left_alias: Option<String>,
    join_type: JoinType,
    right: JoinOperand,
    on_clause: Option<String>,
}

impl JoinSpec {
    pub fn new(
        columns: impl Into<String>,
        left_table: impl Into<String>,
        join_type: JoinType,
        right: JoinOperand,
    ) -> Self {
        Self {
            columns: columns.into(),
            left_table: left_table.into(),
            left_final: false,
            left_alias: None,
            join_type,
            right,
            on_clause: None,
        }
    }

    #[must_use]
    pub fn left_final(mut self, final_modifier: bool) -> Self {
        self.left_final = final_modifier;
        self
    }

    #[must_use]
    pub fn left_alias(mut self, alias: impl Into<String>) -> Self {
        self.left_alias = Some(alias.into());
        self
    }

    /// Join condition; CROSS joins have none.
    #[must_use]
    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.on_clause = Some(condition.into());
        self
    }

    pub fn render(&self) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.columns);
        sql.push_str(" FROM ");
        sql.push_str(&self.left_table);
        if let Some(alias) = &self.left_alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        if self.left_final {
            sql.push_str(" FINAL");
        }
        sql.push(' ');
        sql.push_str(self.join_type.sql());
        sql.push(' ');
        match &self.right {
            JoinOperand::Table {
                name,
                final_modifier,
            } => {
                sql.push_str(name);
                if *final_modifier {
                    sql.push_str(" FINAL");
                }
            }
            JoinOperand::Subquery { select, alias } => {
                sql.push('(');
                sql.push_str(&select.render());
                sql.push_str(") ");
                sql.push_str(alias);
            }
            JoinOperand::NestedJoin { join, alias } => {
                sql.push('(');
                sql.push_str(&join.render());
                sql.push_str(") ");
                sql.push_str(alias);
            }
        }
        if let Some(condition) = &self.on_clause {
            sql.push_str(" ON ");
            sql.push_str(condition);
        }
        sql
    }
}

impl fmt::Display for JoinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ─── Union Composition ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionMode {
    All,
    Distinct,
}

impl UnionMode {
    pub const ALL_MODES: [UnionMode; 2] = [UnionMode::All, UnionMode::Distinct];

    pub const fn sql(self) -> &'static str {
        match self {
            Self::All => "UNION ALL",
            Self::Distinct => "UNION DISTINCT",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "union_all",
            Self::Distinct => "union_distinct",
        }
    }
}

/// Composed union of two or more select arms.
///
/// When an ordering is set, the union is wrapped in an outer select so
/// the ORDER BY applies to the combined rows; the union arms themselves
/// give no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSpec {
    arms: Vec<SelectSpec>,
    mode: UnionMode,
    order_by: Option<String>,
}

impl UnionSpec {
    pub fn new(mode: UnionMode) -> Self {
        Self {
            arms: Vec::new(),
            mode,
            order_by: None,
        }
    }

    #[must_use]
    pub fn arm(mut self, select: SelectSpec) -> Self {
        self.arms.push(select);
        self
    }

    #[must_use]
    pub fn order_by(mut self, keys: impl Into<String>) -> Self {
        self.order_by = Some(keys.into());
        self
    }

    pub fn deterministic(&self) -> bool {
        self.order_by.is_some()
    }

    pub fn render(&self) -> String {
        let joined = self
            .arms
            .iter()
            .map(SelectSpec::render)
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.mode.sql()));
        match &self.order_by {
            Some(keys) => format!("SELECT * FROM ({joined}) ORDER BY {keys}"),
            None => joined,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// CREATE TABLE ... ENGINE = ... ORDER BY ... AS SELECT ... statement.
pub fn create_table_as(table: &str, engine: &str, order_by: &str, select: &SelectSpec) -> String {
    format!(
        "CREATE TABLE {table} ENGINE = {engine} ORDER BY {order_by} AS {}",
        select.render()
    )
}

/// Quote a string as a SQL literal, escaping backslashes and quotes.
pub fn sql_quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
