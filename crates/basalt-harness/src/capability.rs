//! Fixture tables described by declared capabilities.
//!
//! Scenario applicability is decided by predicates over what a fixture
//! *declares* (engine family, role, capability flags), never by matching
//! substrings of its name. The declarations are set once when the
//! fixture set is built, next to the DDL that makes them true.

use std::fmt;

use serde::Serialize;

// ─── Engines ────────────────────────────────────────────────────────────

/// Storage engine families the suite provisions fixtures for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineFamily {
    MergeTree,
    ReplacingMergeTree,
    CollapsingMergeTree,
    VersionedCollapsingMergeTree,
    SummingMergeTree,
    AggregatingMergeTree,
    Merge,
    Log,
    StripeLog,
    TinyLog,
}

impl EngineFamily {
    pub const ALL: [EngineFamily; 10] = [
        EngineFamily::MergeTree,
        EngineFamily::ReplacingMergeTree,
        EngineFamily::CollapsingMergeTree,
        EngineFamily::VersionedCollapsingMergeTree,
        EngineFamily::SummingMergeTree,
        EngineFamily::AggregatingMergeTree,
        EngineFamily::Merge,
        EngineFamily::Log,
        EngineFamily::StripeLog,
        EngineFamily::TinyLog,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::MergeTree => "MergeTree",
            Self::ReplacingMergeTree => "ReplacingMergeTree",
            Self::CollapsingMergeTree => "CollapsingMergeTree",
            Self::VersionedCollapsingMergeTree => "VersionedCollapsingMergeTree",
            Self::SummingMergeTree => "SummingMergeTree",
            Self::AggregatingMergeTree => "AggregatingMergeTree",
            Self::Merge => "Merge",
            Self::Log => "Log",
            Self::StripeLog => "StripeLog",
            Self::TinyLog => "TinyLog",
        }
    }

    /// Whether the engine accepts the `FINAL` modifier at all.
    pub const fn supports_final(self) -> bool {
        matches!(
            self,
            Self::ReplacingMergeTree
                | Self::CollapsingMergeTree
                | Self::VersionedCollapsingMergeTree
                | Self::SummingMergeTree
                | Self::AggregatingMergeTree
        )
    }

    /// Whether reading with `FINAL` can change the visible row set
    /// (deduplication, collapsing, or pre-aggregation on read).
    pub const fn collapses_on_final(self) -> bool {
        self.supports_final()
    }

    /// Whether the family is a MergeTree variant that can be declared
    /// replicated.
    pub const fn replicable(self) -> bool {
        matches!(
            self,
            Self::MergeTree
                | Self::ReplacingMergeTree
                | Self::CollapsingMergeTree
                | Self::VersionedCollapsingMergeTree
                | Self::SummingMergeTree
                | Self::AggregatingMergeTree
        )
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete engine: family plus replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Engine {
    pub family: EngineFamily,
    pub replicated: bool,
}

impl Engine {
    pub const fn plain(family: EngineFamily) -> Self {
        Self {
            family,
            replicated: false,
        }
    }

    pub const fn replicated(family: EngineFamily) -> Self {
        Self {
            family,
            replicated: true,
        }
    }

    /// Engine name as it appears in DDL, e.g. `ReplicatedReplacingMergeTree`.
    pub fn sql_name(&self) -> String {
        if self.replicated {
            format!("Replicated{}", self.family.name())
        } else {
            self.family.name().to_owned()
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────────

/// Role a fixture plays in the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureRole {
    /// Primary fixture with duplicate-keyed rows for `FINAL` to collapse.
    Core,
    /// Same-engine partner holding a duplicated copy of the core data,
    /// used as the right side of joins and unions.
    Duplicate,
    /// Window view over a core table.
    WindowView,
    /// Normal view over a core table.
    NormalView,
    /// Live view over a core table.
    LiveView,
}

impl FixtureRole {
    pub const ALL: [FixtureRole; 5] = [
        FixtureRole::Core,
        FixtureRole::Duplicate,
        FixtureRole::WindowView,
        FixtureRole::NormalView,
        FixtureRole::LiveView,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Duplicate => "duplicate",
            Self::WindowView => "wview",
            Self::NormalView => "nview",
            Self::LiveView => "lview",
        }
    }

    pub const fn is_view(self) -> bool {
        matches!(self, Self::WindowView | Self::NormalView | Self::LiveView)
    }
}

/// One typed column of a fixture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Column {
    pub name: String,
    pub datatype: String,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.datatype)
    }
}

/// What a fixture declares about itself; filtering predicates consume
/// these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// `FINAL` is syntactically accepted on this fixture.
    pub final_modifier: bool,
    /// Reading with `FINAL` can change the visible row set.
    pub final_collapses_rows: bool,
    /// Usable on either side of a join.
    pub joinable: bool,
}

impl Capabilities {
    /// Capabilities implied by an engine.
    pub const fn for_engine(engine: Engine) -> Self {
        Self {
            final_modifier: engine.family.supports_final(),
            final_collapses_rows: engine.family.collapses_on_final(),
            joinable: true,
        }
    }
}

/// A provisioned test table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureTable {
    pub name: String,
    pub engine: Engine,
    pub role: FixtureRole,
    pub columns: Vec<Column>,
    pub capabilities: Capabilities,
}

impl FixtureTable {
    /// Fixture with capabilities derived from the engine.
    pub fn new(
        name: impl Into<String>,
        engine: Engine,
        role: FixtureRole,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            name: name.into(),
            engine,
            role,
            columns,
            capabilities: Capabilities::for_engine(engine),
        }
    }

    /// Override derived capabilities (views, special fixtures).
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn is_base_table(&self) -> bool {
        !self.role.is_view()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_sql_names() {
        assert_eq!(
            Engine::plain(EngineFamily::ReplacingMergeTree).sql_name(),
            "ReplacingMergeTree"
        );
        assert_eq!(
            Engine::replicated(EngineFamily::VersionedCollapsingMergeTree).sql_name(),
            "ReplicatedVersionedCollapsingMergeTree"
        );
    }

    #[test]
    fn final_support_by_family() {
        assert!(EngineFamily::ReplacingMergeTree.supports_final());
        assert!(EngineFamily::SummingMergeTree.supports_final());
        assert!(!EngineFamily::MergeTree.supports_final());
        assert!(!EngineFamily::Log.supports_final());
        assert!(!EngineFamily::Merge.supports_final());
    }

    #[test]
    fn capabilities_follow_engine() {
        let caps = Capabilities::for_engine(Engine::plain(EngineFamily::CollapsingMergeTree));
        assert!(caps.final_modifier);
        assert!(caps.final_collapses_rows);

        let caps = Capabilities::for_engine(Engine::plain(EngineFamily::TinyLog));
        assert!(!caps.final_modifier);
        assert!(!caps.final_collapses_rows);
    }

    #[test]
    fn fixture_lookup() {
        let fixture = FixtureTable::new(
            "ReplacingMergeTree_core",
            Engine::plain(EngineFamily::ReplacingMergeTree),
            FixtureRole::Core,
            vec![Column::new("id", "UInt64"), Column::new("x", "UInt32")],
        );
        assert!(fixture.is_base_table());
        assert_eq!(fixture.column("x").map(|c| c.datatype.as_str()), Some("UInt32"));
        assert!(fixture.column("missing").is_none());
    }
}
