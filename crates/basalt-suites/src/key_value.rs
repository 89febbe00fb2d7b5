//! Key-value extraction scenarios.
//!
//! Every case reads a `String` column through `extractKeyValuePairs`,
//! wraps the map in `toString` for a stable textual form, and snapshots
//! the result in `ORDER BY x` order. Extractor options are positional,
//! so [`ExtractOptions`] renders them as an ordered argument list and
//! fills the earlier slots with the server defaults whenever only a
//! later one is customized.
//!
//! The plain table holds well-formed pairs; the noisy table pads the
//! pairs with punctuation, free text, and one empty row; the delimited
//! and quoted tables carry inputs phrased for custom delimiters and a
//! custom quoting character.

use basalt_error::Result;
use basalt_harness::compose::{sql_quote, SelectSpec};

use crate::runner::FeatureState;
use crate::{CaseVerdict, SuiteContext};

// ─── Extractor Options ──────────────────────────────────────────────────

const DEFAULT_KEY_VALUE_DELIMITER: char = ':';
const DEFAULT_PAIR_DELIMITER: char = ',';

/// Optional arguments of `extractKeyValuePairs`, in positional order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    key_value_delimiter: Option<char>,
    pair_delimiter: Option<char>,
    quoting_character: Option<char>,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn key_value_delimiter(mut self, delimiter: char) -> Self {
        self.key_value_delimiter = Some(delimiter);
        self
    }

    #[must_use]
    pub fn pair_delimiter(mut self, delimiter: char) -> Self {
        self.pair_delimiter = Some(delimiter);
        self
    }

    #[must_use]
    pub fn quoting_character(mut self, quote: char) -> Self {
        self.quoting_character = Some(quote);
        self
    }

    /// Argument tail after the column, `", 'a', 'b'"` style. Arguments
    /// are positional, so setting a later one forces the defaults into
    /// the slots before it.
    fn render(self) -> String {
        let depth = if self.quoting_character.is_some() {
            3
        } else if self.pair_delimiter.is_some() {
            2
        } else if self.key_value_delimiter.is_some() {
            1
        } else {
            0
        };
        let slots = [
            self.key_value_delimiter
                .unwrap_or(DEFAULT_KEY_VALUE_DELIMITER),
            self.pair_delimiter.unwrap_or(DEFAULT_PAIR_DELIMITER),
            self.quoting_character.unwrap_or('"'),
        ];
        slots[..depth]
            .iter()
            .map(|c| format!(", {}", sql_quote(&c.to_string())))
            .collect()
    }
}

/// Ordered extraction of one table's `x` column under the given options.
pub fn extract_select(table: &str, options: ExtractOptions) -> SelectSpec {
    let projection = format!("toString(extractKeyValuePairs(x{})) AS kv", options.render());
    SelectSpec::new(projection, table).order_by("x")
}

// ─── Scenarios ──────────────────────────────────────────────────────────

pub fn column_input(ctx: &SuiteContext<'_>, state: &FeatureState) -> Result<Vec<CaseVerdict>> {
    let Some(tables) = state.key_value_tables.as_ref() else {
        return Ok(Vec::new());
    };
    let cases = [
        ("key_value_column_input", tables.plain.as_str(), ExtractOptions::new()),
        (
            "key_value_custom_delimiters",
            tables.delimited.as_str(),
            ExtractOptions::new().key_value_delimiter('=').pair_delimiter(';'),
        ),
        (
            "key_value_quoting_character",
            tables.quoted.as_str(),
            ExtractOptions::new().quoting_character('\''),
        ),
    ];
    let mut verdicts = Vec::with_capacity(cases.len());
    for (name, table, options) in cases {
        verdicts.push(ctx.check_snapshot(name, &extract_select(table, options).render())?);
    }
    Ok(verdicts)
}

pub fn column_input_special_characters(
    ctx: &SuiteContext<'_>,
    state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    let Some(tables) = state.key_value_tables.as_ref() else {
        return Ok(Vec::new());
    };
    let select = extract_select(tables.noisy.as_str(), ExtractOptions::new());
    Ok(vec![ctx.check_snapshot(
        "key_value_column_input_special_characters",
        &select.render(),
    )?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::KeyValueTables;
    use crate::CaseStatus;
    use basalt_client::scripted::ScriptedClient;
    use basalt_client::QueryOutput;
    use basalt_harness::config::RunConfig;
    use basalt_harness::snapshot::{SnapshotMode, SnapshotStore};

    fn state() -> FeatureState {
        FeatureState {
            key_value_tables: Some(KeyValueTables {
                plain: "key_value_input".to_owned(),
                noisy: "key_value_noisy_input".to_owned(),
                delimited: "key_value_delimited_input".to_owned(),
                quoted: "key_value_quoted_input".to_owned(),
            }),
            ..FeatureState::default()
        }
    }

    #[test]
    fn options_render_positionally() {
        assert_eq!(ExtractOptions::new().render(), "");
        assert_eq!(
            ExtractOptions::new().key_value_delimiter('=').render(),
            ", '='"
        );
        assert_eq!(
            ExtractOptions::new()
                .key_value_delimiter('=')
                .pair_delimiter(';')
                .render(),
            ", '=', ';'"
        );
        // A quoting character alone drags the delimiter defaults in.
        assert_eq!(
            ExtractOptions::new().quoting_character('\'').render(),
            ", ':', ',', '\\''"
        );
    }

    #[test]
    fn each_input_shape_gets_its_own_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = ScriptedClient::new()
            .with_default(QueryOutput::ok("{'name':'neymar','age':'31'}\n"));
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Bootstrap);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);

        let verdicts = column_input(&ctx, &state()).expect("scenario runs");
        assert_eq!(verdicts.len(), 3);
        assert!(verdicts.iter().all(|v| v.status == CaseStatus::Pass));
        assert_eq!(verdicts[0].case.as_deref(), Some("key_value_column_input"));
        assert_eq!(
            verdicts[1].case.as_deref(),
            Some("key_value_custom_delimiters")
        );
        assert_eq!(
            verdicts[2].case.as_deref(),
            Some("key_value_quoting_character")
        );

        let verdicts =
            column_input_special_characters(&ctx, &state()).expect("scenario runs");
        assert_eq!(
            verdicts[0].case.as_deref(),
            Some("key_value_column_input_special_characters")
        );

        let calls = client.calls();
        assert!(calls.iter().any(|c| c.starts_with(
            "query:SELECT toString(extractKeyValuePairs(x)) AS kv \
             FROM key_value_input ORDER BY x"
        )));
        assert!(calls.iter().any(|c| c.starts_with(
            "query:SELECT toString(extractKeyValuePairs(x, '=', ';')) AS kv \
             FROM key_value_delimited_input ORDER BY x"
        )));
        assert!(calls.iter().any(|c| c.starts_with(
            "query:SELECT toString(extractKeyValuePairs(x, ':', ',', '\\'')) AS kv \
             FROM key_value_quoted_input ORDER BY x"
        )));
        assert!(calls.iter().any(|c| c.starts_with(
            "query:SELECT toString(extractKeyValuePairs(x)) AS kv \
             FROM key_value_noisy_input ORDER BY x"
        )));
    }

    #[test]
    fn missing_fixture_reports_no_cases() {
        let client = ScriptedClient::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path(), SnapshotMode::Verify);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);

        assert!(column_input(&ctx, &FeatureState::default())
            .expect("runs")
            .is_empty());
        assert!(client.calls().is_empty());
    }
}
