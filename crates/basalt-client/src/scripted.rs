//! Deterministic in-process stand-in for a live cluster.
//!
//! Responses are keyed by the exact statement text plus the canonical
//! settings form, so a test scripts precisely the calls it expects. A
//! default response can be registered for broad scenarios where only a
//! few statements need distinct answers. Every call is recorded for
//! later inspection.

use std::collections::BTreeMap;

use basalt_error::{BasaltError, Result};
use parking_lot::Mutex;

use crate::{QueryOutput, Settings, SqlClient};

/// Scripted client double.
///
/// Lookup order for queries: exact (sql, settings) entry, then the
/// default response, then an `UnscriptedStatement` error. Commands have
/// their own response table.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    queries: BTreeMap<String, QueryOutput>,
    commands: BTreeMap<String, QueryOutput>,
    default_response: Option<QueryOutput>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for a query with empty settings.
    #[must_use]
    pub fn on_query(self, sql: impl Into<String>, response: QueryOutput) -> Self {
        self.on_query_with(sql, &Settings::new(), response)
    }

    /// Script a response for a query with specific settings.
    #[must_use]
    pub fn on_query_with(
        mut self,
        sql: impl Into<String>,
        settings: &Settings,
        response: QueryOutput,
    ) -> Self {
        self.queries.insert(query_key(&sql.into(), settings), response);
        self
    }

    /// Script a response for a host command.
    #[must_use]
    pub fn on_command(mut self, cmd: impl Into<String>, response: QueryOutput) -> Self {
        self.commands.insert(cmd.into(), response);
        self
    }

    /// Response returned for any query or command without an exact entry.
    #[must_use]
    pub fn with_default(mut self, response: QueryOutput) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Every call made so far, in order, as `query:`/`command:` keys.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn query_key(sql: &str, settings: &Settings) -> String {
    let canonical = settings.canonical();
    if canonical.is_empty() {
        sql.to_owned()
    } else {
        format!("{sql} [{canonical}]")
    }
}

impl SqlClient for ScriptedClient {
    fn query(&self, sql: &str, settings: &Settings) -> Result<QueryOutput> {
        let key = query_key(sql, settings);
        self.record(format!("query:{key}"));
        if let Some(response) = self.queries.get(&key) {
            return Ok(response.clone());
        }
        if let Some(response) = &self.default_response {
            return Ok(response.clone());
        }
        Err(BasaltError::UnscriptedStatement { statement: key })
    }

    fn command(&self, cmd: &str) -> Result<QueryOutput> {
        self.record(format!("command:{cmd}"));
        if let Some(response) = self.commands.get(cmd) {
            return Ok(response.clone());
        }
        if let Some(response) = &self.default_response {
            return Ok(response.clone());
        }
        Err(BasaltError::UnscriptedStatement {
            statement: cmd.to_owned(),
        })
    }

    fn identity(&self) -> String {
        "scripted".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins_over_default() {
        let client = ScriptedClient::new()
            .on_query("SELECT 1", QueryOutput::ok("1\n"))
            .with_default(QueryOutput::ok("default\n"));

        let out = client.query("SELECT 1", &Settings::new()).expect("scripted");
        assert_eq!(out.trimmed(), "1");

        let out = client.query("SELECT 2", &Settings::new()).expect("default");
        assert_eq!(out.trimmed(), "default");
    }

    #[test]
    fn settings_distinguish_responses() {
        let forced = Settings::one("force_select_final", 1);
        let client = ScriptedClient::new()
            .on_query("SELECT count() FROM t", QueryOutput::ok("4\n"))
            .on_query_with("SELECT count() FROM t", &forced, QueryOutput::ok("2\n"));

        let plain = client
            .query("SELECT count() FROM t", &Settings::new())
            .expect("plain");
        let collapsed = client
            .query("SELECT count() FROM t", &forced)
            .expect("forced");
        assert_eq!(plain.trimmed(), "4");
        assert_eq!(collapsed.trimmed(), "2");
    }

    #[test]
    fn unscripted_statement_is_an_error() {
        let client = ScriptedClient::new();
        let err = client.query("SELECT 1", &Settings::new()).unwrap_err();
        assert!(matches!(err, BasaltError::UnscriptedStatement { .. }));
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let client = ScriptedClient::new().with_default(QueryOutput::ok(""));
        client.query("SELECT 1", &Settings::new()).expect("ok");
        client.command("echo hi").expect("ok");
        assert_eq!(client.calls(), vec!["query:SELECT 1", "command:echo hi"]);
    }
}
