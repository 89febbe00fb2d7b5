//! SSL keystore and secure-port configuration scenarios.
//!
//! These scenarios drive host-level tooling through
//! [`SqlClient::command`] rather than SQL: `keytool` builds a keystore
//! and truststore pair under `/tmp/basalt_ssl`, and the keeper config
//! gains a `secureClientPort` line. Store passwords come from the run
//! config's credential map and are never hard-coded; a missing
//! credential aborts the whole feature before any command runs.
//!
//! [`SqlClient::command`]: basalt_client::SqlClient::command

use basalt_client::Settings;
use basalt_error::{BasaltError, Result};

use crate::runner::FeatureState;
use crate::{CaseVerdict, SuiteContext};

pub const SSL_DIR: &str = "/tmp/basalt_ssl";
pub const KEYSTORE: &str = "/tmp/basalt_ssl/keystore.jks";
pub const TRUSTSTORE: &str = "/tmp/basalt_ssl/truststore.jks";
pub const CERTIFICATE: &str = "/tmp/basalt_ssl/server.crt";
pub const KEY_ALIAS: &str = "server";

pub const SECURE_CLIENT_PORT: u16 = 2281;
pub const KEEPER_CONFIG: &str = "/etc/zookeeper/conf/zoo.cfg";

/// Credentials the ssl feature refuses to start without.
pub const REQUIRED_CREDENTIALS: [&str; 2] = ["keystore_password", "truststore_password"];

fn required_credential<'a>(ctx: &SuiteContext<'a>, name: &str) -> Result<&'a str> {
    ctx.config
        .credential(name)
        .ok_or_else(|| BasaltError::CredentialMissing {
            name: name.to_owned(),
        })
}

// ─── Scenarios ──────────────────────────────────────────────────────────

/// Generate a keypair, export its certificate, and import it into a
/// fresh truststore, then prove the alias is listed.
pub fn certificate_provisioning(
    ctx: &SuiteContext<'_>,
    _state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    let keystore_password = required_credential(ctx, "keystore_password")?;
    let truststore_password = required_credential(ctx, "truststore_password")?;

    ctx.client.command_expect(
        &format!("mkdir -p {SSL_DIR} && rm -f {KEYSTORE} {TRUSTSTORE} {CERTIFICATE}"),
        0,
    )?;
    ctx.client.command_expect(
        &format!(
            "keytool -genkeypair -alias {KEY_ALIAS} -keyalg RSA -keysize 2048 \
             -validity 365 -dname 'CN=basalt' -keystore {KEYSTORE} \
             -storepass {keystore_password} -storetype JKS -noprompt"
        ),
        0,
    )?;
    ctx.client.command_expect(
        &format!(
            "keytool -exportcert -alias {KEY_ALIAS} -keystore {KEYSTORE} \
             -storepass {keystore_password} -rfc -file {CERTIFICATE}"
        ),
        0,
    )?;
    ctx.client.command_expect(
        &format!(
            "keytool -importcert -alias {KEY_ALIAS} -file {CERTIFICATE} \
             -keystore {TRUSTSTORE} -storepass {truststore_password} \
             -storetype JKS -noprompt"
        ),
        0,
    )?;
    ctx.client.command_expect(
        &format!(
            "keytool -list -keystore {TRUSTSTORE} -storepass {truststore_password} \
             | grep -q {KEY_ALIAS}"
        ),
        0,
    )?;

    Ok(vec![CaseVerdict::pass()])
}

/// Install `secureClientPort` into the keeper config, idempotently, and
/// prove the node still reaches its keeper afterwards.
pub fn secure_client_port(
    ctx: &SuiteContext<'_>,
    _state: &FeatureState,
) -> Result<Vec<CaseVerdict>> {
    let line = format!("secureClientPort={SECURE_CLIENT_PORT}");
    ctx.client.command_expect(
        &format!("grep -qx '{line}' {KEEPER_CONFIG} || echo '{line}' >> {KEEPER_CONFIG}"),
        0,
    )?;
    ctx.client
        .command_expect(&format!("grep -qx '{line}' {KEEPER_CONFIG}"), 0)?;
    ctx.client.query_ok(
        "SELECT count() FROM system.zookeeper_connection",
        &Settings::new(),
    )?;
    Ok(vec![CaseVerdict::pass()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaseStatus;
    use basalt_client::scripted::ScriptedClient;
    use basalt_client::QueryOutput;
    use basalt_harness::config::RunConfig;
    use basalt_harness::snapshot::{SnapshotMode, SnapshotStore};

    fn config_with_credentials() -> RunConfig {
        let mut config = RunConfig::default();
        config
            .credentials
            .insert("keystore_password".to_owned(), "ks-secret".to_owned());
        config
            .credentials
            .insert("truststore_password".to_owned(), "ts-secret".to_owned());
        config
    }

    #[test]
    fn provisioning_runs_the_keytool_chain_in_order() {
        let client = ScriptedClient::new().with_default(QueryOutput::ok(""));
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = config_with_credentials();
        let ctx = SuiteContext::new(&client, &store, &config);

        let verdicts =
            certificate_provisioning(&ctx, &FeatureState::default()).expect("scenario runs");
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].status, CaseStatus::Pass);

        let calls = client.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls[0].starts_with("command:mkdir -p /tmp/basalt_ssl"));
        assert!(calls[1].contains("-genkeypair"));
        assert!(calls[1].contains("-storepass ks-secret"));
        assert!(calls[2].contains("-exportcert"));
        assert!(calls[3].contains("-importcert"));
        assert!(calls[3].contains("-storepass ts-secret"));
        assert!(calls[4].contains("keytool -list"));
    }

    #[test]
    fn missing_credential_aborts_before_any_command() {
        let client = ScriptedClient::new().with_default(QueryOutput::ok(""));
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = RunConfig::default();
        let ctx = SuiteContext::new(&client, &store, &config);

        let err = certificate_provisioning(&ctx, &FeatureState::default()).unwrap_err();
        assert!(matches!(
            err,
            BasaltError::CredentialMissing { name } if name == "keystore_password"
        ));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn failed_keytool_step_is_fatal() {
        let client = ScriptedClient::new()
            .on_command(
                "mkdir -p /tmp/basalt_ssl && rm -f /tmp/basalt_ssl/keystore.jks \
                 /tmp/basalt_ssl/truststore.jks /tmp/basalt_ssl/server.crt",
                QueryOutput::ok(""),
            )
            .with_default(QueryOutput::failed(1, "keytool error: alias exists"));
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = config_with_credentials();
        let ctx = SuiteContext::new(&client, &store, &config);

        let err = certificate_provisioning(&ctx, &FeatureState::default()).unwrap_err();
        assert!(matches!(
            err,
            BasaltError::CommandFailed { exitcode: 1, expected: 0, .. }
        ));
    }

    #[test]
    fn secure_port_install_is_idempotent_and_probed() {
        let client = ScriptedClient::new().with_default(QueryOutput::ok("1\n"));
        let store = SnapshotStore::new("snapshots", SnapshotMode::Verify);
        let config = config_with_credentials();
        let ctx = SuiteContext::new(&client, &store, &config);

        let verdicts = secure_client_port(&ctx, &FeatureState::default()).expect("scenario runs");
        assert_eq!(verdicts.len(), 1);

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("grep -qx 'secureClientPort=2281' /etc/zookeeper/conf/zoo.cfg \
                                   || echo 'secureClientPort=2281'"));
        assert!(calls[2]
            .starts_with("query:SELECT count() FROM system.zookeeper_connection"));
    }
}
