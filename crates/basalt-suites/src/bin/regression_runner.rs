//! Regression suite runner.
//!
//! Loads a run config, drives the selected feature suites against the
//! configured cluster, and writes `report.json` plus `coverage.json`
//! into the artifacts directory. Exit code 0 means every scenario
//! passed (expected failures included), 1 means at least one scenario
//! failed, and 2 means the run itself could not proceed.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use basalt_harness::config::RunConfig;
use basalt_harness::snapshot::SnapshotMode;
use basalt_requirements::traceability::{coverage_stats, COVERAGE};
use basalt_suites::runner::{run_suite, Feature};

#[derive(Debug, Clone, Default)]
struct CliArgs {
    config_path: Option<PathBuf>,
    features: Vec<String>,
    snapshot_mode: Option<SnapshotMode>,
    artifacts_dir: Option<PathBuf>,
    list_features: bool,
}

impl CliArgs {
    /// Parse flags; `Ok(None)` means help was printed and the process
    /// should exit cleanly.
    fn parse() -> Result<Option<Self>, String> {
        let mut parsed = Self::default();
        let args: Vec<String> = env::args().skip(1).collect();
        let mut index = 0_usize;
        while index < args.len() {
            match args[index].as_str() {
                "--config" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --config".to_owned())?;
                    parsed.config_path = Some(PathBuf::from(value));
                }
                "--feature" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --feature".to_owned())?;
                    if Feature::parse(value).is_none() {
                        return Err(format!("unknown feature '{value}'; see --list-features"));
                    }
                    parsed.features.push(value.clone());
                }
                "--snapshot-mode" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --snapshot-mode".to_owned())?;
                    let mode = SnapshotMode::parse(value).ok_or_else(|| {
                        format!("unknown snapshot mode '{value}' (record, verify, bootstrap)")
                    })?;
                    parsed.snapshot_mode = Some(mode);
                }
                "--artifacts" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --artifacts".to_owned())?;
                    parsed.artifacts_dir = Some(PathBuf::from(value));
                }
                "--list-features" => parsed.list_features = true,
                "-h" | "--help" => {
                    print_help();
                    return Ok(None);
                }
                other => return Err(format!("unknown flag '{other}'")),
            }
            index += 1;
        }
        Ok(Some(parsed))
    }
}

fn build_config(args: &CliArgs) -> basalt_error::Result<RunConfig> {
    let mut config = match &args.config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if !args.features.is_empty() {
        config.features = args.features.clone();
    }
    if let Some(mode) = args.snapshot_mode {
        config.snapshot.mode = mode;
    }
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir = Some(dir.clone());
    }
    Ok(config)
}

fn write_coverage(path: &Path) -> basalt_error::Result<()> {
    let stats = coverage_stats(COVERAGE);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(&stats)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

fn summary_line(report: &basalt_harness::report::SuiteReport) -> String {
    format!("INFO {}", report.summary())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!(
        "basalt-regression - drive the Basalt regression feature suites

USAGE:
    basalt-regression [OPTIONS]

OPTIONS:
    --config <PATH>          JSON run config (defaults apply when omitted)
    --feature <NAME>         Run one feature; repeat the flag for several (default: all)
    --snapshot-mode <MODE>   record | verify | bootstrap (overrides the config)
    --artifacts <DIR>        Artifact output directory (overrides the config)
    --list-features          Print known feature names and exit
    -h, --help               Print this help"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_harness::report::SuiteReport;

    #[test]
    fn summary_line_is_info_key_value() {
        let report = SuiteReport::new("scripted", SnapshotMode::Verify);
        let line = summary_line(&report);
        assert!(line.starts_with("INFO total=0 pass=0"));
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = match CliArgs::parse() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("basalt-regression: {message}");
            return ExitCode::from(2);
        }
    };

    if args.list_features {
        for feature in Feature::ALL {
            println!("{feature}");
        }
        return ExitCode::SUCCESS;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("basalt-regression: {error}");
            return ExitCode::from(2);
        }
    };

    let client = config.shell_client();
    let report = match run_suite(&client, &config) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("basalt-regression: {error}");
            return ExitCode::from(2);
        }
    };

    let artifacts = config.artifacts_dir();
    if let Err(error) = report.write_json(&artifacts.join("report.json")) {
        eprintln!("basalt-regression: writing report: {error}");
        return ExitCode::from(2);
    }
    if let Err(error) = write_coverage(&artifacts.join("coverage.json")) {
        eprintln!("basalt-regression: writing coverage: {error}");
        return ExitCode::from(2);
    }

    println!("{}", summary_line(&report));
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
