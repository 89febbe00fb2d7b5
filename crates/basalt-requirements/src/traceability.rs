//! Scenario-to-requirement coverage table.
//!
//! [`COVERAGE`] maps every suite scenario to the requirements it
//! verifies. The table is static data with referential integrity
//! checked by [`validate`]: a row naming a requirement that is not in
//! the registry is a defect of this crate, caught in tests, never a
//! silent gap discovered in a report.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::lookup;

/// Requirements one scenario verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioCoverage {
    pub feature: &'static str,
    pub scenario: &'static str,
    pub requirements: &'static [&'static str],
}

pub static COVERAGE: &[ScenarioCoverage] = &[
    // ─── final ──────────────────────────────────────────────────────────
    ScenarioCoverage {
        feature: "final",
        scenario: "simple_select",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.FinalModifier",
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "simple_select_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_count",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Count",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_count_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Count"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_limit",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Limit",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_limit_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Limit"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_group_by",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.GroupBy",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_group_by_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.GroupBy"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_distinct",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Distinct",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_distinct_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Distinct"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_where",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Where",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_where_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Where"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_join_clause",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Join",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_join_clause_select",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Join"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_join_clause_select_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Join"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_multiple_join_clause_select",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Join"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_union_clause",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.Union",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_union_clause_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.Union"],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_with_clause",
        requirements: &[
            "RQ.SRS-030.Basalt.Selects.ForceFinal",
            "RQ.SRS-030.Basalt.Selects.ForceFinal.With",
        ],
    },
    ScenarioCoverage {
        feature: "final",
        scenario: "select_with_clause_negative",
        requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal.With"],
    },
    // ─── parquet ────────────────────────────────────────────────────────
    ScenarioCoverage {
        feature: "parquet",
        scenario: "glob",
        requirements: &[
            "RQ.SRS-032.Basalt.Parquet",
            "RQ.SRS-032.Basalt.Parquet.Import",
            "RQ.SRS-032.Basalt.Parquet.Import.Glob",
        ],
    },
    ScenarioCoverage {
        feature: "parquet",
        scenario: "nested_glob",
        requirements: &[
            "RQ.SRS-032.Basalt.Parquet.Import.Glob",
            "RQ.SRS-032.Basalt.Parquet.Import.Glob.MultiDirectory",
        ],
    },
    // ─── aggregates ─────────────────────────────────────────────────────
    ScenarioCoverage {
        feature: "aggregates",
        scenario: "min",
        requirements: &[
            "RQ.SRS-031.Basalt.AggregateFunctions",
            "RQ.SRS-031.Basalt.AggregateFunctions.Standard.Min",
        ],
    },
    ScenarioCoverage {
        feature: "aggregates",
        scenario: "arg_min",
        requirements: &[
            "RQ.SRS-031.Basalt.AggregateFunctions",
            "RQ.SRS-031.Basalt.AggregateFunctions.Specific.ArgMin",
        ],
    },
    // ─── key_value ──────────────────────────────────────────────────────
    ScenarioCoverage {
        feature: "key_value",
        scenario: "column_input",
        requirements: &[
            "RQ.SRS-033.Basalt.ExtractKeyValuePairs",
            "RQ.SRS-033.Basalt.ExtractKeyValuePairs.InputDataSource.Column",
        ],
    },
    ScenarioCoverage {
        feature: "key_value",
        scenario: "column_input_special_characters",
        requirements: &[
            "RQ.SRS-033.Basalt.ExtractKeyValuePairs.InputDataSource.Column",
            "RQ.SRS-033.Basalt.ExtractKeyValuePairs.Noise",
        ],
    },
    // ─── ssl ────────────────────────────────────────────────────────────
    ScenarioCoverage {
        feature: "ssl",
        scenario: "certificate_provisioning",
        requirements: &[
            "RQ.SRS-034.Basalt.SslServer",
            "RQ.SRS-034.Basalt.SslServer.Keystore.GenerateKeyPair",
            "RQ.SRS-034.Basalt.SslServer.Truststore.ImportCertificate",
        ],
    },
    ScenarioCoverage {
        feature: "ssl",
        scenario: "secure_client_port",
        requirements: &[
            "RQ.SRS-034.Basalt.SslServer",
            "RQ.SRS-034.Basalt.SslServer.ZooKeeper.SecureClientPort",
        ],
    },
];

/// Requirement names a scenario verifies, for report records. Unknown
/// scenarios get an empty list; integrity of the table itself is a test
/// concern, not a runtime one.
pub fn requirements_for(feature: &str, scenario: &str) -> Vec<String> {
    COVERAGE
        .iter()
        .find(|row| row.feature == feature && row.scenario == scenario)
        .map(|row| row.requirements.iter().map(|name| (*name).to_owned()).collect())
        .unwrap_or_default()
}

/// Referential-integrity diagnostics for a coverage table.
pub fn validate(coverage: &[ScenarioCoverage]) -> Vec<String> {
    let mut diagnostics = Vec::new();
    let mut seen = BTreeSet::new();
    for row in coverage {
        if !seen.insert((row.feature, row.scenario)) {
            diagnostics.push(format!(
                "duplicate coverage row: {}::{}",
                row.feature, row.scenario
            ));
        }
        if row.requirements.is_empty() {
            diagnostics.push(format!(
                "scenario without requirements: {}::{}",
                row.feature, row.scenario
            ));
        }
        for name in row.requirements {
            if lookup(name).is_none() {
                diagnostics.push(format!(
                    "unknown requirement {} referenced by {}::{}",
                    name, row.feature, row.scenario
                ));
            }
        }
    }
    diagnostics
}

/// Diagnostics for the built-in table.
pub fn validate_coverage() -> Vec<String> {
    validate(COVERAGE)
}

/// Aggregate view of how well the registry is covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageStats {
    /// Scenario count per covered requirement name.
    pub covered: BTreeMap<String, usize>,
    /// Registered requirements no scenario verifies.
    pub uncovered: Vec<String>,
    pub scenario_count: usize,
    pub requirement_count: usize,
}

pub fn coverage_stats(coverage: &[ScenarioCoverage]) -> CoverageStats {
    let mut covered: BTreeMap<String, usize> = BTreeMap::new();
    for row in coverage {
        for name in row.requirements {
            *covered.entry((*name).to_owned()).or_insert(0) += 1;
        }
    }
    let uncovered: Vec<String> = crate::all()
        .filter(|requirement| !covered.contains_key(requirement.name))
        .map(|requirement| requirement.name.to_owned())
        .collect();
    CoverageStats {
        scenario_count: coverage.len(),
        requirement_count: crate::all().count(),
        covered,
        uncovered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_referential_integrity() {
        let diagnostics = validate_coverage();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn validate_flags_unknown_requirement() {
        let table = [ScenarioCoverage {
            feature: "final",
            scenario: "select_count",
            requirements: &["RQ.SRS-030.Basalt.Selects.Imaginary"],
        }];
        let diagnostics = validate(&table);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("unknown requirement"));
    }

    #[test]
    fn validate_flags_duplicates_and_empty_rows() {
        let table = [
            ScenarioCoverage {
                feature: "final",
                scenario: "select_count",
                requirements: &["RQ.SRS-030.Basalt.Selects.ForceFinal"],
            },
            ScenarioCoverage {
                feature: "final",
                scenario: "select_count",
                requirements: &[],
            },
        ];
        let diagnostics = validate(&table);
        assert!(diagnostics.iter().any(|d| d.contains("duplicate coverage row")));
        assert!(diagnostics.iter().any(|d| d.contains("without requirements")));
    }

    #[test]
    fn requirements_for_known_and_unknown_scenarios() {
        let names = requirements_for("aggregates", "arg_min");
        assert_eq!(
            names,
            vec![
                "RQ.SRS-031.Basalt.AggregateFunctions".to_owned(),
                "RQ.SRS-031.Basalt.AggregateFunctions.Specific.ArgMin".to_owned(),
            ]
        );
        assert!(requirements_for("final", "no_such_scenario").is_empty());
    }

    #[test]
    fn stats_count_coverage_per_requirement() {
        let stats = coverage_stats(COVERAGE);
        assert_eq!(stats.scenario_count, COVERAGE.len());
        // The force-final umbrella is verified by many scenarios.
        assert!(stats.covered["RQ.SRS-030.Basalt.Selects.ForceFinal"] >= 8);
        // Every per-clause requirement is covered at least once.
        assert!(stats
            .uncovered
            .iter()
            .all(|name| !name.starts_with("RQ.SRS-030")));
    }

    #[test]
    fn stats_serialize_for_artifacts() {
        let stats = coverage_stats(COVERAGE);
        let json = serde_json::to_string(&stats).expect("serialize");
        assert!(json.contains("\"scenario_count\""));
        assert!(json.contains("RQ.SRS-032.Basalt.Parquet.Import.Glob"));
    }

    #[test]
    fn umbrella_requirements_are_covered() {
        let stats = coverage_stats(COVERAGE);
        for umbrella in [
            "RQ.SRS-031.Basalt.AggregateFunctions",
            "RQ.SRS-032.Basalt.Parquet",
            "RQ.SRS-033.Basalt.ExtractKeyValuePairs",
            "RQ.SRS-034.Basalt.SslServer",
        ] {
            assert!(stats.covered.contains_key(umbrella), "{umbrella} uncovered");
        }
    }
}
