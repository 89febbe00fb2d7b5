//! Dual-execution equivalence checking.
//!
//! A pair is two phrasings of the same question (or, for negative
//! controls, deliberately different questions) executed against the same
//! fixture. The checker compares normalized outputs and judges them
//! against the pair's expectation. On the wrong relation both outputs
//! travel with the result so the report shows exactly what diverged.
//!
//! Comparing multi-row output without a stable order would make the
//! harness itself flaky, so a pair built from nondeterministic selects
//! is rejected before anything executes; that rejection is a harness
//! defect, not a verdict about the system under test.

use basalt_client::{Settings, SqlClient};
use basalt_error::Result;
use tracing::{debug, warn};

use crate::compose::SelectSpec;
use crate::snapshot::normalize;

/// Relation the two outputs must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairExpectation {
    /// Outputs must be identical (equivalence pair).
    MustMatch,
    /// Outputs must differ (negative control).
    MustDiffer,
}

impl PairExpectation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::MustMatch => "must_match",
            Self::MustDiffer => "must_differ",
        }
    }
}

/// One side of a pair: rendered SQL plus its session settings.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryArm {
    pub sql: String,
    pub settings: Settings,
}

impl QueryArm {
    pub fn new(sql: impl Into<String>, settings: Settings) -> Self {
        Self {
            sql: sql.into(),
            settings,
        }
    }

    pub fn from_select(select: &SelectSpec, settings: Settings) -> Self {
        Self {
            sql: select.render(),
            settings,
        }
    }
}

/// A comparison between two query phrasings.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalencePair {
    pub id: String,
    pub left: QueryArm,
    pub right: QueryArm,
    pub expectation: PairExpectation,
    deterministic: bool,
}

impl EquivalencePair {
    /// Build a pair from two composed selects; the determinism contract
    /// is taken from the specs themselves.
    pub fn from_selects(
        id: impl Into<String>,
        left: &SelectSpec,
        left_settings: Settings,
        right: &SelectSpec,
        right_settings: Settings,
        expectation: PairExpectation,
    ) -> Self {
        Self {
            id: id.into(),
            left: QueryArm::from_select(left, left_settings),
            right: QueryArm::from_select(right, right_settings),
            expectation,
            deterministic: left.deterministic() && right.deterministic(),
        }
    }

    /// Build a pair from pre-rendered arms (joins, unions). The caller
    /// vouches for the determinism of both result sets.
    pub fn from_arms(
        id: impl Into<String>,
        left: QueryArm,
        right: QueryArm,
        expectation: PairExpectation,
        deterministic: bool,
    ) -> Self {
        Self {
            id: id.into(),
            left,
            right,
            expectation,
            deterministic,
        }
    }

    pub const fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Diagnostics that make this pair unfit to execute.
    pub fn validate(&self) -> Vec<String> {
        let mut diagnostics = Vec::new();
        if !self.deterministic {
            diagnostics.push(format!(
                "pair '{}' compares output without a stable order; add ORDER BY or a single-row aggregate",
                self.id
            ));
        }
        if self.left.sql == self.right.sql && self.left.settings == self.right.settings {
            diagnostics.push(format!(
                "pair '{}' compares a query against itself",
                self.id
            ));
        }
        diagnostics
    }
}

/// Verdict of one executed (or rejected) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquivalenceOutcome {
    Pass,
    /// Expected a match, outputs differ.
    Mismatch,
    /// Negative control expected a difference, outputs were equal. The
    /// comparison logic itself is suspect when this fires.
    UnexpectedMatch,
    /// Pair rejected before execution.
    HarnessDefect,
}

/// Result of checking one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceReport {
    pub id: String,
    pub outcome: EquivalenceOutcome,
    pub left_output: String,
    pub right_output: String,
    pub diagnostics: Vec<String>,
}

impl EquivalenceReport {
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, EquivalenceOutcome::Pass)
    }

    /// Failure text carrying both outputs, for the scenario report.
    pub fn failure_detail(&self) -> Option<String> {
        match self.outcome {
            EquivalenceOutcome::Pass => None,
            EquivalenceOutcome::Mismatch => Some(format!(
                "outputs differ\nleft:\n{}\nright:\n{}",
                self.left_output, self.right_output
            )),
            EquivalenceOutcome::UnexpectedMatch => Some(format!(
                "negative control matched; comparison logic is suspect\noutput:\n{}",
                self.left_output
            )),
            EquivalenceOutcome::HarnessDefect => Some(self.diagnostics.join("; ")),
        }
    }
}

/// Execute both arms and judge the outputs against the expectation.
///
/// Transport failures and unexpected exit codes propagate as errors and
/// are fatal to the enclosing scenario; an output *relation* failure is
/// a report, not an error.
pub fn check_pair(client: &dyn SqlClient, pair: &EquivalencePair) -> Result<EquivalenceReport> {
    let diagnostics = pair.validate();
    if !diagnostics.is_empty() {
        warn!(pair = %pair.id, ?diagnostics, "pair_rejected");
        return Ok(EquivalenceReport {
            id: pair.id.clone(),
            outcome: EquivalenceOutcome::HarnessDefect,
            left_output: String::new(),
            right_output: String::new(),
            diagnostics,
        });
    }

    let left = client.query_ok(&pair.left.sql, &pair.left.settings)?;
    let right = client.query_ok(&pair.right.sql, &pair.right.settings)?;
    let left_output = normalize(left.trimmed());
    let right_output = normalize(right.trimmed());
    let equal = left_output == right_output;

    let outcome = match (pair.expectation, equal) {
        (PairExpectation::MustMatch, true) | (PairExpectation::MustDiffer, false) => {
            EquivalenceOutcome::Pass
        }
        (PairExpectation::MustMatch, false) => EquivalenceOutcome::Mismatch,
        (PairExpectation::MustDiffer, true) => EquivalenceOutcome::UnexpectedMatch,
    };
    debug!(
        pair = %pair.id,
        expectation = pair.expectation.name(),
        equal,
        "pair_checked"
    );

    Ok(EquivalenceReport {
        id: pair.id.clone(),
        outcome,
        left_output,
        right_output,
        diagnostics,
    })
}
