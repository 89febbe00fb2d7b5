//! Approval-style snapshot store.
//!
//! A snapshot is a named baseline string persisted under the store root,
//! one file per name. What happens when a baseline is missing is an
//! explicit, configured policy ([`SnapshotMode`]), never an accident of
//! call-site defaults:
//!
//! - `Verify`: missing baseline is a scenario failure. The CI default.
//! - `Bootstrap`: missing baseline is recorded and the scenario passes;
//!   present baselines are verified.
//! - `Record`: every candidate is written, nothing is compared.
//!
//! Both candidate and baseline pass through [`normalize`] before the
//! byte comparison, so line-ending and trailing-whitespace drift never
//! produces a mismatch.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use basalt_error::{BasaltError, Result};
use serde::{Deserialize, Serialize};

/// Policy for handling a missing baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    Record,
    Verify,
    Bootstrap,
}

impl SnapshotMode {
    pub const ALL: [SnapshotMode; 3] = [
        SnapshotMode::Record,
        SnapshotMode::Verify,
        SnapshotMode::Bootstrap,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Verify => "verify",
            Self::Bootstrap => "bootstrap",
        }
    }

    /// Parse a CLI/config spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == raw)
    }
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of checking one candidate against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Candidate matched the stored baseline.
    Matched,
    /// Candidate was written as the new baseline.
    Recorded,
    /// Candidate differed from the stored baseline.
    Mismatch { expected: String, actual: String },
    /// No baseline exists and the mode forbids recording one.
    MissingBaseline,
}

impl SnapshotOutcome {
    /// Whether the enclosing scenario passes on this outcome.
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Matched | Self::Recorded)
    }
}

/// On-disk snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
    mode: SnapshotMode,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>, mode: SnapshotMode) -> Self {
        Self {
            root: root.into(),
            mode,
        }
    }

    pub const fn mode(&self) -> SnapshotMode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check `candidate` against the baseline stored under `name`,
    /// applying the store's mode.
    pub fn check(&self, name: &str, candidate: &str) -> Result<SnapshotOutcome> {
        let candidate = normalize(candidate);
        match self.mode {
            SnapshotMode::Record => {
                self.write(name, &candidate)?;
                Ok(SnapshotOutcome::Recorded)
            }
            SnapshotMode::Verify => match self.read(name)? {
                Some(baseline) => Ok(compare(&baseline, &candidate)),
                None => Ok(SnapshotOutcome::MissingBaseline),
            },
            SnapshotMode::Bootstrap => match self.read(name)? {
                Some(baseline) => Ok(compare(&baseline, &candidate)),
                None => {
                    self.write(name, &candidate)?;
                    Ok(SnapshotOutcome::Recorded)
                }
            },
        }
    }

    /// Read a baseline, normalized, if one exists.
    pub fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(normalize(&content))),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Write a baseline, replacing any previous content.
    pub fn write(&self, name: &str, content: &str) -> Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.root)?;
        let mut payload = normalize(content);
        if !payload.is_empty() {
            payload.push('\n');
        }
        fs::write(&path, payload)?;
        Ok(())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}.snap")))
    }
}

fn compare(baseline: &str, candidate: &str) -> SnapshotOutcome {
    if baseline == candidate {
        SnapshotOutcome::Matched
    } else {
        SnapshotOutcome::Mismatch {
            expected: baseline.to_owned(),
            actual: candidate.to_owned(),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BasaltError::SnapshotName {
            name: name.to_owned(),
            detail: "empty name".to_owned(),
        });
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(BasaltError::SnapshotName {
            name: name.to_owned(),
            detail: format!("character '{bad}' is not allowed"),
        });
    }
    Ok(())
}

/// Turn an arbitrary label (datatype names with parentheses, scenario
/// parameters with commas) into a valid store key component.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

/// Canonical text form used for every comparison in the suite: CRLF
/// becomes LF, trailing whitespace is stripped per line, and the whole
/// string is trimmed of leading/trailing blank lines.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let stripped: Vec<&str> = unified.lines().map(str::trim_end).collect();
    stripped.join("\n").trim_matches('\n').to_owned()
}
