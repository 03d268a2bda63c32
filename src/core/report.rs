//! Violation and report model.
//!
//! Violations are immutable findings produced by checks during a scan. Each
//! check yields one `CheckReport` at scan end. Reports serialize to JSON and
//! round-trip losslessly, preserving severity, description text, and the
//! order of implicated package ids.

use crate::core::id::PackageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a violation, totally ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Unlikely to disrupt application functionality. Appropriate for style
    /// conventions or inconsistency between modes of installation.
    Minor,
    /// Likely to be the source of component instability. Appropriate for
    /// importer errors or mistaken root path assumptions.
    Major,
    /// Likely to be the source of platform instability. Appropriate for
    /// destructive content handling or security findings.
    Severe,
}

impl Severity {
    /// Case-insensitive lookup by name.
    pub fn by_name(name: &str) -> Option<Severity> {
        match name.to_ascii_lowercase().as_str() {
            "minor" => Some(Severity::Minor),
            "major" => Some(Severity::Major),
            "severe" => Some(Severity::Severe),
            _ => None,
        }
    }

    pub fn is_less_severe_than(self, other: Severity) -> bool {
        self < other
    }

    /// True when `self` is at least as severe as `minimum`.
    pub fn meets_minimum(self, minimum: Severity) -> bool {
        !self.is_less_severe_than(minimum)
    }

    pub fn max_severity(self, other: Severity) -> Severity {
        if self.is_less_severe_than(other) { other } else { self }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Severe => "SEVERE",
        };
        f.write_str(name)
    }
}

/// An immutable finding referencing zero or more implicated packages.
///
/// `packages` preserves insertion order and may contain duplicates; use
/// [`Violation::implicates`] for membership tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub packages: Vec<PackageId>,
}

impl Violation {
    pub fn new(
        severity: Severity,
        description: impl Into<String>,
        packages: Vec<PackageId>,
    ) -> Self {
        Violation {
            severity,
            description: description.into(),
            packages,
        }
    }

    pub fn implicates(&self, package_id: &PackageId) -> bool {
        self.packages.contains(package_id)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.description)?;
        if !self.packages.is_empty() {
            let ids: Vec<&str> = self.packages.iter().map(PackageId::as_str).collect();
            write!(f, " ({})", ids.join(", "))?;
        }
        Ok(())
    }
}

/// The violations accumulated by a single named check over one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub check_name: String,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn new(check_name: impl Into<String>, violations: Vec<Violation>) -> Self {
        CheckReport {
            check_name: check_name.into(),
            violations,
        }
    }

    /// Violations meeting the minimum severity; all of them when no minimum
    /// is given.
    pub fn violations_meeting(&self, minimum: Option<Severity>) -> Vec<&Violation> {
        match minimum {
            None => self.violations.iter().collect(),
            Some(min) => self
                .violations
                .iter()
                .filter(|v| v.severity.meets_minimum(min))
                .collect(),
        }
    }
}
