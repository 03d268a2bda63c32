//! Error types for the scan engine.
//!
//! Repository-layer errors are fatal to a scan; everything else is reported
//! through the category-specific [`ErrorListener`](crate::core::listener::ErrorListener)
//! surface and the scan continues. The install-hook gate decides between the
//! two treatments purely by configured policy.

use crate::core::id::{PackageId, PackageRef};
use std::fmt;
use thiserror::Error;

/// Content-repository-layer failures. Raised by session operations and by
/// checks inspecting repository state; always fatal to the scan in flight.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid repository path: {0:?}")]
    InvalidPath(String),
    #[error("no item exists at path: {0}")]
    PathNotFound(String),
    #[error("namespace prefix {prefix:?} already mapped to {existing:?}")]
    NamespaceConflict { prefix: String, existing: String },
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("session error: {0}")]
    Session(String),
}

/// Failure signaled by a check lifecycle method.
///
/// A `Repo` failure aborts the scan. Any other check failure is surfaced via
/// the listener-error categories and the scan continues.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("check error: {0}")]
    Check(String),
}

/// Normalized install-hook failure: registration failures and processor
/// failures both reduce to this, carrying the active package identifier.
#[derive(Debug, Error)]
#[error("install hook error for package {package}: {reason}")]
pub struct HookError {
    pub package: PackageId,
    pub reason: String,
}

impl HookError {
    pub fn new(package: PackageId, reason: impl Into<String>) -> Self {
        HookError {
            package,
            reason: reason.into(),
        }
    }
}

/// Structural package problems discovered while opening an archive.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package is not valid: {0}")]
    Invalid(PackageId),
}

/// Failure applying a repository-init script statement.
#[derive(Debug, Error)]
#[error("repoinit error in statement {statement:?}: {reason}")]
pub struct RepoInitError {
    pub statement: String,
    pub reason: String,
}

/// Configuration problems: unreadable plan or package descriptor files,
/// unknown check names, malformed rule patterns.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rule pattern: {0}")]
    Rule(#[from] regex::Error),
    #[error("unknown check: {0:?}")]
    UnknownCheck(String),
}

/// The underlying cause of an aborted scan.
#[derive(Debug, Error)]
pub enum ScanFault {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Terminates a scan with no report. Carries at most one reference to the
/// package that was active at the moment of failure, plus the original cause.
#[derive(Debug)]
pub struct AbortedScanError {
    package_ref: Option<PackageRef>,
    fault: ScanFault,
}

impl AbortedScanError {
    pub fn new(fault: impl Into<ScanFault>) -> Self {
        AbortedScanError {
            package_ref: None,
            fault: fault.into(),
        }
    }

    pub fn with_ref(fault: impl Into<ScanFault>, package_ref: PackageRef) -> Self {
        AbortedScanError {
            package_ref: Some(package_ref),
            fault: fault.into(),
        }
    }

    /// Attach a package reference unless an inner frame already did.
    pub fn or_ref(mut self, package_ref: PackageRef) -> Self {
        self.package_ref.get_or_insert(package_ref);
        self
    }

    pub fn package_ref(&self) -> Option<&PackageRef> {
        self.package_ref.as_ref()
    }

    pub fn fault(&self) -> &ScanFault {
        &self.fault
    }
}

impl fmt::Display for AbortedScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package_ref {
            Some(package_ref) => write!(f, "(Failed package: {}) {}", package_ref, self.fault),
            None => write!(f, "{}", self.fault),
        }
    }
}

impl std::error::Error for AbortedScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}
