//! Vaultlint: a scan engine for hierarchical content-package archives.
//!
//! Vaultlint installs package descriptors into a throwaway in-memory
//! content repository and dispatches every step of the install to a set of
//! registered checks, which accumulate violations and yield one report each
//! at scan end.
//!
//! # Core Principles
//!
//! - **Single-threaded dispatch**: every check sees events in install order
//! - **Fresh state per scan**: each scan starts from an empty repository
//! - **Recoverable by category**: non-fatal errors route to a listener
//!   method per category and the scan continues
//! - **Fatal means no report**: repository-layer failures abort the scan
//!
//! # Architecture
//!
//! ## Scan flow
//!
//! Init stages seed the repository, preinstall packages install silenced,
//! then each scan target is walked depth-first: subpackages extract
//! immediately, embedded installables queue until their container finishes
//! and are filtered by run mode.
//!
//! ## Checks
//!
//! A check implements [`core::check::Check`] and is registered directly or
//! located by name from a [`core::plan::ScanPlan`]. Facades compose over any
//! check: aliasing renames a report, silencing drops content events.
//!
//! # Crate Structure
//!
//! - [`core`]: scan orchestration, session, reports, plans, facades
//! - [`checks`]: built-in checks and deferred-expectation machinery

pub mod checks;
pub mod cli;
pub mod core;

pub use crate::core::check::Check;
pub use crate::core::error::AbortedScanError;
pub use crate::core::package::Package;
pub use crate::core::plan::ScanPlan;
pub use crate::core::report::{CheckReport, Severity, Violation};
pub use crate::core::scanner::{Scanner, ScannerBuilder};
