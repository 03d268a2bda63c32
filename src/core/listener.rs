//! Scan error listener.
//!
//! One method per error category rather than a single generic handler, so
//! callers can differentiate handling per category. The orchestrator never
//! drops a category silently: everything recoverable lands here, and the
//! default implementation records each report as a MAJOR violation in its
//! own check report.

use crate::core::error::{CheckError, HookError, PackageError, RepoError, RepoInitError};
use crate::core::id::PackageId;
use crate::core::init::ForcedRoot;
use crate::core::report::{Severity, Violation};

/// Receives recoverable scan errors by category.
#[allow(unused_variables)]
pub trait ErrorListener {
    fn started_scan(&mut self) {}

    fn finished_scan(&mut self) {}

    /// Violations recorded by this listener since the last `started_scan`.
    fn reported_violations(&self) -> Vec<Violation>;

    /// Display label for the listener's own report.
    fn listener_name(&self) -> String {
        "ErrorListener".to_string()
    }

    fn on_namespace_registration_error(&mut self, error: &RepoError, prefix: &str, uri: &str) {}

    fn on_privilege_registration_error(&mut self, error: &RepoError, privilege: &str) {}

    fn on_node_type_registration_error(&mut self, error: &RepoError, node_type: &str) {}

    fn on_forced_root_creation_error(&mut self, error: &RepoError, forced_root: &ForcedRoot) {}

    fn on_install_hook_error(&mut self, error: &HookError) {}

    fn on_prohibited_install_hook_registration(&mut self, package_id: &PackageId) {}

    /// A check failed in a non-path lifecycle method.
    fn on_listener_error(&mut self, error: &CheckError, check_name: &str, package_id: &PackageId) {}

    /// A check failed while observing a path event.
    fn on_listener_path_error(
        &mut self,
        error: &CheckError,
        check_name: &str,
        package_id: &PackageId,
        path: &str,
    ) {
    }

    fn on_subpackage_error(&mut self, error: &PackageError, package_id: &PackageId) {}

    /// The importer failed to apply a content entry.
    fn on_importer_error(&mut self, error: &RepoError, package_id: &PackageId, path: &str) {}

    fn on_repo_init_error(&mut self, error: &RepoInitError, package_id: &PackageId) {}
}

/// Records every reported category as a MAJOR violation.
#[derive(Debug, Default)]
pub struct DefaultErrorListener {
    violations: Vec<Violation>,
}

impl DefaultErrorListener {
    pub fn new() -> Self {
        DefaultErrorListener::default()
    }

    fn record(&mut self, description: String, packages: Vec<PackageId>) {
        self.violations
            .push(Violation::new(Severity::Major, description, packages));
    }
}

impl ErrorListener for DefaultErrorListener {
    fn started_scan(&mut self) {
        self.violations.clear();
    }

    fn reported_violations(&self) -> Vec<Violation> {
        self.violations.clone()
    }

    fn listener_name(&self) -> String {
        "DefaultErrorListener".to_string()
    }

    fn on_namespace_registration_error(&mut self, error: &RepoError, prefix: &str, uri: &str) {
        self.record(
            format!("Namespace registration error ({prefix}={uri}): {error}"),
            vec![],
        );
    }

    fn on_privilege_registration_error(&mut self, error: &RepoError, privilege: &str) {
        self.record(
            format!("Privilege registration error ({privilege}): {error}"),
            vec![],
        );
    }

    fn on_node_type_registration_error(&mut self, error: &RepoError, node_type: &str) {
        self.record(
            format!("Node type registration error ({node_type}): {error}"),
            vec![],
        );
    }

    fn on_forced_root_creation_error(&mut self, error: &RepoError, forced_root: &ForcedRoot) {
        self.record(
            format!("Forced root creation error ({}): {error}", forced_root.path),
            vec![],
        );
    }

    fn on_install_hook_error(&mut self, error: &HookError) {
        self.record(
            format!("Install hook error: {}", error.reason),
            vec![error.package.clone()],
        );
    }

    fn on_prohibited_install_hook_registration(&mut self, package_id: &PackageId) {
        self.record(
            "Prohibited install hook registration attempted".to_string(),
            vec![package_id.clone()],
        );
    }

    fn on_listener_error(&mut self, error: &CheckError, check_name: &str, package_id: &PackageId) {
        self.record(
            format!("Listener error ({check_name}): {error}"),
            vec![package_id.clone()],
        );
    }

    fn on_listener_path_error(
        &mut self,
        error: &CheckError,
        check_name: &str,
        package_id: &PackageId,
        path: &str,
    ) {
        self.record(
            format!("{path} - Listener error ({check_name}): {error}"),
            vec![package_id.clone()],
        );
    }

    fn on_subpackage_error(&mut self, error: &PackageError, package_id: &PackageId) {
        self.record(
            format!("Subpackage error: {error}"),
            vec![package_id.clone()],
        );
    }

    fn on_importer_error(&mut self, error: &RepoError, package_id: &PackageId, path: &str) {
        // Deletions of never-imported paths are routine; keep the noise down.
        if matches!(error, RepoError::PathNotFound(_)) {
            return;
        }
        self.record(
            format!("{path} - Importer error: {error}"),
            vec![package_id.clone()],
        );
    }

    fn on_repo_init_error(&mut self, error: &RepoInitError, package_id: &PackageId) {
        self.record(format!("{error}"), vec![package_id.clone()]);
    }
}
