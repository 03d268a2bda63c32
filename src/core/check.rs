//! Check dispatch contract.
//!
//! A check is a stateful listener over the scan lifecycle. The orchestrator
//! calls every method synchronously on one thread, in package install order.
//! Checks must fully reset their accumulated state in `started_scan` so one
//! instance is safely reusable across scans; the orchestrator does not
//! enforce this, tests do.

use crate::core::error::CheckError;
use crate::core::id::PackageId;
use crate::core::package::{EmbeddedPackageInstallable, Installable, PathAction};
use crate::core::report::{Severity, Violation};
use crate::core::session::Session;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// String templates for violation messages, assignable to any check. Lookup
/// falls back to the key itself so checks can treat their default messages
/// as template keys.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: BTreeMap<String, String>,
}

impl MessageBundle {
    pub fn new(messages: BTreeMap<String, String>) -> Self {
        MessageBundle { messages }
    }

    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }
}

/// Lifecycle listener over one scan.
///
/// Methods handed a [`Session`] may fail with [`CheckError`]; a
/// repository-layer failure aborts the scan, anything else is reported
/// through the error listener and the scan continues.
pub trait Check {
    /// Display label used for this check's report.
    fn check_name(&self) -> String;

    /// Violations accumulated since the last `started_scan`.
    fn reported_violations(&self) -> Vec<Violation>;

    /// Assign message templates. Never silenced.
    fn set_message_bundle(&mut self, _bundle: &MessageBundle) {}

    /// First event of every scan; must reset all check-local state.
    fn started_scan(&mut self) {}

    /// Announces the active run modes governing deferred installs. Never
    /// silenced.
    fn announce_run_modes(&mut self, _run_modes: &BTreeSet<String>) {}

    /// A package explicitly listed for scanning has been opened.
    fn identify_package(&mut self, _package_id: &PackageId, _file: Option<&Path>) {}

    fn read_manifest(&mut self, _package_id: &PackageId, _manifest: &BTreeMap<String, String>) {}

    /// A package physically nested in `parent_id` has been opened.
    fn identify_subpackage(&mut self, _package_id: &PackageId, _parent_id: &PackageId) {}

    fn before_extract(
        &mut self,
        _package_id: &PackageId,
        _session: &dyn Session,
        _manifest: &BTreeMap<String, String>,
        _subpackages: &[PackageId],
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// The importer added, modified, or left a node untouched.
    fn imported_path(
        &mut self,
        _package_id: &PackageId,
        _path: &str,
        _action: PathAction,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// The importer deleted an existing node.
    fn deleted_path(
        &mut self,
        _package_id: &PackageId,
        _path: &str,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// Repository state may be inspected between packages here.
    fn after_extract(
        &mut self,
        _package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// An embedded package queued by `parent_id` has been opened for
    /// deferred install.
    fn identify_embedded_package(
        &mut self,
        _package_id: &PackageId,
        _parent_id: &PackageId,
        _installable: &EmbeddedPackageInstallable,
    ) {
    }

    /// Repository state may be inspected before a deferred installable is
    /// applied.
    fn before_deferred_install(
        &mut self,
        _last_package: &PackageId,
        _installable: &Installable,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// Repository-init scripts from a deferred installable were applied.
    fn applied_init_scripts(
        &mut self,
        _last_package: &PackageId,
        _installable: &Installable,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// Fired once per package after its subpackages and embedded installs
    /// complete. The finalization point for deferred judgments when the
    /// package is a root of the recorded ancestry graph.
    fn after_scan_package(
        &mut self,
        _package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    /// Last event of every scan.
    fn finished_scan(&mut self) {}
}

/// Embeddable violation accumulator with severity shortcuts; the shared
/// plumbing for simple check implementations.
#[derive(Debug, Default)]
pub struct ViolationCollector {
    violations: Vec<Violation>,
    bundle: MessageBundle,
}

impl ViolationCollector {
    pub fn new() -> Self {
        ViolationCollector::default()
    }

    /// Clear accumulated violations; call from `started_scan`.
    pub fn reset(&mut self) {
        self.violations.clear();
    }

    pub fn set_message_bundle(&mut self, bundle: &MessageBundle) {
        self.bundle = bundle.clone();
    }

    /// Resolve a message key through the assigned bundle.
    pub fn message<'a>(&'a self, key: &'a str) -> &'a str {
        self.bundle.get(key)
    }

    pub fn report(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn minor(&mut self, description: impl Into<String>, packages: Vec<PackageId>) {
        self.report(Violation::new(Severity::Minor, description, packages));
    }

    pub fn major(&mut self, description: impl Into<String>, packages: Vec<PackageId>) {
        self.report(Violation::new(Severity::Major, description, packages));
    }

    pub fn severe(&mut self, description: impl Into<String>, packages: Vec<PackageId>) {
        self.report(Violation::new(Severity::Severe, description, packages));
    }

    pub fn reported_violations(&self) -> Vec<Violation> {
        self.violations.clone()
    }
}
