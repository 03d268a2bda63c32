//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;
use vaultlint::core::check::Check;
use vaultlint::core::error::CheckError;
use vaultlint::core::id::PackageId;
use vaultlint::core::package::{
    EmbeddedDescriptor, EmbeddedPackageInstallable, EmbeddedPayload, Installable, Package,
    PathAction, PathImport,
};
use vaultlint::core::report::Violation;
use vaultlint::core::session::Session;

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Records every lifecycle event as a formatted string.
pub struct RecordingCheck {
    name: String,
    events: EventLog,
}

impl RecordingCheck {
    pub fn new(name: &str, events: EventLog) -> Self {
        RecordingCheck {
            name: name.to_string(),
            events,
        }
    }

    fn log(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl Check for RecordingCheck {
    fn check_name(&self) -> String {
        self.name.clone()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        Vec::new()
    }

    fn started_scan(&mut self) {
        self.log("started_scan".to_string());
    }

    fn announce_run_modes(&mut self, run_modes: &BTreeSet<String>) {
        let modes: Vec<&str> = run_modes.iter().map(String::as_str).collect();
        self.log(format!("announce_run_modes:[{}]", modes.join(",")));
    }

    fn identify_package(&mut self, package_id: &PackageId, _file: Option<&Path>) {
        self.log(format!("identify_package:{package_id}"));
    }

    fn read_manifest(&mut self, package_id: &PackageId, _manifest: &BTreeMap<String, String>) {
        self.log(format!("read_manifest:{package_id}"));
    }

    fn identify_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        self.log(format!("identify_subpackage:{package_id}<{parent_id}"));
    }

    fn before_extract(
        &mut self,
        package_id: &PackageId,
        _session: &dyn Session,
        _manifest: &BTreeMap<String, String>,
        _subpackages: &[PackageId],
    ) -> Result<(), CheckError> {
        self.log(format!("before_extract:{package_id}"));
        Ok(())
    }

    fn imported_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        _action: PathAction,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!("imported_path:{package_id}:{path}"));
        Ok(())
    }

    fn deleted_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!("deleted_path:{package_id}:{path}"));
        Ok(())
    }

    fn after_extract(
        &mut self,
        package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!("after_extract:{package_id}"));
        Ok(())
    }

    fn identify_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: &PackageId,
        _installable: &EmbeddedPackageInstallable,
    ) {
        self.log(format!("identify_embedded_package:{package_id}<{parent_id}"));
    }

    fn before_deferred_install(
        &mut self,
        last_package: &PackageId,
        installable: &Installable,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!(
            "before_deferred_install:{last_package}@{}",
            installable.node_path()
        ));
        Ok(())
    }

    fn applied_init_scripts(
        &mut self,
        last_package: &PackageId,
        _installable: &Installable,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!("applied_init_scripts:{last_package}"));
        Ok(())
    }

    fn after_scan_package(
        &mut self,
        package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.log(format!("after_scan_package:{package_id}"));
        Ok(())
    }

    fn finished_scan(&mut self) {
        self.log("finished_scan".to_string());
    }
}

/// Fails a single named lifecycle method with a configurable error.
pub struct FailingCheck {
    name: String,
    fail_on: String,
    error: fn() -> CheckError,
}

impl FailingCheck {
    pub fn new(name: &str, fail_on: &str, error: fn() -> CheckError) -> Self {
        FailingCheck {
            name: name.to_string(),
            fail_on: fail_on.to_string(),
            error,
        }
    }

    fn maybe_fail(&self, method: &str) -> Result<(), CheckError> {
        if self.fail_on == method {
            Err((self.error)())
        } else {
            Ok(())
        }
    }
}

impl Check for FailingCheck {
    fn check_name(&self) -> String {
        self.name.clone()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        Vec::new()
    }

    fn imported_path(
        &mut self,
        _package_id: &PackageId,
        _path: &str,
        _action: PathAction,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.maybe_fail("imported_path")
    }

    fn after_extract(
        &mut self,
        _package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.maybe_fail("after_extract")
    }

    fn after_scan_package(
        &mut self,
        _package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.maybe_fail("after_scan_package")
    }
}

/// Records whether a path existed at each `after_extract`.
pub struct PathProbe {
    name: String,
    path: String,
    pub observations: Rc<RefCell<Vec<bool>>>,
}

impl PathProbe {
    pub fn new(name: &str, path: &str) -> Self {
        PathProbe {
            name: name.to_string(),
            path: path.to_string(),
            observations: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn observations(&self) -> Rc<RefCell<Vec<bool>>> {
        Rc::clone(&self.observations)
    }
}

impl Check for PathProbe {
    fn check_name(&self) -> String {
        self.name.clone()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        Vec::new()
    }

    fn after_extract(
        &mut self,
        _package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        let exists = session.path_exists(&self.path)?;
        self.observations.borrow_mut().push(exists);
        Ok(())
    }
}

pub fn import(path: &str) -> PathImport {
    PathImport {
        path: path.to_string(),
        action: PathAction::Added,
        primary_type: None,
        properties: BTreeMap::new(),
    }
}

pub fn package(id: &str) -> Package {
    Package::new(id)
}

pub fn embedded_package(node_path: &str, inner: Package, run_modes: &[&str]) -> EmbeddedDescriptor {
    EmbeddedDescriptor {
        node_path: node_path.to_string(),
        run_modes: run_modes.iter().map(|m| m.to_string()).collect(),
        payload: EmbeddedPayload::Package(inner),
    }
}

pub fn embedded_scripts(node_path: &str, statements: &[&str]) -> EmbeddedDescriptor {
    EmbeddedDescriptor {
        node_path: node_path.to_string(),
        run_modes: BTreeSet::new(),
        payload: EmbeddedPayload::InitScripts(
            statements.iter().map(|s| s.to_string()).collect(),
        ),
    }
}
