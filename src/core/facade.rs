//! Structural check decorators.
//!
//! Both facades compose over any [`Check`] by plain delegation. `AliasCheck`
//! only renames; `SilencingCheck` drops content-affecting events while
//! silenced, which is how preinstall packages are installed without
//! producing findings.

use crate::core::check::{Check, MessageBundle};
use crate::core::error::CheckError;
use crate::core::id::PackageId;
use crate::core::package::{EmbeddedPackageInstallable, Installable, PathAction};
use crate::core::report::Violation;
use crate::core::session::Session;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Overrides only the check name; every other call passes through with the
/// same arguments, results, and errors.
pub struct AliasCheck {
    wrapped: Box<dyn Check>,
    alias: Option<String>,
}

impl AliasCheck {
    pub fn new(wrapped: Box<dyn Check>, alias: Option<String>) -> Self {
        AliasCheck { wrapped, alias }
    }
}

impl Check for AliasCheck {
    fn check_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.wrapped.check_name(),
        }
    }

    fn reported_violations(&self) -> Vec<Violation> {
        self.wrapped.reported_violations()
    }

    fn set_message_bundle(&mut self, bundle: &MessageBundle) {
        self.wrapped.set_message_bundle(bundle);
    }

    fn started_scan(&mut self) {
        self.wrapped.started_scan();
    }

    fn announce_run_modes(&mut self, run_modes: &BTreeSet<String>) {
        self.wrapped.announce_run_modes(run_modes);
    }

    fn identify_package(&mut self, package_id: &PackageId, file: Option<&Path>) {
        self.wrapped.identify_package(package_id, file);
    }

    fn read_manifest(&mut self, package_id: &PackageId, manifest: &BTreeMap<String, String>) {
        self.wrapped.read_manifest(package_id, manifest);
    }

    fn identify_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        self.wrapped.identify_subpackage(package_id, parent_id);
    }

    fn before_extract(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
        manifest: &BTreeMap<String, String>,
        subpackages: &[PackageId],
    ) -> Result<(), CheckError> {
        self.wrapped
            .before_extract(package_id, session, manifest, subpackages)
    }

    fn imported_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        action: PathAction,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped.imported_path(package_id, path, action, session)
    }

    fn deleted_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped.deleted_path(package_id, path, session)
    }

    fn after_extract(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped.after_extract(package_id, session)
    }

    fn identify_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: &PackageId,
        installable: &EmbeddedPackageInstallable,
    ) {
        self.wrapped
            .identify_embedded_package(package_id, parent_id, installable);
    }

    fn before_deferred_install(
        &mut self,
        last_package: &PackageId,
        installable: &Installable,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped
            .before_deferred_install(last_package, installable, session)
    }

    fn applied_init_scripts(
        &mut self,
        last_package: &PackageId,
        installable: &Installable,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped
            .applied_init_scripts(last_package, installable, session)
    }

    fn after_scan_package(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.wrapped.after_scan_package(package_id, session)
    }

    fn finished_scan(&mut self) {
        self.wrapped.finished_scan();
    }
}

/// Forcibly silences the wrapped check by not passing content-affecting
/// events while the flag is set. Scan boundaries, run-mode announcements,
/// bundle assignment, and report access always pass through.
pub struct SilencingCheck {
    wrapped: Box<dyn Check>,
    silenced: bool,
}

impl SilencingCheck {
    pub fn new(wrapped: Box<dyn Check>) -> Self {
        SilencingCheck {
            wrapped,
            silenced: false,
        }
    }

    pub fn set_silenced(&mut self, silenced: bool) {
        self.silenced = silenced;
    }

    pub fn is_silenced(&self) -> bool {
        self.silenced
    }
}

impl Check for SilencingCheck {
    fn check_name(&self) -> String {
        self.wrapped.check_name()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        self.wrapped.reported_violations()
    }

    fn set_message_bundle(&mut self, bundle: &MessageBundle) {
        self.wrapped.set_message_bundle(bundle);
    }

    fn started_scan(&mut self) {
        self.wrapped.started_scan();
    }

    fn announce_run_modes(&mut self, run_modes: &BTreeSet<String>) {
        self.wrapped.announce_run_modes(run_modes);
    }

    fn finished_scan(&mut self) {
        self.wrapped.finished_scan();
    }

    // Everything below is dropped while silenced.

    fn identify_package(&mut self, package_id: &PackageId, file: Option<&Path>) {
        if !self.silenced {
            self.wrapped.identify_package(package_id, file);
        }
    }

    fn read_manifest(&mut self, package_id: &PackageId, manifest: &BTreeMap<String, String>) {
        if !self.silenced {
            self.wrapped.read_manifest(package_id, manifest);
        }
    }

    fn identify_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        if !self.silenced {
            self.wrapped.identify_subpackage(package_id, parent_id);
        }
    }

    fn before_extract(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
        manifest: &BTreeMap<String, String>,
        subpackages: &[PackageId],
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped
            .before_extract(package_id, session, manifest, subpackages)
    }

    fn imported_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        action: PathAction,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped.imported_path(package_id, path, action, session)
    }

    fn deleted_path(
        &mut self,
        package_id: &PackageId,
        path: &str,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped.deleted_path(package_id, path, session)
    }

    fn after_extract(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped.after_extract(package_id, session)
    }

    fn identify_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: &PackageId,
        installable: &EmbeddedPackageInstallable,
    ) {
        if !self.silenced {
            self.wrapped
                .identify_embedded_package(package_id, parent_id, installable);
        }
    }

    fn before_deferred_install(
        &mut self,
        last_package: &PackageId,
        installable: &Installable,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped
            .before_deferred_install(last_package, installable, session)
    }

    fn applied_init_scripts(
        &mut self,
        last_package: &PackageId,
        installable: &Installable,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped
            .applied_init_scripts(last_package, installable, session)
    }

    fn after_scan_package(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if self.silenced {
            return Ok(());
        }
        self.wrapped.after_scan_package(package_id, session)
    }
}
