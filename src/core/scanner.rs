//! Scan orchestration.
//!
//! The scanner drives one scan end to end on a single thread: it seeds a
//! fresh in-memory session, announces the scan to every registered check,
//! installs preinstall packages silenced, then walks each scan target
//! depth-first (subpackages immediately, embedded installs queued per
//! container), and assembles one report per check at the end. A fatal error
//! stops all further dispatch and surfaces as [`AbortedScanError`] with the
//! active package reference; no reports are produced for an aborted scan.

use crate::core::check::{Check, MessageBundle};
use crate::core::error::{
    AbortedScanError, CheckError, HookError, PackageError, RepoInitError,
};
use crate::core::facade::{AliasCheck, SilencingCheck};
use crate::core::hooks::{
    DefaultHookProcessor, GatedHookProcessor, InstallHookPolicy, InstallHookProcessor,
};
use crate::core::id::{PackageId, PackageRef};
use crate::core::init::InitStage;
use crate::core::listener::{DefaultErrorListener, ErrorListener};
use crate::core::package::{
    EmbeddedPackageInstallable, EmbeddedPayload, Installable, Package,
};
use crate::core::report::CheckReport;
use crate::core::session::{DEFAULT_PRIMARY_TYPE, MemorySession, Session};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Predicate deciding whether identification events for a subpackage
/// (child, parent) should be suppressed. Extraction is unaffected.
pub type SubpackageSilencer = Box<dyn Fn(&PackageId, &PackageId) -> bool>;

pub struct ScannerBuilder {
    checks: Vec<SilencingCheck>,
    listener: Option<Rc<RefCell<dyn ErrorListener>>>,
    init_stages: Vec<InitStage>,
    preinstall_packages: Vec<Package>,
    run_modes: BTreeSet<String>,
    hook_policy: InstallHookPolicy,
    subpackage_silencer: Option<SubpackageSilencer>,
    message_bundle: Option<MessageBundle>,
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        ScannerBuilder {
            checks: Vec::new(),
            listener: None,
            init_stages: Vec::new(),
            preinstall_packages: Vec::new(),
            run_modes: BTreeSet::new(),
            hook_policy: InstallHookPolicy::default(),
            subpackage_silencer: None,
            message_bundle: None,
        }
    }
}

impl ScannerBuilder {
    pub fn new() -> Self {
        ScannerBuilder::default()
    }

    pub fn add_check(mut self, check: Box<dyn Check>) -> Self {
        self.checks.push(SilencingCheck::new(check));
        self
    }

    /// Register a check under a display alias.
    pub fn add_check_as(mut self, alias: impl Into<String>, check: Box<dyn Check>) -> Self {
        let aliased = AliasCheck::new(check, Some(alias.into()));
        self.checks.push(SilencingCheck::new(Box::new(aliased)));
        self
    }

    pub fn with_error_listener(mut self, listener: Rc<RefCell<dyn ErrorListener>>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn add_init_stage(mut self, stage: InitStage) -> Self {
        self.init_stages.push(stage);
        self
    }

    /// Packages installed silenced before the scan targets, to provide
    /// preexisting repository state without producing findings.
    pub fn add_preinstall_package(mut self, package: Package) -> Self {
        self.preinstall_packages.push(package);
        self
    }

    pub fn with_run_modes(mut self, run_modes: BTreeSet<String>) -> Self {
        self.run_modes = run_modes;
        self
    }

    pub fn with_install_hook_policy(mut self, policy: InstallHookPolicy) -> Self {
        self.hook_policy = policy;
        self
    }

    pub fn with_subpackage_silencer(mut self, silencer: SubpackageSilencer) -> Self {
        self.subpackage_silencer = Some(silencer);
        self
    }

    pub fn with_message_bundle(mut self, bundle: MessageBundle) -> Self {
        self.message_bundle = Some(bundle);
        self
    }

    pub fn build(self) -> Scanner {
        Scanner {
            checks: self.checks,
            listener: self
                .listener
                .unwrap_or_else(|| Rc::new(RefCell::new(DefaultErrorListener::new()))),
            init_stages: self.init_stages,
            preinstall_packages: self.preinstall_packages,
            run_modes: self.run_modes,
            hook_policy: self.hook_policy,
            subpackage_silencer: self.subpackage_silencer,
            message_bundle: self.message_bundle,
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("checks", &self.checks.len())
            .field("init_stages", &self.init_stages)
            .field("preinstall_packages", &self.preinstall_packages)
            .field("run_modes", &self.run_modes)
            .field("hook_policy", &self.hook_policy)
            .finish_non_exhaustive()
    }
}

pub struct Scanner {
    checks: Vec<SilencingCheck>,
    listener: Rc<RefCell<dyn ErrorListener>>,
    init_stages: Vec<InitStage>,
    preinstall_packages: Vec<Package>,
    run_modes: BTreeSet<String>,
    hook_policy: InstallHookPolicy,
    subpackage_silencer: Option<SubpackageSilencer>,
    message_bundle: Option<MessageBundle>,
}

impl Scanner {
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    /// Scan the given packages in sequence against a fresh repository.
    ///
    /// The same scanner instance is reusable: every check and the error
    /// listener are reset through their `started_scan` contract.
    pub fn scan_packages(
        &mut self,
        packages: &[Package],
    ) -> Result<Vec<CheckReport>, AbortedScanError> {
        self.listener.borrow_mut().started_scan();
        let mut session = MemorySession::new();

        for stage in &self.init_stages {
            stage.apply(&mut session, &mut *self.listener.borrow_mut());
        }

        if let Some(bundle) = self.message_bundle.clone() {
            for check in &mut self.checks {
                check.set_message_bundle(&bundle);
            }
        }
        for check in &mut self.checks {
            check.started_scan();
        }
        let run_modes = self.run_modes.clone();
        for check in &mut self.checks {
            check.announce_run_modes(&run_modes);
        }

        let result = self.run_scan(&mut session, packages);

        match result {
            Ok(()) => {
                for check in &mut self.checks {
                    check.finished_scan();
                }
                self.listener.borrow_mut().finished_scan();
                let listener = self.listener.borrow();
                let mut reports = vec![CheckReport::new(
                    listener.listener_name(),
                    listener.reported_violations(),
                )];
                for check in &self.checks {
                    reports.push(CheckReport::new(
                        check.check_name(),
                        check.reported_violations(),
                    ));
                }
                Ok(reports)
            }
            Err(error) => {
                // A fatal abort stops all further check dispatch; only the
                // listener observes the end of the scan.
                self.listener.borrow_mut().finished_scan();
                Err(error)
            }
        }
    }

    fn run_scan(
        &mut self,
        session: &mut MemorySession,
        packages: &[Package],
    ) -> Result<(), AbortedScanError> {
        let preinstall = std::mem::take(&mut self.preinstall_packages);
        for check in &mut self.checks {
            check.set_silenced(true);
        }
        let mut pre_result = Ok(());
        for package in &preinstall {
            pre_result = self.process_scan_target(session, package);
            if pre_result.is_err() {
                break;
            }
        }
        for check in &mut self.checks {
            check.set_silenced(false);
        }
        self.preinstall_packages = preinstall;
        pre_result?;

        for package in packages {
            self.process_scan_target(session, package)?;
        }
        Ok(())
    }

    fn process_scan_target(
        &mut self,
        session: &mut MemorySession,
        package: &Package,
    ) -> Result<(), AbortedScanError> {
        let result = self.process_scan_target_inner(session, package);
        match &package.reference {
            Some(reference) => result.map_err(|e| e.or_ref(reference.clone())),
            None => result,
        }
    }

    fn process_scan_target_inner(
        &mut self,
        session: &mut MemorySession,
        package: &Package,
    ) -> Result<(), AbortedScanError> {
        if !package.valid {
            return Err(AbortedScanError::new(PackageError::Invalid(
                package.id.clone(),
            )));
        }
        let file = match &package.reference {
            Some(PackageRef::File(path)) => Some(path.as_path()),
            _ => None,
        };
        for check in &mut self.checks {
            check.identify_package(&package.id, file);
        }
        self.install_package(session, package)
    }

    /// Install one package: manifest, extraction, subpackages depth-first,
    /// then the embedded queue, then the per-package finalization event.
    fn install_package(
        &mut self,
        session: &mut MemorySession,
        package: &Package,
    ) -> Result<(), AbortedScanError> {
        for check in &mut self.checks {
            check.read_manifest(&package.id, &package.manifest);
        }
        let subpackage_ids = package.subpackage_ids();
        self.dispatch(session, &package.id, None, |check, s| {
            check.before_extract(&package.id, s, &package.manifest, &subpackage_ids)
        })?;

        self.extract(session, package)?;

        for sub in &package.subpackages {
            if !sub.valid {
                self.listener
                    .borrow_mut()
                    .on_subpackage_error(&PackageError::Invalid(sub.id.clone()), &sub.id);
                continue;
            }
            let silenced = self
                .subpackage_silencer
                .as_ref()
                .is_some_and(|silencer| silencer(&sub.id, &package.id));
            if !silenced {
                for check in &mut self.checks {
                    check.identify_subpackage(&sub.id, &package.id);
                }
            }
            self.install_package(session, sub)?;
        }

        self.process_embedded(session, package)?;

        self.dispatch(session, &package.id, None, |check, s| {
            check.after_scan_package(&package.id, s)
        })
    }

    fn extract(
        &mut self,
        session: &mut MemorySession,
        package: &Package,
    ) -> Result<(), AbortedScanError> {
        let delegate = Box::new(DefaultHookProcessor::new(package.id.clone()));
        let mut gate = GatedHookProcessor::new(
            package.id.clone(),
            self.hook_policy,
            Rc::clone(&self.listener),
            delegate,
        );
        gate.register_hooks(&package.hooks)
            .map_err(AbortedScanError::new)?;

        for import in &package.imports {
            let primary_type = import.primary_type.as_deref().unwrap_or(DEFAULT_PRIMARY_TYPE);
            match session.create_path(&import.path, primary_type) {
                Ok(()) => {
                    for (name, value) in &import.properties {
                        if let Err(error) = session.set_property(&import.path, name, value) {
                            self.listener.borrow_mut().on_importer_error(
                                &error,
                                &package.id,
                                &import.path,
                            );
                        }
                    }
                }
                Err(error) => {
                    self.listener
                        .borrow_mut()
                        .on_importer_error(&error, &package.id, &import.path);
                }
            }
            self.dispatch(session, &package.id, Some(&import.path), |check, s| {
                check.imported_path(&package.id, &import.path, import.action, s)
            })?;
        }

        for path in &package.deletes {
            if let Err(error) = session.remove_path(path) {
                self.listener
                    .borrow_mut()
                    .on_importer_error(&error, &package.id, path);
            }
            self.dispatch(session, &package.id, Some(path), |check, s| {
                check.deleted_path(&package.id, path, s)
            })?;
        }

        if gate.has_hooks() && !gate.execute(session) {
            let error = HookError::new(package.id.clone(), "install hook execution failed");
            if self.hook_policy == InstallHookPolicy::Abort {
                return Err(AbortedScanError::new(error));
            }
            self.listener.borrow_mut().on_install_hook_error(&error);
        }

        session.save().map_err(AbortedScanError::new)?;

        self.dispatch(session, &package.id, None, |check, s| {
            check.after_extract(&package.id, s)
        })
    }

    /// Process the container's embedded queue, filtering each installable
    /// against the active run modes. A skipped installable produces no
    /// lifecycle events at all.
    fn process_embedded(
        &mut self,
        session: &mut MemorySession,
        package: &Package,
    ) -> Result<(), AbortedScanError> {
        for descriptor in &package.embedded {
            if !descriptor.run_modes.is_empty()
                && descriptor.run_modes.is_disjoint(&self.run_modes)
            {
                continue;
            }
            match &descriptor.payload {
                EmbeddedPayload::Package(embedded) => {
                    let installable = EmbeddedPackageInstallable {
                        parent_id: package.id.clone(),
                        node_path: descriptor.node_path.clone(),
                        embedded_id: embedded.id.clone(),
                    };
                    self.install_embedded(session, package, embedded, installable)
                        .map_err(|e| e.or_ref(PackageRef::Node(descriptor.node_path.clone())))?;
                }
                EmbeddedPayload::InitScripts(statements) => {
                    let installable = Installable::InitScripts {
                        parent_id: package.id.clone(),
                        node_path: descriptor.node_path.clone(),
                        statements: statements.clone(),
                    };
                    self.apply_init_scripts(session, package, &installable, statements)?;
                }
            }
        }
        Ok(())
    }

    fn install_embedded(
        &mut self,
        session: &mut MemorySession,
        container: &Package,
        embedded: &Package,
        installable: EmbeddedPackageInstallable,
    ) -> Result<(), AbortedScanError> {
        let wrapped = Installable::Package(installable.clone());
        self.dispatch(session, &container.id, None, |check, s| {
            check.before_deferred_install(&container.id, &wrapped, s)
        })?;
        if !embedded.valid {
            self.listener
                .borrow_mut()
                .on_subpackage_error(&PackageError::Invalid(embedded.id.clone()), &embedded.id);
            return Ok(());
        }
        for check in &mut self.checks {
            check.identify_embedded_package(&embedded.id, &container.id, &installable);
        }
        self.install_package(session, embedded)
    }

    fn apply_init_scripts(
        &mut self,
        session: &mut MemorySession,
        container: &Package,
        installable: &Installable,
        statements: &[String],
    ) -> Result<(), AbortedScanError> {
        self.dispatch(session, &container.id, None, |check, s| {
            check.before_deferred_install(&container.id, installable, s)
        })?;
        for statement in statements {
            match parse_create_path(statement) {
                Some(path) => {
                    if let Err(error) = session.create_path(path, DEFAULT_PRIMARY_TYPE) {
                        self.listener.borrow_mut().on_repo_init_error(
                            &RepoInitError {
                                statement: statement.clone(),
                                reason: error.to_string(),
                            },
                            &container.id,
                        );
                    }
                }
                None => {
                    self.listener.borrow_mut().on_repo_init_error(
                        &RepoInitError {
                            statement: statement.clone(),
                            reason: "unsupported repoinit statement".to_string(),
                        },
                        &container.id,
                    );
                }
            }
        }
        session.save().map_err(AbortedScanError::new)?;
        self.dispatch(session, &container.id, None, |check, s| {
            check.applied_init_scripts(&container.id, installable, s)
        })
    }

    /// Dispatch one fallible lifecycle event to every check in registration
    /// order. Repository-layer failures abort; other check failures are
    /// reported per category and dispatch continues.
    fn dispatch<F>(
        &mut self,
        session: &MemorySession,
        package_id: &PackageId,
        path: Option<&str>,
        mut event: F,
    ) -> Result<(), AbortedScanError>
    where
        F: FnMut(&mut dyn Check, &dyn Session) -> Result<(), CheckError>,
    {
        for check in &mut self.checks {
            match event(check, session) {
                Ok(()) => {}
                Err(CheckError::Repo(error)) => {
                    return Err(AbortedScanError::new(error));
                }
                Err(error) => {
                    let check_name = check.check_name();
                    let mut listener = self.listener.borrow_mut();
                    match path {
                        Some(path) => {
                            listener.on_listener_path_error(&error, &check_name, package_id, path)
                        }
                        None => listener.on_listener_error(&error, &check_name, package_id),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parse a `create path <abs-path>` repoinit statement.
fn parse_create_path(statement: &str) -> Option<&str> {
    let rest = statement.trim().strip_prefix("create path ")?;
    let path = rest.trim();
    if path.starts_with('/') { Some(path) } else { None }
}
