//! Path presence/absence expectations.
//!
//! Configured with paths that must exist (or must not exist) once scanning
//! settles. Expectations are evaluated after every extraction and after
//! applied init scripts, and judged only when a root package finishes, so a
//! path created by a later sibling package still satisfies the expectation.

use crate::checks::expectations::DeferredExpectations;
use crate::core::check::{Check, ViolationCollector};
use crate::core::error::{CheckError, PlanError};
use crate::core::id::PackageId;
use crate::core::package::{EmbeddedPackageInstallable, Installable};
use crate::core::report::{Severity, Violation};
use crate::core::rules::{Rule, RuleConfig, compile_rules, last_match_includes};
use crate::core::session::Session;
use serde::Deserialize;
use std::path::Path;

pub const CHECK_NAME: &str = "ExpectPaths";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpectPathsConfig {
    /// Paths that must exist by the end of the scan.
    pub expected_paths: Vec<String>,
    /// Paths that must not exist by the end of the scan.
    pub not_expected_paths: Vec<String>,
    /// Rules selecting which packages' checkpoints count, matched against
    /// the package identifier. Empty means all packages.
    pub after_package_id_rules: Vec<RuleConfig>,
    /// Judge expectations only at directly-scanned packages.
    pub ignore_nested_packages: bool,
    pub severity: Option<Severity>,
}

#[derive(Debug, PartialEq)]
struct PathCriteria {
    path: String,
    expect_present: bool,
}

pub struct ExpectPaths {
    collector: ViolationCollector,
    expectations: DeferredExpectations<PathCriteria>,
    after_package_id_rules: Vec<Rule>,
    severity: Severity,
}

impl ExpectPaths {
    pub fn new(config: ExpectPathsConfig) -> Result<Self, PlanError> {
        let mut expectations = DeferredExpectations::new(config.ignore_nested_packages);
        for path in config.expected_paths {
            expectations.expect(PathCriteria {
                path,
                expect_present: true,
            });
        }
        for path in config.not_expected_paths {
            expectations.expect(PathCriteria {
                path,
                expect_present: false,
            });
        }
        Ok(ExpectPaths {
            collector: ViolationCollector::new(),
            expectations,
            after_package_id_rules: compile_rules(&config.after_package_id_rules)?,
            severity: config.severity.unwrap_or(Severity::Major),
        })
    }

    pub fn from_config(value: &serde_json::Value) -> Result<Self, PlanError> {
        let config: ExpectPathsConfig = serde_json::from_value(value.clone())?;
        ExpectPaths::new(config)
    }

    fn in_scope(&self, package_id: &PackageId) -> bool {
        last_match_includes(&self.after_package_id_rules, &package_id.to_string())
    }

    fn checkpoint(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        if !self.in_scope(package_id) {
            return Ok(());
        }
        self.expectations.checkpoint(package_id, |criteria| {
            Ok(session.path_exists(&criteria.path)? == criteria.expect_present)
        })?;
        Ok(())
    }
}

impl Check for ExpectPaths {
    fn check_name(&self) -> String {
        CHECK_NAME.to_string()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        self.collector.reported_violations()
    }

    fn set_message_bundle(&mut self, bundle: &crate::core::check::MessageBundle) {
        self.collector.set_message_bundle(bundle);
    }

    fn started_scan(&mut self) {
        self.collector.reset();
        self.expectations.started_scan();
    }

    fn identify_package(&mut self, package_id: &PackageId, _file: Option<&Path>) {
        self.expectations.graph_mut().record_package(package_id);
    }

    fn identify_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        self.expectations
            .graph_mut()
            .record_subpackage(package_id, parent_id);
    }

    fn identify_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: &PackageId,
        installable: &EmbeddedPackageInstallable,
    ) {
        self.expectations.graph_mut().record_embedded_package(
            package_id,
            Some(parent_id),
            Some(installable),
        );
    }

    fn after_extract(
        &mut self,
        package_id: &PackageId,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.checkpoint(package_id, session)
    }

    fn applied_init_scripts(
        &mut self,
        last_package: &PackageId,
        _installable: &Installable,
        session: &dyn Session,
    ) -> Result<(), CheckError> {
        self.checkpoint(last_package, session)
    }

    fn after_scan_package(
        &mut self,
        package_id: &PackageId,
        _session: &dyn Session,
    ) -> Result<(), CheckError> {
        let missing = self
            .collector
            .message("expected path missing")
            .to_string();
        let unexpected = self
            .collector
            .message("unexpected path present")
            .to_string();
        let severity = self.severity;
        let collector = &mut self.collector;
        self.expectations
            .finalize_if_root(package_id, |criteria, violators| {
                let template = if criteria.expect_present {
                    &missing
                } else {
                    &unexpected
                };
                collector.report(Violation::new(
                    severity,
                    format!("{}: {}", template, criteria.path),
                    violators,
                ));
            });
        Ok(())
    }
}
