//! Declarative scan plans.
//!
//! A plan is a JSON document naming everything a scan needs: run modes, the
//! install-hook policy, an init stage, preinstall package descriptors, and
//! the checks to run with their per-check configuration. Relative package
//! paths resolve against the plan file's directory.

use crate::core::check::Check;
use crate::core::error::PlanError;
use crate::core::hooks::InstallHookPolicy;
use crate::core::init::InitStage;
use crate::core::package::Package;
use crate::core::scanner::{Scanner, ScannerBuilder};
use crate::checks::expect_paths::ExpectPaths;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One check entry in a plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpec {
    /// Implementation name resolved by the locator.
    pub name: String,
    /// Optional display alias for the check's report.
    #[serde(default)]
    pub alias: Option<String>,
    /// Check-specific configuration, passed through verbatim.
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanPlan {
    pub run_modes: BTreeSet<String>,
    pub install_hook_policy: Option<InstallHookPolicy>,
    pub init_stage: InitStage,
    /// Paths to package descriptor files installed silenced before the scan.
    pub preinstall_packages: Vec<PathBuf>,
    pub checks: Vec<CheckSpec>,
    /// Directory that relative preinstall paths resolve against. Set from
    /// the plan file location by [`ScanPlan::from_file`].
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ScanPlan {
    pub fn from_json(json: &str) -> Result<ScanPlan, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<ScanPlan, PlanError> {
        let text = fs::read_to_string(path)?;
        let mut plan = ScanPlan::from_json(&text)?;
        plan.base_dir = path.parent().map(Path::to_path_buf);
        Ok(plan)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Assemble a scanner from this plan.
    pub fn build_scanner(&self) -> Result<Scanner, PlanError> {
        let mut builder = ScannerBuilder::new()
            .with_run_modes(self.run_modes.clone())
            .with_install_hook_policy(self.install_hook_policy.unwrap_or_default())
            .add_init_stage(self.init_stage.clone());
        for path in &self.preinstall_packages {
            let package = Package::from_file(&self.resolve(path))?;
            builder = builder.add_preinstall_package(package);
        }
        for spec in &self.checks {
            let check = locate_check(spec)?;
            builder = match &spec.alias {
                Some(alias) => builder.add_check_as(alias.clone(), check),
                None => builder.add_check(check),
            };
        }
        Ok(builder.build())
    }
}

/// Resolve a check spec to an implementation.
fn locate_check(spec: &CheckSpec) -> Result<Box<dyn Check>, PlanError> {
    match spec.name.as_str() {
        "expect-paths" | "ExpectPaths" => {
            Ok(Box::new(ExpectPaths::from_config(&spec.config)?))
        }
        other => Err(PlanError::UnknownCheck(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_plan() {
        let plan = ScanPlan::from_json("{}").unwrap();
        assert!(plan.run_modes.is_empty());
        assert!(plan.install_hook_policy.is_none());
        assert!(plan.checks.is_empty());
    }

    #[test]
    fn parses_full_plan() {
        let plan = ScanPlan::from_json(
            r#"{
                "runModes": ["publish"],
                "installHookPolicy": "ABORT",
                "initStage": {"forcedRoots": [{"path": "/content"}]},
                "preinstallPackages": ["base.json"],
                "checks": [
                    {"name": "expect-paths", "alias": "paths",
                     "config": {"expectedPaths": ["/content/site"]}}
                ]
            }"#,
        )
        .unwrap();
        assert!(plan.run_modes.contains("publish"));
        assert_eq!(plan.install_hook_policy, Some(InstallHookPolicy::Abort));
        assert_eq!(plan.init_stage.forced_roots.len(), 1);
        assert_eq!(plan.preinstall_packages, vec![PathBuf::from("base.json")]);
        assert_eq!(plan.checks[0].alias.as_deref(), Some("paths"));
    }

    #[test]
    fn unknown_check_is_an_error() {
        let plan = ScanPlan::from_json(r#"{"checks": [{"name": "no-such-check"}]}"#).unwrap();
        let error = plan.build_scanner().unwrap_err();
        assert!(matches!(error, PlanError::UnknownCheck(name) if name == "no-such-check"));
    }
}
