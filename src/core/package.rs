//! Package descriptors.
//!
//! The archive format itself is a collaborator concern; the engine consumes
//! a parsed, JSON-loadable description of what installing an archive would
//! do to the content store: ordered path imports and deletions, nested
//! subpackages, declared install hooks, and embedded installables deferred
//! until after extraction.

use crate::core::error::PlanError;
use crate::core::id::{PackageId, PackageRef};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// What the importer did at a reported path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathAction {
    Added,
    Modified,
    Replaced,
    Deleted,
    Noop,
}

/// One content entry applied during extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathImport {
    pub path: String,
    #[serde(default = "PathImport::default_action")]
    pub action: PathAction,
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl PathImport {
    fn default_action() -> PathAction {
        PathAction::Added
    }
}

/// A package-declared install hook. A broken hook simulates a hook that
/// fails to register (the class-loading failure case in a live installer).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallHook {
    pub name: String,
    #[serde(default)]
    pub broken: bool,
}

/// Record describing an embedded package submitted for deferred install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPackageInstallable {
    pub parent_id: PackageId,
    pub node_path: String,
    pub embedded_id: PackageId,
}

/// A resource installed after its container finishes extracting.
#[derive(Debug, Clone)]
pub enum Installable {
    Package(EmbeddedPackageInstallable),
    InitScripts {
        parent_id: PackageId,
        node_path: String,
        statements: Vec<String>,
    },
}

impl Installable {
    pub fn node_path(&self) -> &str {
        match self {
            Installable::Package(installable) => &installable.node_path,
            Installable::InitScripts { node_path, .. } => node_path,
        }
    }
}

/// Deferred-install payload as declared by a package descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbeddedPayload {
    /// A whole package, extracted recursively once installed.
    Package(Package),
    /// Repository-init statements of the form `create path <abs-path>`.
    InitScripts(Vec<String>),
}

/// An embedded installable plus its run-mode scope. An empty scope means
/// "always install"; otherwise the install is skipped entirely unless at
/// least one scoped run mode is active.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedDescriptor {
    pub node_path: String,
    #[serde(default)]
    pub run_modes: BTreeSet<String>,
    pub payload: EmbeddedPayload,
}

/// Parsed description of one content package archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    #[serde(default = "Package::default_valid")]
    pub valid: bool,
    #[serde(default)]
    pub manifest: BTreeMap<String, String>,
    #[serde(default)]
    pub imports: Vec<PathImport>,
    #[serde(default)]
    pub deletes: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<InstallHook>,
    #[serde(default)]
    pub subpackages: Vec<Package>,
    #[serde(default)]
    pub embedded: Vec<EmbeddedDescriptor>,
    /// Where this descriptor came from; set by the loader, not the wire form.
    #[serde(skip)]
    pub reference: Option<PackageRef>,
}

impl Package {
    fn default_valid() -> bool {
        true
    }

    pub fn new(id: impl Into<PackageId>) -> Self {
        Package {
            id: id.into(),
            valid: true,
            manifest: BTreeMap::new(),
            imports: Vec::new(),
            deletes: Vec::new(),
            hooks: Vec::new(),
            subpackages: Vec::new(),
            embedded: Vec::new(),
            reference: None,
        }
    }

    /// Load a descriptor from a JSON file, recording the file reference for
    /// abort reporting.
    pub fn from_file(path: &Path) -> Result<Package, PlanError> {
        let text = fs::read_to_string(path)?;
        let mut package: Package = serde_json::from_str(&text)?;
        package.reference = Some(PackageRef::File(path.to_path_buf()));
        Ok(package)
    }

    pub fn subpackage_ids(&self) -> Vec<PackageId> {
        self.subpackages.iter().map(|sub| sub.id.clone()).collect()
    }
}
