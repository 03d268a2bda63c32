//! Package identity types.
//!
//! A `PackageId` is opaque to the engine: only equality, ordering, and the
//! string form matter. Group/name/version structure, if any, belongs to the
//! archive layer that produced the identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identity of a package within a scan. Used as the graph key and as the
/// subject of violations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        PackageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PackageId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PackageId(s.to_string()))
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        PackageId(s.to_string())
    }
}

/// Locator for the package that was active when a scan aborted. At most one
/// of these is attached to an aborted scan, depending on how the package was
/// discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    /// An archive file on disk.
    File(PathBuf),
    /// A remote archive location.
    Url(String),
    /// The content node an embedded package was installed from.
    Node(String),
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageRef::File(path) => write!(f, "{}", path.display()),
            PackageRef::Url(url) => f.write_str(url),
            PackageRef::Node(path) => f.write_str(path),
        }
    }
}
