//! Pre-scan repository seeding.
//!
//! An init stage describes repository state that must exist before any
//! package is processed: namespace mappings, privilege and node-type
//! registrations, and forced roots. Failures are reported per category and
//! never abort the scan.

use crate::core::listener::ErrorListener;
use crate::core::session::{DEFAULT_PRIMARY_TYPE, MemorySession};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JcrNamespace {
    pub prefix: String,
    pub uri: String,
}

/// A path guaranteed to exist before the scan starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedRoot {
    pub path: String,
    #[serde(default)]
    pub primary_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitStage {
    pub namespaces: Vec<JcrNamespace>,
    pub privileges: Vec<String>,
    pub node_types: Vec<String>,
    pub forced_roots: Vec<ForcedRoot>,
}

impl InitStage {
    /// Apply the stage to a fresh session, routing each failure to its
    /// listener category.
    pub fn apply(&self, session: &mut MemorySession, listener: &mut dyn ErrorListener) {
        for ns in &self.namespaces {
            if let Err(error) = session.register_namespace(&ns.prefix, &ns.uri) {
                listener.on_namespace_registration_error(&error, &ns.prefix, &ns.uri);
            }
        }
        for privilege in &self.privileges {
            if let Err(error) = session.register_privilege(privilege) {
                listener.on_privilege_registration_error(&error, privilege);
            }
        }
        for node_type in &self.node_types {
            if let Err(error) = session.register_node_type(node_type) {
                listener.on_node_type_registration_error(&error, node_type);
            }
        }
        for root in &self.forced_roots {
            let primary_type = root.primary_type.as_deref().unwrap_or(DEFAULT_PRIMARY_TYPE);
            if let Err(error) = session.create_path(&root.path, primary_type) {
                listener.on_forced_root_creation_error(&error, root);
            }
        }
    }
}
