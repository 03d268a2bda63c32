//! Content repository session.
//!
//! The engine treats the repository as a collaborator behind the [`Session`]
//! trait: typed existence and read queries for checks and expectation
//! predicates. [`MemorySession`] is the scan-scoped in-memory store the
//! orchestrator installs packages into; one is created fresh per scan so no
//! state leaks between scans.

use crate::core::error::RepoError;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PRIMARY_TYPE: &str = "nt:folder";

/// Read-only inspection surface handed to checks during dispatch.
pub trait Session {
    /// True when a node exists at the given absolute path.
    fn path_exists(&self, path: &str) -> Result<bool, RepoError>;

    /// Primary node type at `path`, or `None` when the node is absent.
    fn primary_type(&self, path: &str) -> Result<Option<String>, RepoError>;

    /// Value of a string property at `path`, or `None` when absent.
    fn property(&self, path: &str, name: &str) -> Result<Option<String>, RepoError>;

    /// Registered namespace uri for a prefix.
    fn namespace_uri(&self, prefix: &str) -> Result<Option<String>, RepoError>;

    fn has_privilege(&self, privilege: &str) -> Result<bool, RepoError>;

    fn has_node_type(&self, node_type: &str) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeState {
    pub primary_type: String,
    pub properties: FxHashMap<String, String>,
}

impl NodeState {
    fn with_type(primary_type: &str) -> Self {
        NodeState {
            primary_type: primary_type.to_string(),
            properties: FxHashMap::default(),
        }
    }
}

/// In-memory content store keyed by normalized absolute path.
///
/// `BTreeMap` keeps traversal deterministic and makes subtree removal a
/// range-style sweep.
#[derive(Debug, Default)]
pub struct MemorySession {
    nodes: BTreeMap<String, NodeState>,
    namespaces: BTreeMap<String, String>,
    privileges: BTreeSet<String>,
    node_types: BTreeSet<String>,
    save_count: u64,
}

fn normalize_path(path: &str) -> Result<&str, RepoError> {
    if path == "/" {
        return Ok(path);
    }
    if !path.starts_with('/') || path.ends_with('/') || path.contains("//") {
        return Err(RepoError::InvalidPath(path.to_string()));
    }
    Ok(path)
}

impl MemorySession {
    pub fn new() -> Self {
        let mut session = MemorySession::default();
        session
            .nodes
            .insert("/".to_string(), NodeState::with_type("rep:root"));
        session
    }

    /// Create a node at `path`, creating missing ancestors with the default
    /// primary type. Re-creating an existing node only updates its type.
    pub fn create_path(&mut self, path: &str, primary_type: &str) -> Result<(), RepoError> {
        let path = normalize_path(path)?;
        let mut ancestor = String::new();
        for segment in path.split('/').skip(1) {
            if segment.is_empty() {
                return Err(RepoError::InvalidPath(path.to_string()));
            }
            ancestor.push('/');
            ancestor.push_str(segment);
            self.nodes
                .entry(ancestor.clone())
                .or_insert_with(|| NodeState::with_type(DEFAULT_PRIMARY_TYPE));
        }
        if let Some(node) = self.nodes.get_mut(path) {
            node.primary_type = primary_type.to_string();
        }
        Ok(())
    }

    /// Remove the node at `path` and its entire subtree.
    pub fn remove_path(&mut self, path: &str) -> Result<(), RepoError> {
        let path = normalize_path(path)?;
        if path == "/" {
            return Err(RepoError::InvalidPath(path.to_string()));
        }
        if !self.nodes.contains_key(path) {
            return Err(RepoError::PathNotFound(path.to_string()));
        }
        let prefix = format!("{path}/");
        self.nodes
            .retain(|node_path, _| node_path != path && !node_path.starts_with(&prefix));
        Ok(())
    }

    pub fn set_property(&mut self, path: &str, name: &str, value: &str) -> Result<(), RepoError> {
        let path = normalize_path(path)?;
        let node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| RepoError::PathNotFound(path.to_string()))?;
        node.properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), RepoError> {
        if prefix.is_empty() || uri.is_empty() {
            return Err(RepoError::InvalidName(format!("{prefix}={uri}")));
        }
        if let Some(existing) = self.namespaces.get(prefix) {
            if existing != uri {
                return Err(RepoError::NamespaceConflict {
                    prefix: prefix.to_string(),
                    existing: existing.clone(),
                });
            }
            return Ok(());
        }
        self.namespaces.insert(prefix.to_string(), uri.to_string());
        Ok(())
    }

    pub fn register_privilege(&mut self, privilege: &str) -> Result<(), RepoError> {
        if privilege.is_empty() || !privilege.contains(':') {
            return Err(RepoError::InvalidName(privilege.to_string()));
        }
        self.privileges.insert(privilege.to_string());
        Ok(())
    }

    pub fn register_node_type(&mut self, node_type: &str) -> Result<(), RepoError> {
        if node_type.is_empty() || !node_type.contains(':') {
            return Err(RepoError::InvalidName(node_type.to_string()));
        }
        self.node_types.insert(node_type.to_string());
        Ok(())
    }

    /// Commit pending changes. The in-memory store applies writes eagerly, so
    /// this only records that a save point was reached.
    pub fn save(&mut self) -> Result<(), RepoError> {
        self.save_count += 1;
        Ok(())
    }

    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Session for MemorySession {
    fn path_exists(&self, path: &str) -> Result<bool, RepoError> {
        let path = normalize_path(path)?;
        Ok(self.nodes.contains_key(path))
    }

    fn primary_type(&self, path: &str) -> Result<Option<String>, RepoError> {
        let path = normalize_path(path)?;
        Ok(self.nodes.get(path).map(|node| node.primary_type.clone()))
    }

    fn property(&self, path: &str, name: &str) -> Result<Option<String>, RepoError> {
        let path = normalize_path(path)?;
        Ok(self
            .nodes
            .get(path)
            .and_then(|node| node.properties.get(name).cloned()))
    }

    fn namespace_uri(&self, prefix: &str) -> Result<Option<String>, RepoError> {
        Ok(self.namespaces.get(prefix).cloned())
    }

    fn has_privilege(&self, privilege: &str) -> Result<bool, RepoError> {
        Ok(self.privileges.contains(privilege))
    }

    fn has_node_type(&self, node_type: &str) -> Result<bool, RepoError> {
        Ok(self.node_types.contains(node_type))
    }
}
