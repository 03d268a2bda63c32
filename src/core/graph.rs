//! Package ancestry graph.
//!
//! Tracks identity and parent/child relationships of every package
//! discovered during one scan, for assigning responsibility for repository
//! changes. The structure tolerates re-identification: identifying a package
//! as a root clears its parent edge, and re-parenting a node under one of
//! its own descendants breaks the recorded chain at the point of the cycle.
//! Every traversal carries a visited set, so queries terminate regardless of
//! what sequence of identify events produced the edges.

use crate::core::check::Check;
use crate::core::id::PackageId;
use crate::core::package::EmbeddedPackageInstallable;
use crate::core::report::Violation;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

#[derive(Debug, Default)]
pub struct PackageGraph {
    identified: Vec<PackageId>,
    parent_of: FxHashMap<PackageId, PackageId>,
    children_of: FxHashMap<PackageId, Vec<PackageId>>,
}

impl PackageGraph {
    pub fn new() -> Self {
        PackageGraph::default()
    }

    fn unlink_parent(&mut self, child: &PackageId) {
        if let Some(old_parent) = self.parent_of.remove(child) {
            if let Some(children) = self.children_of.get_mut(&old_parent) {
                children.retain(|c| c != child);
            }
        }
    }

    fn set_parent(&mut self, child: &PackageId, parent: Option<&PackageId>) {
        self.unlink_parent(child);
        let Some(parent) = parent else {
            return;
        };
        self.parent_of.insert(child.clone(), parent.clone());
        self.children_of
            .entry(parent.clone())
            .or_default()
            .push(child.clone());
        // If child was already an ancestor of parent, the new edge closed a
        // cycle; cut the chain just below child so the graph stays a forest.
        let mut visited: FxHashSet<PackageId> = FxHashSet::default();
        let mut current = parent.clone();
        let mut cut_below_child: Option<PackageId> = None;
        while let Some(up) = self.parent_of.get(&current) {
            if up == child {
                cut_below_child = Some(current);
                break;
            }
            if !visited.insert(current.clone()) {
                break;
            }
            current = up.clone();
        }
        if let Some(node) = cut_below_child {
            self.unlink_parent(&node);
        }
    }

    /// Record a package identified as an explicit scan target. Clears any
    /// parent recorded from an earlier nested extraction.
    pub fn record_package(&mut self, package_id: &PackageId) {
        self.identified.push(package_id.clone());
        self.set_parent(package_id, None);
    }

    /// Record a package extracted from inside `parent_id`.
    pub fn record_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        self.identified.push(package_id.clone());
        self.set_parent(package_id, Some(parent_id));
    }

    /// Record a package submitted for deferred install. The installable, when
    /// present, is authoritative for both ids.
    pub fn record_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: Option<&PackageId>,
        installable: Option<&EmbeddedPackageInstallable>,
    ) {
        let own_id = installable.map(|i| &i.embedded_id).unwrap_or(package_id);
        let parent = installable.map(|i| &i.parent_id).or(parent_id);
        if let Some(parent) = parent {
            let own_id = own_id.clone();
            let parent = parent.clone();
            self.identified.push(own_id.clone());
            self.set_parent(&own_id, Some(&parent));
        }
    }

    /// True if the id appeared in any identify event since the last reset.
    /// Queries about unidentified packages are not authoritative.
    pub fn is_identified(&self, package_id: &PackageId) -> bool {
        self.identified.contains(package_id)
    }

    pub fn last_identified(&self) -> Option<&PackageId> {
        self.identified.last()
    }

    /// True if the package has no recorded parent.
    pub fn is_root(&self, package_id: &PackageId) -> bool {
        !self.parent_of.contains_key(package_id)
    }

    /// True if `left` is `right` or is reachable from `right` by recorded
    /// parent edges.
    pub fn is_left_descendant_of_right(&self, left: &PackageId, right: &PackageId) -> bool {
        if left == right {
            return true;
        }
        let mut visited: FxHashSet<&PackageId> = FxHashSet::default();
        let mut current = left;
        while let Some(parent) = self.parent_of.get(current) {
            if parent == right {
                return true;
            }
            if !visited.insert(parent) {
                return false;
            }
            current = parent;
        }
        false
    }

    /// The package itself followed by its recorded ancestors, leaf to root.
    pub fn self_and_ancestors(&self, package_id: &PackageId) -> Vec<PackageId> {
        let mut chain = vec![package_id.clone()];
        let mut visited: FxHashSet<&PackageId> = FxHashSet::default();
        visited.insert(package_id);
        let mut current = package_id;
        while let Some(parent) = self.parent_of.get(current) {
            if !visited.insert(parent) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// The package itself and all recorded descendants, preorder depth-first
    /// in identification order, without duplicates.
    pub fn self_and_descendants(&self, package_id: &PackageId) -> Vec<PackageId> {
        let mut result = Vec::new();
        let mut visited: FxHashSet<PackageId> = FxHashSet::default();
        let mut stack = vec![package_id.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            result.push(current.clone());
            if let Some(children) = self.children_of.get(&current) {
                for child in children.iter().rev() {
                    stack.push(child.clone());
                }
            }
        }
        result
    }

    pub fn reset(&mut self) {
        self.identified.clear();
        self.parent_of.clear();
        self.children_of.clear();
    }
}

/// The graph participates in dispatch like any other listener, so checks can
/// embed one and forward their lifecycle events to it.
impl Check for PackageGraph {
    fn check_name(&self) -> String {
        "PackageGraph".to_string()
    }

    fn reported_violations(&self) -> Vec<Violation> {
        Vec::new()
    }

    fn started_scan(&mut self) {
        self.reset();
    }

    fn identify_package(&mut self, package_id: &PackageId, _file: Option<&Path>) {
        self.record_package(package_id);
    }

    fn identify_subpackage(&mut self, package_id: &PackageId, parent_id: &PackageId) {
        self.record_subpackage(package_id, parent_id);
    }

    fn identify_embedded_package(
        &mut self,
        package_id: &PackageId,
        parent_id: &PackageId,
        installable: &EmbeddedPackageInstallable,
    ) {
        self.record_embedded_package(package_id, Some(parent_id), Some(installable));
    }
}
