//! Deferred-expectation evaluation.
//!
//! Generic machinery for checks that assert on repository state which may
//! only become true late in a scan: expectations are evaluated at
//! checkpoints, blame is accumulated for every package whose extraction left
//! an expectation unsatisfied, and violations are emitted only when a root
//! package finishes, so a later sibling or ancestor still has the chance to
//! satisfy the expectation first.

use crate::core::error::RepoError;
use crate::core::graph::PackageGraph;
use crate::core::id::PackageId;

#[derive(Debug)]
struct Expectation<C> {
    criteria: C,
    violators: Vec<PackageId>,
    satisfied: bool,
}

/// Tracks a set of expectation criteria across checkpoints.
///
/// Once satisfied, an expectation stays satisfied for the remainder of the
/// scan and sheds any blame it accumulated.
#[derive(Debug)]
pub struct DeferredExpectations<C> {
    graph: PackageGraph,
    entries: Vec<Expectation<C>>,
    ignore_nested: bool,
}

impl<C> DeferredExpectations<C> {
    /// With `ignore_nested` set, checkpoints for packages that have a
    /// recorded parent are skipped, so only directly-scanned packages are
    /// judged.
    pub fn new(ignore_nested: bool) -> Self {
        DeferredExpectations {
            graph: PackageGraph::new(),
            entries: Vec::new(),
            ignore_nested,
        }
    }

    pub fn expect(&mut self, criteria: C) {
        self.entries.push(Expectation {
            criteria,
            violators: Vec::new(),
            satisfied: false,
        });
    }

    /// Reset for a new scan. Registered criteria survive; accumulated state
    /// does not.
    pub fn started_scan(&mut self) {
        self.graph.reset();
        for entry in &mut self.entries {
            entry.violators.clear();
            entry.satisfied = false;
        }
    }

    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PackageGraph {
        &mut self.graph
    }

    /// Evaluate every unsatisfied expectation. A satisfied result is sticky
    /// and clears blame; an unsatisfied one blames the checkpoint package and
    /// its recorded ancestors.
    pub fn checkpoint<E>(&mut self, package_id: &PackageId, mut eval: E) -> Result<(), RepoError>
    where
        E: FnMut(&C) -> Result<bool, RepoError>,
    {
        if self.ignore_nested && !self.graph.is_root(package_id) {
            return Ok(());
        }
        let chain = self.graph.self_and_ancestors(package_id);
        for entry in &mut self.entries {
            if entry.satisfied {
                continue;
            }
            if eval(&entry.criteria)? {
                entry.satisfied = true;
                entry.violators.clear();
            } else {
                for id in &chain {
                    if !entry.violators.contains(id) {
                        entry.violators.push(id.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Emit one finding per still-unsatisfied expectation with blame, then
    /// clear that blame. Does nothing unless `package_id` is a recorded root,
    /// so nested packages never trigger premature findings.
    pub fn finalize_if_root<F>(&mut self, package_id: &PackageId, mut emit: F)
    where
        F: FnMut(&C, Vec<PackageId>),
    {
        if !self.graph.is_root(package_id) {
            return;
        }
        for entry in &mut self.entries {
            if entry.satisfied || entry.violators.is_empty() {
                continue;
            }
            emit(&entry.criteria, std::mem::take(&mut entry.violators));
        }
    }
}
