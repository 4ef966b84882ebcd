//! Diff computation between two package collections
//!
//! `source` is what a manifest says should exist, `current` is what exists
//! now (another manifest, or the live installed set). Identity is the
//! package ID only, so description or option changes never show up here.

use crate::collection::PackageCollection;
use crate::package::PackageType;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Result of comparing `source` against `current`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffResult {
    /// In source but not in current, in source order
    pub additions: PackageCollection,
    /// In current but not in source, in current order
    pub removals: PackageCollection,
    /// In both; values are taken from current
    pub common: PackageCollection,
}

impl DiffResult {
    /// True when nothing needs to be installed or removed
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// `(additions, removals)` per type, for summaries
    pub fn counts_by_type(&self) -> BTreeMap<PackageType, (usize, usize)> {
        let mut counts: BTreeMap<PackageType, (usize, usize)> = BTreeMap::new();
        for pkg in &self.additions {
            counts.entry(pkg.package_type).or_default().0 += 1;
        }
        for pkg in &self.removals {
            counts.entry(pkg.package_type).or_default().1 += 1;
        }
        counts
    }
}

/// Compute additions, removals and common packages in linear time
pub fn diff(source: &PackageCollection, current: &PackageCollection) -> DiffResult {
    let current_by_id: HashMap<String, usize> = current
        .iter()
        .enumerate()
        .map(|(idx, pkg)| (pkg.id(), idx))
        .collect();

    let mut result = DiffResult::default();
    let current_items = current.as_slice();

    for pkg in source {
        match current_by_id.get(&pkg.id()) {
            Some(&idx) => {
                result.common.add_unique([current_items[idx].clone()]);
            }
            None => {
                result.additions.add_unique([pkg.clone()]);
            }
        }
    }

    for pkg in current {
        if !source.contains(pkg) {
            result.removals.add_unique([pkg.clone()]);
        }
    }

    result
}
