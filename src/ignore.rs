//! Ignore rules and machine-specific allowances
//!
//! Two independent policies decide what the sync flow may touch:
//!
//! - **Ignore** (global or per machine, by category or by package ID): an
//!   ignored package is never installed and never removed.
//! - **Machine-specific**: a package that intentionally lives on one machine
//!   only. It is not suggested for import elsewhere and is protected from
//!   removal on its owning machine.
//!
//! Category suppression is absolute: no per-package entry can re-include a
//! package whose type is ignored.

use crate::collection::PackageCollection;
use crate::package::{Package, PackageType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One scope of ignore rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreLayer {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<PackageType>,
    /// Package IDs (`type:name`)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub packages: BTreeSet<String>,
}

impl IgnoreLayer {
    pub fn matches(&self, pkg: &Package) -> bool {
        self.categories.contains(&pkg.package_type) || self.packages.contains(&pkg.id())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.packages.is_empty()
    }
}

/// Global plus per-machine ignore layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub global: IgnoreLayer,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub machines: BTreeMap<String, IgnoreLayer>,
}

impl IgnoreConfig {
    /// The layer for `machine`, or the global layer for `None`
    pub fn layer(&self, machine: Option<&str>) -> Option<&IgnoreLayer> {
        match machine {
            Some(name) => self.machines.get(name),
            None => Some(&self.global),
        }
    }

    /// Mutable layer for `machine`, created on demand
    pub fn layer_mut(&mut self, machine: Option<&str>) -> &mut IgnoreLayer {
        match machine {
            Some(name) => self.machines.entry(name.to_string()).or_default(),
            None => &mut self.global,
        }
    }

    /// Drop per-machine layers that no longer hold any rule
    pub fn prune(&mut self) {
        self.machines.retain(|_, layer| !layer.is_empty());
    }
}

/// Packages that intentionally exist on a single machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineSpecificSet {
    pub machines: BTreeMap<String, BTreeSet<String>>,
}

impl MachineSpecificSet {
    pub fn is_specific_to(&self, machine: &str, pkg: &Package) -> bool {
        self.machines
            .get(machine)
            .is_some_and(|ids| ids.contains(&pkg.id()))
    }

    /// Whether some machine other than `machine` owns `pkg`
    pub fn is_specific_elsewhere(&self, machine: &str, pkg: &Package) -> bool {
        let id = pkg.id();
        self.machines
            .iter()
            .any(|(owner, ids)| owner != machine && ids.contains(&id))
    }

    /// Machines that claim `pkg`
    pub fn owners(&self, pkg: &Package) -> Vec<&str> {
        let id = pkg.id();
        self.machines
            .iter()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(owner, _)| owner.as_str())
            .collect()
    }

    pub fn insert(&mut self, machine: &str, id: impl Into<String>) -> bool {
        self.machines
            .entry(machine.to_string())
            .or_default()
            .insert(id.into())
    }

    pub fn remove(&mut self, machine: &str, id: &str) -> bool {
        let Some(ids) = self.machines.get_mut(machine) else {
            return false;
        };
        let removed = ids.remove(id);
        if ids.is_empty() {
            self.machines.remove(machine);
        }
        removed
    }
}

/// Whether `pkg` is ignored on `machine`
pub fn is_ignored(machine: &str, pkg: &Package, config: &IgnoreConfig) -> bool {
    config.global.matches(pkg)
        || config
            .machines
            .get(machine)
            .is_some_and(|layer| layer.matches(pkg))
}

/// Copy of `collection` without the packages ignored on `machine`
pub fn filter_ignored(
    machine: &str,
    collection: &PackageCollection,
    config: &IgnoreConfig,
) -> PackageCollection {
    collection
        .iter()
        .filter(|pkg| !is_ignored(machine, pkg, config))
        .cloned()
        .collect()
}

/// Whether reconciliation on `machine` must leave `pkg` installed
pub fn protected_from_removal(
    machine: &str,
    pkg: &Package,
    config: &IgnoreConfig,
    machine_specific: &MachineSpecificSet,
) -> bool {
    is_ignored(machine, pkg, config) || machine_specific.is_specific_to(machine, pkg)
}

/// Both policies bound to one machine
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub machine: &'a str,
    pub ignore: &'a IgnoreConfig,
    pub machine_specific: &'a MachineSpecificSet,
}

impl<'a> Resolver<'a> {
    pub fn new(
        machine: &'a str,
        ignore: &'a IgnoreConfig,
        machine_specific: &'a MachineSpecificSet,
    ) -> Self {
        Self {
            machine,
            ignore,
            machine_specific,
        }
    }

    pub fn is_ignored(&self, pkg: &Package) -> bool {
        is_ignored(self.machine, pkg, self.ignore)
    }

    pub fn filter_ignored(&self, collection: &PackageCollection) -> PackageCollection {
        filter_ignored(self.machine, collection, self.ignore)
    }

    pub fn protected_from_removal(&self, pkg: &Package) -> bool {
        protected_from_removal(self.machine, pkg, self.ignore, self.machine_specific)
    }
}
