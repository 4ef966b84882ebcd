//! Reconciliation planning between two machines
//!
//! The plan applies the two policies asymmetrically: additions are filtered
//! by the ignore rules (and machine-specific packages owned elsewhere), while
//! removals are filtered by removal protection. Nothing here executes; the
//! caller hands `to_install`/`to_remove` to the orchestrator.

use crate::collection::PackageCollection;
use crate::diff::{DiffResult, diff};
use crate::ignore::{IgnoreConfig, MachineSpecificSet, Resolver};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Install what is missing, never remove
    #[default]
    Additive,
    /// Also remove what the source does not list
    Mirror,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    pub to_install: PackageCollection,
    pub to_remove: PackageCollection,
    /// Additions suppressed by ignore rules on the target
    pub skipped_ignored: PackageCollection,
    /// Additions that belong to another machine only
    pub skipped_machine_specific: PackageCollection,
    /// Removals suppressed because the package is protected on the target
    pub protected: PackageCollection,
    /// Removal candidates left alone because the mode is additive
    pub extra: PackageCollection,
    pub unchanged: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty() && self.to_remove.is_empty()
    }
}

/// Plans reconciliation with a fixed policy
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    ignore: &'a IgnoreConfig,
    machine_specific: &'a MachineSpecificSet,
}

impl<'a> Planner<'a> {
    pub fn new(ignore: &'a IgnoreConfig, machine_specific: &'a MachineSpecificSet) -> Self {
        Self {
            ignore,
            machine_specific,
        }
    }

    /// Plan turning `current` (on `target`) into `source`
    pub fn plan(
        &self,
        target: &str,
        source: &PackageCollection,
        current: &PackageCollection,
        mode: SyncMode,
    ) -> SyncPlan {
        self.plan_from_diff(target, &diff(source, current), mode)
    }

    pub fn plan_from_diff(&self, target: &str, diff: &DiffResult, mode: SyncMode) -> SyncPlan {
        let resolver = Resolver::new(target, self.ignore, self.machine_specific);
        let mut plan = SyncPlan {
            unchanged: diff.common.len(),
            ..SyncPlan::default()
        };

        for pkg in &diff.additions {
            let bucket = if resolver.is_ignored(pkg) {
                &mut plan.skipped_ignored
            } else if self.machine_specific.is_specific_elsewhere(target, pkg) {
                &mut plan.skipped_machine_specific
            } else {
                &mut plan.to_install
            };
            bucket.add_unique([pkg.clone()]);
        }

        for pkg in &diff.removals {
            let bucket = if resolver.protected_from_removal(pkg) {
                &mut plan.protected
            } else if mode == SyncMode::Mirror {
                &mut plan.to_remove
            } else {
                &mut plan.extra
            };
            bucket.add_unique([pkg.clone()]);
        }

        tracing::debug!(
            "Plan for {}: {} to install, {} to remove, {} ignored, {} protected",
            target,
            plan.to_install.len(),
            plan.to_remove.len(),
            plan.skipped_ignored.len(),
            plan.protected.len()
        );
        plan
    }
}
