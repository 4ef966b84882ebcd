//! Sequential install/uninstall batches with per-item progress
//!
//! A batch visits every package in order and never stops early: a failure on
//! one item is recorded and the next item runs. Each item produces exactly one
//! [`ItemOutcome`], delivered to the progress callback as soon as it is known
//! and collected into the returned [`BatchReport`].
//!
//! ```no_run
//! use brewsync::{Orchestrator, Registry, manifest};
//!
//! let packages = manifest::parse("brew \"ripgrep\"\ncask \"wezterm\"\n");
//! let orchestrator = Orchestrator::new(Registry::system());
//!
//! let report = orchestrator.install_many(&packages, |item| {
//!     println!("[{}/{}] {}", item.index + 1, item.total, item.package);
//! });
//! println!("{} failed", report.failures().count());
//! ```
//!
//! Everything runs on the calling thread. Callers that need a responsive UI
//! must run the batch elsewhere themselves; there is no cancellation.

use crate::collection::PackageCollection;
use crate::error::{Result, SyncError};
use crate::installers::{Installer, Registry};
use crate::package::{Package, PackageType};
use std::fmt;

/// What a batch does to each package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
}

impl Operation {
    pub fn verb(self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Result of one item
#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    /// Nothing to do, not an error (e.g. uninstall unsupported for the type)
    Skipped(String),
    Failed(SyncError),
}

#[derive(Debug)]
pub struct ItemOutcome {
    pub package: Package,
    /// 0-based position in the batch
    pub index: usize,
    pub total: usize,
    pub outcome: Outcome,
}

impl ItemOutcome {
    pub fn error(&self) -> Option<&SyncError> {
        match &self.outcome {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

/// Every outcome of a finished batch, in batch order
#[derive(Debug)]
pub struct BatchReport {
    pub operation: Operation,
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Succeeded))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Skipped(_)))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The last failure observed, if any
    pub fn last_error(&self) -> Option<&SyncError> {
        self.outcomes.iter().rev().find_map(|o| o.error())
    }

    /// Collapse to the last failure, discarding the rest
    pub fn into_result(self) -> Result<()> {
        match self
            .outcomes
            .into_iter()
            .rev()
            .find_map(|o| match o.outcome {
                Outcome::Failed(err) => Some(err),
                _ => None,
            }) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Lazily executing batch: each `next()` runs one package
pub struct Batch<'a> {
    registry: &'a Registry,
    operation: Operation,
    packages: &'a [Package],
    position: usize,
}

impl<'a> Batch<'a> {
    /// Run the next package, forwarding subprocess output for streaming handlers
    pub fn next_with_output(
        &mut self,
        on_line: &mut dyn FnMut(&Package, &str),
    ) -> Option<ItemOutcome> {
        let pkg = self.packages.get(self.position)?;
        let index = self.position;
        self.position += 1;

        tracing::debug!(
            "{} {} ({}/{})",
            self.operation,
            pkg.id(),
            index + 1,
            self.packages.len()
        );
        let outcome = self.execute(pkg, on_line);
        if let Outcome::Failed(err) = &outcome {
            tracing::warn!("Failed to {} {}: {}", self.operation, pkg.id(), err);
        }

        Some(ItemOutcome {
            package: pkg.clone(),
            index,
            total: self.packages.len(),
            outcome,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    fn execute(&self, pkg: &Package, on_line: &mut dyn FnMut(&Package, &str)) -> Outcome {
        let Some(handler) = self.registry.get(pkg.package_type) else {
            return Outcome::Failed(SyncError::HandlerUnavailable(pkg.package_type));
        };

        if self.operation == Operation::Uninstall && !handler.supports_uninstall() {
            return Outcome::Skipped(format!(
                "{} packages cannot be removed by {}",
                pkg.package_type,
                handler.tool()
            ));
        }

        if !handler.is_available() {
            return Outcome::Failed(SyncError::HandlerUnavailable(pkg.package_type));
        }

        match run_one(handler, self.operation, pkg, on_line) {
            Ok(()) => Outcome::Succeeded,
            Err(err) => Outcome::Failed(err),
        }
    }
}

fn run_one(
    handler: &dyn Installer,
    operation: Operation,
    pkg: &Package,
    on_line: &mut dyn FnMut(&Package, &str),
) -> Result<()> {
    if !handler.supports_streaming() {
        return match operation {
            Operation::Install => handler.install(pkg),
            Operation::Uninstall => handler.uninstall(pkg),
        };
    }

    let mut forward = |line: &str| on_line(pkg, line);
    match operation {
        Operation::Install => handler.install_streaming(pkg, &mut forward),
        Operation::Uninstall => handler.uninstall_streaming(pkg, &mut forward),
    }
}

impl Iterator for Batch<'_> {
    type Item = ItemOutcome;

    fn next(&mut self) -> Option<ItemOutcome> {
        self.next_with_output(&mut |_, _| {})
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.packages.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batch<'_> {}

/// Runs batches against an injected handler registry
pub struct Orchestrator {
    registry: Registry,
}

impl Orchestrator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A lazy batch over `packages`
    pub fn batch<'a>(&'a self, operation: Operation, packages: &'a PackageCollection) -> Batch<'a> {
        Batch {
            registry: &self.registry,
            operation,
            packages: packages.as_slice(),
            position: 0,
        }
    }

    pub fn install_many<P>(&self, packages: &PackageCollection, on_progress: P) -> BatchReport
    where
        P: FnMut(&ItemOutcome),
    {
        self.run(Operation::Install, packages, on_progress, |_, _| {})
    }

    /// [`Orchestrator::install_many`], also forwarding output lines of streaming handlers
    pub fn install_many_streaming<P, L>(
        &self,
        packages: &PackageCollection,
        on_progress: P,
        on_line: L,
    ) -> BatchReport
    where
        P: FnMut(&ItemOutcome),
        L: FnMut(&Package, &str),
    {
        self.run(Operation::Install, packages, on_progress, on_line)
    }

    pub fn uninstall_many<P>(&self, packages: &PackageCollection, on_progress: P) -> BatchReport
    where
        P: FnMut(&ItemOutcome),
    {
        self.run(Operation::Uninstall, packages, on_progress, |_, _| {})
    }

    pub fn uninstall_many_streaming<P, L>(
        &self,
        packages: &PackageCollection,
        on_progress: P,
        on_line: L,
    ) -> BatchReport
    where
        P: FnMut(&ItemOutcome),
        L: FnMut(&Package, &str),
    {
        self.run(Operation::Uninstall, packages, on_progress, on_line)
    }

    fn run<P, L>(
        &self,
        operation: Operation,
        packages: &PackageCollection,
        mut on_progress: P,
        mut on_line: L,
    ) -> BatchReport
    where
        P: FnMut(&ItemOutcome),
        L: FnMut(&Package, &str),
    {
        let mut batch = self.batch(operation, packages);
        let mut outcomes = Vec::with_capacity(packages.len());

        while let Some(item) = batch.next_with_output(&mut on_line) {
            on_progress(&item);
            outcomes.push(item);
        }

        let report = BatchReport {
            operation,
            outcomes,
        };
        tracing::info!(
            "{} batch finished: {} succeeded, {} skipped, {} failed",
            operation,
            report.succeeded(),
            report.skipped(),
            report.failures().count()
        );
        report
    }

    /// Installed packages of `types`, from every handler whose tool is present
    ///
    /// Unavailable handlers are skipped with a warning; a failing `list` is
    /// an error.
    pub fn list_installed(&self, types: &[PackageType]) -> Result<PackageCollection> {
        let mut installed = PackageCollection::new();
        for package_type in PackageType::ALL {
            if !types.contains(&package_type) {
                continue;
            }
            match self.registry.available(package_type) {
                Ok(handler) => {
                    let listed = handler.list()?;
                    tracing::debug!("{} {} packages installed", listed.len(), package_type);
                    installed.merge_unique(&listed);
                }
                Err(_) => {
                    tracing::warn!("Skipping {} packages: installer unavailable", package_type);
                }
            }
        }
        Ok(installed)
    }
}
