//! Command implementations for the brewsync CLI
//!
//! - **diff**: compare two machines' manifests
//! - **import** / **sync**: bring this machine in line with another
//! - **dump**: write this machine's installed packages to its manifest
//! - **list** / **status** / **history**: read-only views
//! - **ignore**: edit the ignore rules in the config file

pub mod diff;
pub mod dump;
pub mod history;
pub mod ignore;
pub mod import;
pub mod list;
pub mod status;

pub use diff::diff;
pub use dump::dump;
pub use history::history;
pub use ignore::{ignore_add, ignore_list, ignore_remove};
pub use import::{import, sync};
pub use list::list;
pub use status::status;

use crate::progress::BatchProgress;
use brewsync::config::{self, CONFIG_FILE};
use brewsync::history::{self as log, HISTORY_FILE, HistoryEntry};
use brewsync::orchestrator::{BatchReport, Operation};
use brewsync::{Config, Orchestrator, PackageCollection, PackageType, Planner, Result};
use std::path::PathBuf;

/// Loaded configuration plus where it came from
pub struct Context {
    pub config_dir: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.unwrap_or_else(config::config_dir);
        let config = Config::load_from(&config_dir.join(CONFIG_FILE))?;
        tracing::debug!("Using config directory {}", config_dir.display());
        Ok(Self { config_dir, config })
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.config_dir.join(HISTORY_FILE)
    }

    pub fn save(&self) -> Result<()> {
        self.config.save_to(&self.config_path())
    }

    pub fn planner(&self) -> Planner<'_> {
        Planner::new(&self.config.ignore, &self.config.machine_specific)
    }

    /// Append to the history log; a failure here never fails the command
    pub fn record(&self, machine: &str, operation: &str, summary: &str) {
        let entry = HistoryEntry::now(machine, operation, summary);
        if let Err(e) = log::append(&self.history_path(), &entry) {
            tracing::warn!("Failed to write history: {}", e);
        }
    }
}

/// Requested types, or every type when none was given
pub(crate) fn selected_types(types: &[PackageType]) -> Vec<PackageType> {
    if types.is_empty() {
        PackageType::ALL.to_vec()
    } else {
        types.to_vec()
    }
}

/// Run one batch with a progress bar and a closing summary line
pub(crate) fn run_batch(
    orchestrator: &Orchestrator,
    operation: Operation,
    packages: &PackageCollection,
) -> BatchReport {
    let progress = BatchProgress::new(operation, packages.len());
    let report = match operation {
        Operation::Install => orchestrator.install_many_streaming(
            packages,
            |item| progress.item(item),
            |pkg, line| progress.line(pkg, line),
        ),
        Operation::Uninstall => orchestrator.uninstall_many_streaming(
            packages,
            |item| progress.item(item),
            |pkg, line| progress.line(pkg, line),
        ),
    };
    progress.finish(&report);
    report
}

pub(crate) fn summary(report: &BatchReport) -> String {
    format!(
        "{} {}ed, {} skipped, {} failed",
        report.succeeded(),
        report.operation.verb(),
        report.skipped(),
        report.failures().count()
    )
}
