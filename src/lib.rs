//! Library interface for brewsync
//!
//! Keeps package lists (Homebrew taps/formulae/casks, editor extensions, Go
//! tools, App Store apps) in sync across machines through one Brewfile-style
//! manifest per machine.
//!
//! The pieces, leaf first:
//!
//! - [`package`] / [`collection`]: identity (`type:name`) and ordered, deduplicated sets
//! - [`manifest`]: Brewfile parsing and writing
//! - [`diff`]: additions, removals and common packages between two sets
//! - [`ignore`]: ignore layers and machine-specific allowances
//! - [`sync`]: turns a diff into an install/remove plan for one machine
//! - [`installers`] / [`orchestrator`]: per-type handlers and sequential batches

pub mod collection;
pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod ignore;
pub mod installers;
pub mod manifest;
pub mod orchestrator;
pub mod package;
pub mod sync;

// Re-export commonly used types
pub use collection::PackageCollection;
pub use config::Config;
pub use diff::{DiffResult, diff};
pub use error::{Result, SyncError};
pub use ignore::{
    IgnoreConfig, IgnoreLayer, MachineSpecificSet, Resolver, filter_ignored, is_ignored,
    protected_from_removal,
};
pub use installers::{Installer, Registry};
pub use orchestrator::{Batch, BatchReport, ItemOutcome, Operation, Orchestrator, Outcome};
pub use package::{Package, PackageId, PackageType};
pub use sync::{Planner, SyncMode, SyncPlan};
