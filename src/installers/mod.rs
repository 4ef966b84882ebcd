//! Per-type package handlers and the registry that maps types to them
//!
//! Each [`PackageType`] is served by one [`Installer`]. The [`Registry`] is
//! built once (normally with [`Registry::system`]) and handed to the
//! orchestrator, so tests can swap in fake handlers.
//!
//! - **brew**: taps, formulae and casks through the `brew` CLI (streams output)
//! - **editor**: VS Code, Cursor and Antigravity extensions
//! - **go**: binaries installed with `go install`
//! - **mas**: Mac App Store titles (install only)

pub mod brew;
pub mod command;
pub mod editor;
pub mod go;
pub mod mas;

use crate::collection::PackageCollection;
use crate::error::{Result, SyncError};
use crate::package::{Package, PackageType};
use std::collections::BTreeMap;

pub use brew::BrewInstaller;
pub use editor::EditorInstaller;
pub use go::GoInstaller;
pub use mas::MasInstaller;

/// Capability contract every package type handler satisfies
///
/// All calls block until the underlying tool finishes.
pub trait Installer {
    /// Tool name used in messages (`brew`, `code`, `go`, ...)
    fn tool(&self) -> &str;

    /// Whether the tool is present on this machine
    fn is_available(&self) -> bool;

    /// Packages of this type currently installed
    fn list(&self) -> Result<PackageCollection>;

    fn install(&self, pkg: &Package) -> Result<()>;

    /// Install while forwarding each output line; atomic unless overridden
    fn install_streaming(&self, pkg: &Package, _on_line: &mut dyn FnMut(&str)) -> Result<()> {
        self.install(pkg)
    }

    fn uninstall(&self, pkg: &Package) -> Result<()>;

    fn uninstall_streaming(&self, pkg: &Package, _on_line: &mut dyn FnMut(&str)) -> Result<()> {
        self.uninstall(pkg)
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    /// `false` when packages of this type cannot be removed programmatically
    fn supports_uninstall(&self) -> bool {
        true
    }
}

/// Constructed-once mapping from package type to handler
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<PackageType, Box<dyn Installer>>,
}

impl Registry {
    /// A registry with no handlers; every lookup reports unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handlers backed by the real command-line tools
    pub fn system() -> Self {
        let mut registry = Self::empty();
        for package_type in PackageType::ALL {
            registry.register(package_type, system_handler(package_type));
        }
        registry
    }

    /// Builder-style [`Registry::register`]
    pub fn with(mut self, package_type: PackageType, handler: impl Installer + 'static) -> Self {
        self.register(package_type, Box::new(handler));
        self
    }

    pub fn register(&mut self, package_type: PackageType, handler: Box<dyn Installer>) {
        self.handlers.insert(package_type, handler);
    }

    pub fn get(&self, package_type: PackageType) -> Option<&dyn Installer> {
        self.handlers.get(&package_type).map(|h| h.as_ref())
    }

    /// Handler for `package_type`, failing when it is missing or its tool is absent
    pub fn available(&self, package_type: PackageType) -> Result<&dyn Installer> {
        match self.get(package_type) {
            Some(handler) if handler.is_available() => Ok(handler),
            _ => Err(SyncError::HandlerUnavailable(package_type)),
        }
    }

    /// Types whose handler is registered and whose tool is installed
    pub fn available_types(&self) -> Vec<PackageType> {
        self.handlers
            .iter()
            .filter(|(_, handler)| handler.is_available())
            .map(|(t, _)| *t)
            .collect()
    }
}

fn system_handler(package_type: PackageType) -> Box<dyn Installer> {
    match package_type {
        PackageType::Tap | PackageType::Brew | PackageType::Cask => {
            Box::new(BrewInstaller::new(package_type))
        }
        PackageType::Vscode | PackageType::Cursor | PackageType::Antigravity => {
            Box::new(EditorInstaller::new(package_type))
        }
        PackageType::Go => Box::new(GoInstaller::new()),
        PackageType::Mas => Box::new(MasInstaller::new()),
    }
}

/// Wrap a tool failure for `pkg` in [`SyncError::OperationFailed`]
pub(crate) fn operation_failed(pkg: &Package, err: anyhow::Error) -> SyncError {
    SyncError::operation(pkg.id(), format!("{:#}", err))
}

/// Build a collection from tool output names, skipping invalid ones
pub(crate) fn collect_names<'a>(
    package_type: PackageType,
    names: impl IntoIterator<Item = &'a str>,
) -> PackageCollection {
    names
        .into_iter()
        .filter_map(|name| Package::new(package_type, name).ok())
        .collect()
}
