// Test helpers: scripted installers that record every call
// Nothing here touches real package managers

#![allow(dead_code)]

use brewsync::{Installer, Package, PackageCollection, Result, SyncError};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Shared log of `"<op> <id>"` entries, in call order
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Installer whose behaviour is fixed up front
///
/// # Example
/// ```
/// let log = call_log();
/// let fake = FakeInstaller::new(&log).failing("broken");
/// ```
pub struct FakeInstaller {
    log: CallLog,
    available: bool,
    streaming: bool,
    uninstall: bool,
    failing: HashSet<String>,
    installed: PackageCollection,
}

impl FakeInstaller {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            available: true,
            streaming: false,
            uninstall: true,
            failing: HashSet::new(),
            installed: PackageCollection::new(),
        }
    }

    /// Fail install/uninstall for the package named `name`
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Emit two output lines per operation
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn without_uninstall(mut self) -> Self {
        self.uninstall = false;
        self
    }

    pub fn with_installed(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        self.installed.add_unique(packages);
        self
    }

    fn record(&self, op: &str, pkg: &Package) -> Result<()> {
        self.log.borrow_mut().push(format!("{} {}", op, pkg.id()));
        if self.failing.contains(&pkg.name) {
            return Err(SyncError::operation(pkg.id(), format!("{} exploded", pkg.name)));
        }
        Ok(())
    }
}

impl Installer for FakeInstaller {
    fn tool(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn list(&self) -> Result<PackageCollection> {
        self.log.borrow_mut().push("list".to_string());
        Ok(self.installed.clone())
    }

    fn install(&self, pkg: &Package) -> Result<()> {
        self.record("install", pkg)
    }

    fn install_streaming(&self, pkg: &Package, on_line: &mut dyn FnMut(&str)) -> Result<()> {
        on_line(&format!("==> Fetching {}", pkg.name));
        on_line(&format!("==> Pouring {}", pkg.name));
        self.install(pkg)
    }

    fn uninstall(&self, pkg: &Package) -> Result<()> {
        self.record("uninstall", pkg)
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    fn supports_uninstall(&self) -> bool {
        self.uninstall
    }
}

pub fn pkg(package_type: brewsync::PackageType, name: &str) -> Package {
    Package::new(package_type, name).unwrap()
}

pub fn collection(packages: impl IntoIterator<Item = Package>) -> PackageCollection {
    packages.into_iter().collect()
}

pub fn ids(collection: &PackageCollection) -> Vec<String> {
    collection.iter().map(|p| p.id()).collect()
}
