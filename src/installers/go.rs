//! Binaries installed with `go install`
//!
//! Go keeps no install database, so the installed set is recovered by asking
//! `go version -m` which package built each binary in the Go bin directory.

use super::command::{command_available, run};
use super::{Installer, operation_failed};
use crate::collection::PackageCollection;
use crate::error::{Result, SyncError};
use crate::package::{Package, PackageType};
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct GoInstaller {
    program: String,
    bin_dir: Option<PathBuf>,
}

impl GoInstaller {
    pub fn new() -> Self {
        Self {
            program: "go".to_string(),
            bin_dir: None,
        }
    }

    /// Use a fixed bin directory instead of asking `go env`
    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(bin_dir.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// `$GOBIN`, else the first `$GOPATH` entry's `bin`, else `~/go/bin`
    pub fn bin_dir(&self) -> PathBuf {
        if let Some(dir) = &self.bin_dir {
            return dir.clone();
        }

        let go_env = |key: &str| {
            run(Command::new(&self.program).args(["env", key]))
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| std::env::var(key).ok().filter(|v| !v.is_empty()))
        };

        if let Some(gobin) = go_env("GOBIN") {
            return PathBuf::from(gobin);
        }
        if let Some(gopath) = go_env("GOPATH")
            && let Some(first) = std::env::split_paths(&gopath).next()
        {
            return first.join("bin");
        }
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join("go/bin")
    }

    fn module_path(&self, binary: &Path) -> Option<String> {
        match run(Command::new(&self.program).args(["version", "-m"]).arg(binary)) {
            Ok(output) => parse_version_output(&output),
            Err(e) => {
                tracing::debug!("Skipping {}: {:#}", binary.display(), e);
                None
            }
        }
    }
}

impl Default for GoInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl Installer for GoInstaller {
    fn tool(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        command_available(&self.program, "version")
    }

    fn list(&self) -> Result<PackageCollection> {
        let dir = self.bin_dir();
        if !dir.exists() {
            return Ok(PackageCollection::new());
        }

        let mut binaries: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        binaries.sort();

        Ok(binaries
            .iter()
            .filter_map(|bin| self.module_path(bin))
            .filter_map(|path| Package::new(PackageType::Go, path).ok())
            .collect())
    }

    fn install(&self, pkg: &Package) -> Result<()> {
        run(Command::new(&self.program)
            .arg("install")
            .arg(install_target(&pkg.name)))
        .map_err(|e| operation_failed(pkg, e))?;
        Ok(())
    }

    fn uninstall(&self, pkg: &Package) -> Result<()> {
        let name = binary_name(&pkg.name)
            .ok_or_else(|| SyncError::operation(pkg.id(), "cannot derive binary name"))?;
        let path = self.bin_dir().join(name);
        if !path.exists() {
            return Err(operation_failed(
                pkg,
                anyhow!("{} is not installed", path.display()),
            ));
        }
        fs::remove_file(&path).map_err(|e| operation_failed(pkg, e.into()))?;
        tracing::debug!("Removed {}", path.display());
        Ok(())
    }
}

/// `pkg` → `pkg@latest`, keeping an explicit version
pub fn install_target(name: &str) -> String {
    if name.contains('@') {
        name.to_string()
    } else {
        format!("{}@latest", name)
    }
}

/// Binary produced by `go install` for a package path
///
/// The last path element wins, except a major-version suffix (`/v2`) which
/// names the element before it.
pub fn binary_name(name: &str) -> Option<&str> {
    let path = name.split('@').next().unwrap_or(name);
    let mut parts = path.trim_end_matches('/').rsplit('/');
    let last = parts.next().filter(|s| !s.is_empty())?;
    let is_major = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major {
        parts.next().filter(|s| !s.is_empty())
    } else {
        Some(last)
    }
}

/// Extract the `path` line from `go version -m` output
pub fn parse_version_output(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some("path"), Some(path)) => Some(path.to_string()),
            _ => None,
        }
    })
}
