//! Mac App Store titles via `mas`
//!
//! `mas` can install by numeric ID but cannot remove apps, so uninstall is
//! reported as unsupported and treated as a no-op.

use super::command::{command_available, output_lines, run};
use super::{Installer, operation_failed};
use crate::collection::PackageCollection;
use crate::error::Result;
use crate::package::{Package, PackageType};
use std::process::Command;

pub struct MasInstaller {
    program: String,
}

impl MasInstaller {
    pub fn new() -> Self {
        Self {
            program: "mas".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for MasInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl Installer for MasInstaller {
    fn tool(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        command_available(&self.program, "version")
    }

    fn list(&self) -> Result<PackageCollection> {
        let output = run(Command::new(&self.program).arg("list"))?;
        Ok(output_lines(&output).filter_map(parse_list_line).collect())
    }

    fn install(&self, pkg: &Package) -> Result<()> {
        let id = pkg.option("id").unwrap_or(&pkg.name);
        run(Command::new(&self.program).arg("install").arg(id))
            .map_err(|e| operation_failed(pkg, e))?;
        Ok(())
    }

    fn uninstall(&self, pkg: &Package) -> Result<()> {
        tracing::warn!(
            "{} cannot be removed by mas; uninstall it from Finder",
            pkg.display_name()
        );
        Ok(())
    }

    fn supports_uninstall(&self) -> bool {
        false
    }
}

/// Parse `497799835  Xcode  (15.4)` into a package
pub fn parse_list_line(line: &str) -> Option<Package> {
    let (id, rest) = line.trim().split_once(char::is_whitespace)?;
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut title = rest.trim();
    if title.ends_with(')')
        && let Some(open) = title.rfind('(')
    {
        title = title[..open].trim_end();
    }

    let pkg = Package::new(PackageType::Mas, id).ok()?.with_option("id", id);
    Some(if title.is_empty() {
        pkg
    } else {
        pkg.with_full_name(title)
    })
}
