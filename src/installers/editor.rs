//! Editor extensions for VS Code and its forks

use super::command::{command_available, output_lines, run};
use super::{Installer, collect_names, operation_failed};
use crate::collection::PackageCollection;
use crate::error::Result;
use crate::package::{Package, PackageType};
use std::process::Command;

/// Extension handler driving an editor's CLI (`code`, `cursor`, `antigravity`)
pub struct EditorInstaller {
    package_type: PackageType,
    program: String,
}

impl EditorInstaller {
    pub fn new(package_type: PackageType) -> Self {
        Self {
            package_type,
            program: default_program(package_type).to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn extension_command(&self, flag: &str, pkg: &Package) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(flag).arg(&pkg.name);
        cmd
    }
}

fn default_program(package_type: PackageType) -> &'static str {
    match package_type {
        PackageType::Cursor => "cursor",
        PackageType::Antigravity => "antigravity",
        _ => "code",
    }
}

impl Installer for EditorInstaller {
    fn tool(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        command_available(&self.program, "--version")
    }

    fn list(&self) -> Result<PackageCollection> {
        let output = run(Command::new(&self.program).arg("--list-extensions"))?;
        Ok(collect_names(self.package_type, output_lines(&output)))
    }

    fn install(&self, pkg: &Package) -> Result<()> {
        run(&mut self.extension_command("--install-extension", pkg))
            .map_err(|e| operation_failed(pkg, e))?;
        Ok(())
    }

    fn uninstall(&self, pkg: &Package) -> Result<()> {
        run(&mut self.extension_command("--uninstall-extension", pkg))
            .map_err(|e| operation_failed(pkg, e))?;
        Ok(())
    }
}
