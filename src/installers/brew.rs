//! Homebrew taps, formulae and casks via the `brew` CLI

use super::command::{command_available, output_lines, run, run_streaming};
use super::{Installer, collect_names, operation_failed};
use crate::collection::PackageCollection;
use crate::error::Result;
use crate::package::{Package, PackageType};
use std::process::Command;

/// Handler for one of the three Homebrew package types
pub struct BrewInstaller {
    package_type: PackageType,
    program: String,
}

impl BrewInstaller {
    /// Non-Homebrew types fall back to formulae
    pub fn new(package_type: PackageType) -> Self {
        let package_type = if package_type.is_homebrew() {
            package_type
        } else {
            PackageType::Brew
        };
        Self {
            package_type,
            program: "brew".to_string(),
        }
    }

    /// Use a different `brew` executable (e.g. an x86 prefix under Rosetta)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        // No auto-update per command
        cmd.env("HOMEBREW_NO_AUTO_UPDATE", "1");
        cmd
    }

    fn install_command(&self, pkg: &Package) -> Command {
        let mut cmd = self.command();
        match self.package_type {
            PackageType::Tap => {
                cmd.arg("tap").arg(&pkg.name);
                if let Some(url) = pkg.option("url") {
                    cmd.arg(url);
                }
            }
            PackageType::Cask => {
                cmd.args(["install", "--cask"]).arg(&pkg.name);
            }
            _ => {
                cmd.args(["install", "--formula"]).arg(&pkg.name);
            }
        }
        cmd.args(extra_args(pkg));
        cmd
    }

    fn uninstall_command(&self, pkg: &Package) -> Command {
        let mut cmd = self.command();
        match self.package_type {
            PackageType::Tap => cmd.arg("untap"),
            PackageType::Cask => cmd.args(["uninstall", "--cask"]),
            _ => cmd.args(["uninstall", "--formula"]),
        };
        cmd.arg(&pkg.name);
        cmd
    }

    /// Honour `link: false` after a formula install
    fn after_install(&self, pkg: &Package) -> Result<()> {
        if self.package_type == PackageType::Brew && pkg.option("link") == Some("false") {
            run(self.command().args(["unlink"]).arg(&pkg.name))
                .map_err(|e| operation_failed(pkg, e))?;
        }
        Ok(())
    }
}

impl Installer for BrewInstaller {
    fn tool(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        command_available(&self.program, "--version")
    }

    fn list(&self) -> Result<PackageCollection> {
        let mut cmd = self.command();
        match self.package_type {
            PackageType::Tap => cmd.arg("tap"),
            PackageType::Cask => cmd.args(["list", "--cask", "-1"]),
            _ => cmd.args(["leaves", "--installed-on-request"]),
        };
        let output = run(&mut cmd)?;
        Ok(collect_names(self.package_type, output_lines(&output)))
    }

    fn install(&self, pkg: &Package) -> Result<()> {
        run(&mut self.install_command(pkg)).map_err(|e| operation_failed(pkg, e))?;
        self.after_install(pkg)
    }

    fn install_streaming(&self, pkg: &Package, on_line: &mut dyn FnMut(&str)) -> Result<()> {
        run_streaming(self.install_command(pkg), on_line).map_err(|e| operation_failed(pkg, e))?;
        self.after_install(pkg)
    }

    fn uninstall(&self, pkg: &Package) -> Result<()> {
        run(&mut self.uninstall_command(pkg)).map_err(|e| operation_failed(pkg, e))?;
        Ok(())
    }

    fn uninstall_streaming(&self, pkg: &Package, on_line: &mut dyn FnMut(&str)) -> Result<()> {
        run_streaming(self.uninstall_command(pkg), on_line).map_err(|e| operation_failed(pkg, e))
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

/// `args: ["no-quarantine", "HEAD"]` → `--no-quarantine --HEAD`
fn extra_args(pkg: &Package) -> Vec<String> {
    let Some(raw) = pkg.option("args") else {
        return Vec::new();
    };
    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|a| a.trim().trim_matches(|c| c == '"' || c == '\'' || c == ':'))
        .filter(|a| !a.is_empty())
        .map(|a| {
            if a.starts_with('-') {
                a.to_string()
            } else {
                format!("--{}", a)
            }
        })
        .collect()
}
