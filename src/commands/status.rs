use super::Context;
use crate::output;
use brewsync::config;
use brewsync::{PackageType, Registry, Result, manifest};
use colored::Colorize;

/// Configured machines, their manifests and which tools are present here
pub fn status(ctx: &Context) -> Result<()> {
    println!("{} {}", "Config:".bold(), ctx.config_path().display());
    let host = config::hostname().unwrap_or_else(|| "unknown".to_string());
    match ctx.config.current_machine() {
        Ok(name) => println!("{} {} ({})", "Machine:".bold(), name.cyan(), host),
        Err(_) => println!(
            "{} {} ({})",
            "Machine:".bold(),
            "not configured".yellow(),
            host
        ),
    }
    if let Some(source) = &ctx.config.default_source {
        println!("{} {}", "Default source:".bold(), source);
    }
    println!();

    println!("{}", "==> Machines".bold().green());
    if ctx.config.machines.is_empty() {
        println!("  {}", "(none configured)".dimmed());
    }
    for name in ctx.config.machines.keys() {
        let path = ctx.config.brewfile_path(name)?;
        match manifest::read_report(&path) {
            Ok(report) => println!(
                "  {} {:<12} {} packages {}",
                output::ok_mark(),
                name.bold(),
                report.packages.len(),
                path.display().to_string().dimmed()
            ),
            Err(_) => println!(
                "  {} {:<12} {} {}",
                output::fail_mark(),
                name.bold(),
                "no manifest".yellow(),
                path.display().to_string().dimmed()
            ),
        }
    }
    println!();

    println!("{}", "==> Installers".bold().green());
    let registry = Registry::system();
    for package_type in PackageType::ALL {
        let Some(handler) = registry.get(package_type) else {
            continue;
        };
        let mark = if handler.is_available() {
            output::ok_mark()
        } else {
            output::fail_mark()
        };
        println!("  {} {:<24} {}", mark, package_type.label(), handler.tool().dimmed());
    }
    Ok(())
}
