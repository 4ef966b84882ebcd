use super::{Context, selected_types};
use crate::output;
use brewsync::{PackageType, Result, manifest};
use colored::Colorize;
use std::io::IsTerminal;

/// Print a machine's manifest, grouped by type
pub fn list(ctx: &Context, machine: Option<&str>, types: &[PackageType], json: bool) -> Result<()> {
    let machine = match machine {
        Some(name) => name.to_string(),
        None => ctx.config.current_machine()?,
    };
    let path = ctx.config.brewfile_path(&machine)?;
    let report = manifest::read_report(&path)?;
    let packages = report.packages.filter(&selected_types(types));

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    // Piped output: one ID per line
    if !std::io::stdout().is_terminal() {
        for pkg in &packages {
            println!("{}", pkg.id());
        }
        return Ok(());
    }

    output::print_grouped(&machine, &packages, "".normal());
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
    Ok(())
}
