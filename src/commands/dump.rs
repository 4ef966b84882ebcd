use super::Context;
use crate::output;
use brewsync::{Orchestrator, PackageType, Registry, Result, manifest};
use colored::Colorize;

/// Write this machine's installed packages to its manifest
///
/// Descriptions and App Store titles already present in the old manifest
/// are carried over, since the tools do not report them.
pub fn dump(ctx: &Context, machine: Option<&str>) -> Result<()> {
    let machine = match machine {
        Some(name) => {
            ctx.config.machine(name)?;
            name.to_string()
        }
        None => ctx.config.current_machine()?,
    };
    let path = ctx.config.brewfile_path(&machine)?;

    let orchestrator = Orchestrator::new(Registry::system());
    let mut installed = orchestrator.list_installed(&PackageType::ALL)?;

    if path.exists() {
        let previous = manifest::read(&path)?;
        installed.annotate_from(&previous);
    }

    let header = format!(
        "Brewfile for {}\nGenerated by brewsync on {}",
        machine,
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    manifest::write_with_header(&path, &installed, Some(&header))?;

    println!(
        "{} Wrote {} packages to {}",
        output::ok_mark(),
        installed.len().to_string().bold(),
        path.display().to_string().cyan()
    );
    for (package_type, group) in installed.by_type() {
        println!("  {:<24} {}", package_type.label(), group.len());
    }

    ctx.record(
        &machine,
        "dump",
        &format!("{} packages", installed.len()),
    );
    Ok(())
}
