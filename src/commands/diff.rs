//! Compare two machines

use super::{Context, selected_types};
use crate::output;
use brewsync::{DiffResult, Orchestrator, PackageType, Registry, Result, Resolver, manifest};
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct DiffJson<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(flatten)]
    diff: &'a DiffResult,
    ignored: usize,
}

/// Show what `from` has that this machine lacks, and the reverse
///
/// With `installed`, the live package set is compared instead of this
/// machine's manifest.
pub fn diff(
    ctx: &Context,
    from: Option<&str>,
    types: &[PackageType],
    installed: bool,
    json: bool,
) -> Result<()> {
    let target = ctx.config.current_machine()?;
    let source = ctx.config.source_machine(from)?;
    let types = selected_types(types);

    let source_pkgs = manifest::read(&ctx.config.brewfile_path(&source)?)?.filter(&types);
    let current = if installed {
        Orchestrator::new(Registry::system()).list_installed(&types)?
    } else {
        manifest::read(&ctx.config.brewfile_path(&target)?)?.filter(&types)
    };

    let mut result = brewsync::diff(&source_pkgs, &current);
    let resolver = Resolver::new(
        &target,
        &ctx.config.ignore,
        &ctx.config.machine_specific,
    );
    let before = result.additions.len() + result.removals.len();
    result.additions = resolver.filter_ignored(&result.additions);
    result.removals = resolver.filter_ignored(&result.removals);
    let ignored = before - result.additions.len() - result.removals.len();

    if json {
        let out = DiffJson {
            source: &source,
            target: &target,
            diff: &result,
            ignored,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} {} {}",
        "Comparing".bold(),
        source.cyan(),
        "→".dimmed(),
        target.cyan()
    );
    println!();

    if result.is_empty() {
        println!("{} Machines are in sync", output::ok_mark());
    } else {
        output::print_grouped(
            &format!("Only on {}", source),
            &result.additions,
            "+".green(),
        );
        output::print_grouped(
            &format!("Only on {}", target),
            &result.removals,
            "-".red(),
        );
    }

    println!(
        "{} in common{}",
        result.common.len().to_string().bold(),
        if ignored > 0 {
            format!(", {} ignored", ignored).dimmed().to_string()
        } else {
            String::new()
        }
    );
    Ok(())
}
