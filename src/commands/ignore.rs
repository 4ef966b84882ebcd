//! Ignore rule editing
//!
//! Entries are either a package ID (`brew:htop`) or, with `--category`, a
//! package type (`mas`). Without `--machine` the global layer is edited.

use super::Context;
use crate::output;
use brewsync::{IgnoreLayer, PackageId, PackageType, Result};
use colored::Colorize;

enum Entry {
    Category(PackageType),
    Package(String),
}

fn parse_entry(entry: &str, category: bool) -> Result<Entry> {
    if category {
        Ok(Entry::Category(entry.parse()?))
    } else {
        let id: PackageId = entry.parse()?;
        Ok(Entry::Package(id.to_string()))
    }
}

fn check_machine(ctx: &Context, machine: Option<&str>) -> Result<()> {
    if let Some(name) = machine {
        ctx.config.machine(name)?;
    }
    Ok(())
}

fn scope(machine: Option<&str>) -> String {
    machine.map_or_else(|| "global".to_string(), |m| format!("machine {}", m))
}

pub fn ignore_add(
    ctx: &mut Context,
    entry: &str,
    machine: Option<&str>,
    category: bool,
) -> Result<()> {
    check_machine(ctx, machine)?;
    let entry = parse_entry(entry, category)?;
    let layer = ctx.config.ignore.layer_mut(machine);
    let (added, shown) = match &entry {
        Entry::Category(t) => (layer.categories.insert(*t), t.keyword().to_string()),
        Entry::Package(id) => (layer.packages.insert(id.clone()), id.clone()),
    };

    if !added {
        println!("{} {} is already ignored ({})", output::skip_mark(), shown, scope(machine));
        return Ok(());
    }
    ctx.save()?;
    println!("{} Ignoring {} ({})", output::ok_mark(), shown.bold(), scope(machine));
    Ok(())
}

pub fn ignore_remove(
    ctx: &mut Context,
    entry: &str,
    machine: Option<&str>,
    category: bool,
) -> Result<()> {
    check_machine(ctx, machine)?;
    let entry = parse_entry(entry, category)?;
    let layer = ctx.config.ignore.layer_mut(machine);
    let (removed, shown) = match &entry {
        Entry::Category(t) => (layer.categories.remove(t), t.keyword().to_string()),
        Entry::Package(id) => (layer.packages.remove(id), id.clone()),
    };
    ctx.config.ignore.prune();

    if !removed {
        println!("{} {} was not ignored ({})", output::skip_mark(), shown, scope(machine));
        return Ok(());
    }
    ctx.save()?;
    println!("{} No longer ignoring {} ({})", output::ok_mark(), shown.bold(), scope(machine));
    Ok(())
}

pub fn ignore_list(ctx: &Context, machine: Option<&str>) -> Result<()> {
    let ignore = &ctx.config.ignore;
    match machine {
        Some(name) => {
            check_machine(ctx, machine)?;
            print_layer("Global", &ignore.global);
            match ignore.layer(Some(name)) {
                Some(layer) => print_layer(name, layer),
                None => println!("{}", format!("No rules for {}", name).dimmed()),
            }
        }
        None => {
            print_layer("Global", &ignore.global);
            for (name, layer) in &ignore.machines {
                print_layer(name, layer);
            }
        }
    }

    if !ctx.config.machine_specific.machines.is_empty() {
        println!("{}", "==> Machine-specific".bold().green());
        for (name, ids) in &ctx.config.machine_specific.machines {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            println!("  {}: {}", name.bold(), ids.join(", "));
        }
    }
    Ok(())
}

fn print_layer(title: &str, layer: &IgnoreLayer) {
    println!("{}", format!("==> {}", title).bold().green());
    if layer.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for category in &layer.categories {
        println!("  {} {}", "category".dimmed(), category.keyword().cyan());
    }
    for id in &layer.packages {
        println!("  {} {}", "package ".dimmed(), id);
    }
    println!();
}
