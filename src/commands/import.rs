//! Import and sync: reconcile this machine against another machine's manifest

use super::{Context, run_batch, selected_types, summary};
use crate::output;
use brewsync::orchestrator::Operation;
use brewsync::{
    Orchestrator, PackageType, Registry, Result, SyncMode, SyncPlan, manifest,
};
use colored::Colorize;

/// Install what `from` lists and this machine lacks
pub fn import(
    ctx: &Context,
    from: Option<&str>,
    types: &[PackageType],
    dry_run: bool,
) -> Result<()> {
    reconcile(ctx, from, types, SyncMode::Additive, dry_run, "import")
}

/// Like [`import`], also removing what `from` does not list when `mirror` is set
pub fn sync(
    ctx: &Context,
    from: Option<&str>,
    types: &[PackageType],
    mirror: bool,
    dry_run: bool,
) -> Result<()> {
    let mode = if mirror {
        SyncMode::Mirror
    } else {
        SyncMode::Additive
    };
    reconcile(ctx, from, types, mode, dry_run, "sync")
}

fn reconcile(
    ctx: &Context,
    from: Option<&str>,
    types: &[PackageType],
    mode: SyncMode,
    dry_run: bool,
    operation: &str,
) -> Result<()> {
    let target = ctx.config.current_machine()?;
    let source = ctx.config.source_machine(from)?;
    if source == target {
        println!("{} {} is this machine; nothing to do", output::skip_mark(), source);
        return Ok(());
    }
    let types = selected_types(types);

    let orchestrator = Orchestrator::new(Registry::system());
    let wanted = manifest::read(&ctx.config.brewfile_path(&source)?)?.filter(&types);
    let installed = orchestrator.list_installed(&types)?;
    let plan = ctx.planner().plan(&target, &wanted, &installed, mode);

    print_plan(&source, &target, &plan);
    if plan.is_empty() {
        println!("{} Already up to date", output::ok_mark());
        return Ok(());
    }
    if dry_run {
        println!("{}", "Dry run: no changes made".dimmed());
        return Ok(());
    }

    let mut summaries = Vec::new();
    let mut last_error = None;

    if !plan.to_install.is_empty() {
        let report = run_batch(&orchestrator, Operation::Install, &plan.to_install);
        summaries.push(summary(&report));
        last_error = report.into_result().err().or(last_error);
    }
    if !plan.to_remove.is_empty() {
        println!();
        let report = run_batch(&orchestrator, Operation::Uninstall, &plan.to_remove);
        summaries.push(summary(&report));
        last_error = report.into_result().err().or(last_error);
    }

    ctx.record(
        &target,
        operation,
        &format!("from {}: {}", source, summaries.join("; ")),
    );

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn print_plan(source: &str, target: &str, plan: &SyncPlan) {
    println!(
        "{} {} {} {}",
        "Planning".bold(),
        source.cyan(),
        "→".dimmed(),
        target.cyan()
    );
    println!();
    output::print_grouped("To install", &plan.to_install, "+".green());
    output::print_grouped("To remove", &plan.to_remove, "-".red());

    let notes = [
        (plan.skipped_ignored.len(), "ignored"),
        (plan.skipped_machine_specific.len(), "specific to another machine"),
        (plan.protected.len(), "protected from removal"),
        (plan.extra.len(), "not in source (kept)"),
    ];
    for (count, what) in notes {
        if count > 0 {
            println!("  {} {}", count.to_string().bold(), what.dimmed());
        }
    }
    if notes.iter().any(|(count, _)| *count > 0) {
        println!();
    }
}
