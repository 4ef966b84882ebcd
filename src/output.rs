//! Terminal output: color policy and package listings
//!
//! Color honours the NO_COLOR standard (https://no-color.org/) and the
//! CLICOLOR conventions:
//! - `NO_COLOR` set: never color
//! - `CLICOLOR_FORCE` non-zero: always color, even when piped
//! - `CLICOLOR=0`: never color
//! - otherwise: color only when stdout is a terminal

use brewsync::orchestrator::{ItemOutcome, Outcome};
use brewsync::{PackageCollection, PackageType};
use colored::{ColoredString, Colorize, control};
use std::io::IsTerminal;

/// Decide on color once, early in `main`
pub fn init_colors() {
    control::set_override(colors_enabled(
        std::env::var("NO_COLOR").ok().as_deref(),
        std::env::var("CLICOLOR_FORCE").ok().as_deref(),
        std::env::var("CLICOLOR").ok().as_deref(),
        std::io::stdout().is_terminal(),
    ));
}

fn colors_enabled(
    no_color: Option<&str>,
    clicolor_force: Option<&str>,
    clicolor: Option<&str>,
    is_tty: bool,
) -> bool {
    if no_color.is_some() {
        return false;
    }
    if clicolor_force.is_some_and(|v| v != "0") {
        return true;
    }
    if clicolor == Some("0") {
        return false;
    }
    is_tty
}

pub fn ok_mark() -> ColoredString {
    "✓".green()
}

pub fn fail_mark() -> ColoredString {
    "✗".red()
}

pub fn skip_mark() -> ColoredString {
    "↷".yellow()
}

/// Print `collection` grouped by type under `==> title`
///
/// `marker` prefixes each line (`+`, `-`, or empty).
pub fn print_grouped(title: &str, collection: &PackageCollection, marker: ColoredString) {
    if collection.is_empty() {
        return;
    }
    println!(
        "{} {}",
        format!("==> {}", title).bold().green(),
        format!("({})", collection.len()).dimmed()
    );
    for (package_type, group) in collection.by_type() {
        println!("  {}", package_type.label().bold());
        for pkg in &group {
            print!("    {} {}", marker, pkg_name(package_type, pkg.display_name()));
            if !pkg.description.is_empty() {
                print!(" {}", format!("- {}", pkg.description).dimmed());
            }
            println!();
        }
    }
    println!();
}

fn pkg_name(package_type: PackageType, name: &str) -> ColoredString {
    if package_type.is_homebrew() {
        name.cyan()
    } else {
        name.normal()
    }
}

/// One-line result for a finished batch item
pub fn outcome_line(item: &ItemOutcome) -> String {
    let counter = format!("[{}/{}]", item.index + 1, item.total).dimmed();
    let name = item.package.to_string().bold();
    match &item.outcome {
        Outcome::Succeeded => format!("{} {} {}", counter, ok_mark(), name),
        Outcome::Skipped(reason) => {
            format!("{} {} {} {}", counter, skip_mark(), name, reason.dimmed())
        }
        Outcome::Failed(err) => format!("{} {} {}: {}", counter, fail_mark(), name, err),
    }
}
