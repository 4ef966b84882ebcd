mod commands;
mod output;
mod progress;

use brewsync::PackageType;
use clap::{Parser, Subcommand};
use commands::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brewsync")]
#[command(author, version, about = "Keep Homebrew and friends in sync across machines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration directory (default: ~/.config/brewsync)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare another machine's manifest with this machine
    Diff {
        /// Source machine (default: default_source)
        #[arg(long)]
        from: Option<String>,

        /// Only these package types
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<PackageType>,

        /// Compare against installed packages instead of this machine's manifest
        #[arg(long)]
        installed: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install packages another machine has and this one lacks
    Import {
        /// Source machine (default: default_source)
        #[arg(long)]
        from: Option<String>,

        /// Only these package types
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<PackageType>,

        /// Show the plan without installing
        #[arg(long)]
        dry_run: bool,
    },

    /// Reconcile with another machine, optionally removing extras
    Sync {
        /// Source machine (default: default_source)
        #[arg(long)]
        from: Option<String>,

        /// Only these package types
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<PackageType>,

        /// Also uninstall packages the source does not list
        #[arg(long)]
        mirror: bool,

        /// Show the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Write installed packages to this machine's manifest
    Dump {
        /// Machine whose manifest to write (default: this machine)
        #[arg(long)]
        machine: Option<String>,
    },

    /// List packages in a machine's manifest
    List {
        /// Machine to list (default: this machine)
        #[arg(long)]
        machine: Option<String>,

        /// Only these package types
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<PackageType>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage ignore rules
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },

    /// Show recent operations
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show machines, manifests and available installers
    Status,
}

#[derive(Subcommand)]
enum IgnoreAction {
    /// Ignore a package ID (type:name) or, with --category, a whole type
    Add {
        entry: String,

        /// Apply to one machine instead of globally
        #[arg(long)]
        machine: Option<String>,

        /// Treat the entry as a package type
        #[arg(long)]
        category: bool,
    },

    /// Remove an ignore rule
    Remove {
        entry: String,

        #[arg(long)]
        machine: Option<String>,

        #[arg(long)]
        category: bool,
    },

    /// Show ignore rules and machine-specific packages
    List {
        #[arg(long)]
        machine: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    output::init_colors();

    let mut ctx = Context::load(cli.config_dir)?;

    match cli.command {
        Commands::Diff {
            from,
            types,
            installed,
            json,
        } => commands::diff(&ctx, from.as_deref(), &types, installed, json)?,
        Commands::Import {
            from,
            types,
            dry_run,
        } => commands::import(&ctx, from.as_deref(), &types, dry_run)?,
        Commands::Sync {
            from,
            types,
            mirror,
            dry_run,
        } => commands::sync(&ctx, from.as_deref(), &types, mirror, dry_run)?,
        Commands::Dump { machine } => commands::dump(&ctx, machine.as_deref())?,
        Commands::List {
            machine,
            types,
            json,
        } => commands::list(&ctx, machine.as_deref(), &types, json)?,
        Commands::Ignore { action } => match action {
            IgnoreAction::Add {
                entry,
                machine,
                category,
            } => commands::ignore_add(&mut ctx, &entry, machine.as_deref(), category)?,
            IgnoreAction::Remove {
                entry,
                machine,
                category,
            } => commands::ignore_remove(&mut ctx, &entry, machine.as_deref(), category)?,
            IgnoreAction::List { machine } => commands::ignore_list(&ctx, machine.as_deref())?,
        },
        Commands::History { limit } => commands::history(&ctx, limit)?,
        Commands::Status => commands::status(&ctx)?,
    }

    Ok(())
}
