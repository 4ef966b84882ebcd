//! Batch progress: an indicatif bar plus the native terminal indicator
//!
//! The OSC 9;4 sequence drives the taskbar/tab progress in Ghostty, WezTerm,
//! Windows Terminal and ConEmu, and is ignored elsewhere.

use crate::output;
use brewsync::orchestrator::{BatchReport, ItemOutcome, Operation};
use brewsync::Package;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy)]
enum TerminalState {
    Off = 0,
    Normal = 1,
    Error = 2,
}

fn set_terminal_progress(state: TerminalState, percent: u8) {
    print!("\x1b]9;4;{};{}\x1b\\", state as u8, percent.min(100));
    let _ = io::stdout().flush();
}

/// Renders one batch while it runs
pub struct BatchProgress {
    bar: ProgressBar,
    interactive: bool,
    total: usize,
    done: Cell<usize>,
}

impl BatchProgress {
    pub fn new(operation: Operation, total: usize) -> Self {
        let interactive = io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err();
        let bar = if interactive {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(format!("{}ing...", operation.verb()));

        let progress = Self {
            bar,
            interactive,
            total,
            done: Cell::new(0),
        };
        progress.update_terminal(TerminalState::Normal);
        progress
    }

    /// Subprocess output for the package currently running
    pub fn line(&self, pkg: &Package, line: &str) {
        if self.interactive {
            self.bar.set_message(format!("{}: {}", pkg.name, line.trim()));
        } else {
            println!("    {}", line.dimmed());
        }
    }

    /// A finished item
    pub fn item(&self, item: &ItemOutcome) {
        self.done.set(self.done.get() + 1);
        if self.interactive {
            self.bar.println(output::outcome_line(item));
        } else {
            println!("{}", output::outcome_line(item));
        }
        self.bar.inc(1);
        self.update_terminal(if item.is_failure() {
            TerminalState::Error
        } else {
            TerminalState::Normal
        });
    }

    pub fn finish(self, report: &BatchReport) {
        self.bar.finish_and_clear();
        let failed = report.failures().count();
        if self.interactive {
            set_terminal_progress(TerminalState::Off, 0);
        }
        println!(
            "{} {}: {} succeeded, {} skipped, {} failed",
            if failed == 0 {
                output::ok_mark()
            } else {
                output::fail_mark()
            },
            report.operation.verb(),
            report.succeeded().to_string().bold(),
            report.skipped(),
            failed.to_string().bold()
        );
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.done.get() as f64 / self.total as f64) * 100.0).min(100.0) as u8
    }

    fn update_terminal(&self, state: TerminalState) {
        if self.interactive {
            set_terminal_progress(state, self.percent());
        }
    }
}
