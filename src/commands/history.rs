use super::Context;
use brewsync::Result;
use brewsync::history;
use colored::Colorize;

pub fn history(ctx: &Context, limit: usize) -> Result<()> {
    let entries = history::read(&ctx.history_path(), limit)?;
    if entries.is_empty() {
        println!("{}", "No history yet".dimmed());
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {:<10} {:<8} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.machine.cyan(),
            entry.operation.bold(),
            entry.summary
        );
    }
    Ok(())
}
