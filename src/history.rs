//! Append-only log of completed operations
//!
//! One line per entry: `timestamp|machine|operation|summary`, timestamp in
//! RFC 3339. Fields never contain `|` (it is replaced with `/`).

use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const HISTORY_FILE: &str = "history.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub machine: String,
    pub operation: String,
    pub summary: String,
}

impl HistoryEntry {
    pub fn now(
        machine: impl Into<String>,
        operation: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            machine: machine.into(),
            operation: operation.into(),
            summary: summary.into(),
        }
    }

    fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.timestamp.to_rfc3339(),
            clean(&self.machine),
            clean(&self.operation),
            clean(&self.summary)
        )
    }

    fn from_line(line: &str) -> Option<Self> {
        let mut fields = line.splitn(4, '|');
        let timestamp = DateTime::parse_from_rfc3339(fields.next()?).ok()?;
        Some(Self {
            timestamp: timestamp.with_timezone(&Local),
            machine: fields.next()?.to_string(),
            operation: fields.next()?.to_string(),
            summary: fields.next()?.to_string(),
        })
    }
}

fn clean(field: &str) -> String {
    field.replace('|', "/").replace(['\n', '\r'], " ")
}

/// Append one entry, creating the file and its directory as needed
pub fn append(path: &Path, entry: &HistoryEntry) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", entry.to_line())?;
    Ok(())
}

/// The most recent `limit` entries, oldest first; malformed lines are skipped
pub fn read(path: &Path, limit: usize) -> Result<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    let entries: Vec<HistoryEntry> = content.lines().filter_map(HistoryEntry::from_line).collect();
    let skip = entries.len().saturating_sub(limit);
    Ok(entries.into_iter().skip(skip).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join(HISTORY_FILE);

        append(&path, &HistoryEntry::now("air", "import", "3 installed")).unwrap();
        append(&path, &HistoryEntry::now("air", "sync", "1 installed | 2 removed")).unwrap();

        let entries = read(&path, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation, "import");
        assert_eq!(entries[1].summary, "1 installed / 2 removed");
    }

    #[test]
    fn test_read_limit_keeps_latest() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        for i in 0..5 {
            append(&path, &HistoryEntry::now("mini", "dump", format!("run {}", i))).unwrap();
        }
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"garbage line\n")
            .unwrap();

        let entries = read(&path, 2).unwrap();
        let summaries: Vec<_> = entries.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, ["run 3", "run 4"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(read(&dir.path().join(HISTORY_FILE), 10).unwrap().is_empty());
    }
}
