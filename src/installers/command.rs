//! Subprocess helpers shared by the installers

use anyhow::{Context, Result, anyhow};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

/// Lines of output kept for the error message of a failed streaming command
const TAIL_LINES: usize = 5;

/// Check whether `program` runs at all (`program <check_arg>` exits 0)
pub fn command_available(program: &str, check_arg: &str) -> bool {
    Command::new(program)
        .arg(check_arg)
        .stdin(Stdio::null())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run to completion and return stdout; stderr becomes the error on failure
pub fn run(command: &mut Command) -> Result<String> {
    let shown = describe(command);
    tracing::debug!("Running {}", shown);

    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute {}", shown))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return Err(if stderr.is_empty() {
            anyhow!("{} exited with {}", shown, output.status)
        } else {
            anyhow!("{} failed: {}", shown, stderr)
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run to completion, handing every line of combined stdout/stderr to `on_line`
///
/// Lines are delivered synchronously while the child runs.
pub fn run_streaming(mut command: Command, on_line: &mut dyn FnMut(&str)) -> Result<()> {
    let shown = describe(&command);
    tracing::debug!("Streaming {}", shown);

    let (reader, writer) = std::io::pipe().context("Failed to create output pipe")?;
    command
        .stdin(Stdio::null())
        .stdout(writer.try_clone().context("Failed to clone output pipe")?)
        .stderr(writer);

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to execute {}", shown))?;
    // The command still holds the write ends; drop it so the reader sees EOF
    drop(command);

    let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read output of {}", shown))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        on_line(line);

        if tail.len() == TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {}", shown))?;
    if !status.success() {
        let last = tail.into_iter().collect::<Vec<_>>().join("\n");
        return Err(if last.trim().is_empty() {
            anyhow!("{} exited with {}", shown, status)
        } else {
            anyhow!("{} exited with {}: {}", shown, status, last.trim())
        });
    }
    Ok(())
}

/// Non-empty trimmed lines of command output
pub fn output_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}
