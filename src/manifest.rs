//! Brewfile-style manifest codec
//!
//! Each machine keeps one manifest listing what should be installed:
//!
//! ```text
//! tap "homebrew/cask-fonts"
//!
//! # fast grep
//! brew "ripgrep"
//! brew "mpv", link: false
//!
//! cask "wezterm"
//! vscode "rust-lang.rust-analyzer"
//! go "golang.org/x/tools/gopls"
//! mas "Xcode", id: 497799835
//! ```
//!
//! A comment line directly above a declaration becomes that package's
//! description. A blank line (or any unrecognized line) clears the pending
//! comment. Unrecognized lines are skipped rather than rejected; callers that
//! care can ask for the warnings with [`parse_with_warnings`].

use crate::collection::PackageCollection;
use crate::error::{Result, SyncError};
use crate::package::{Package, PackageType};
use std::fmt;
use std::fs;
use std::path::Path;

/// Largest edit distance at which an unknown keyword gets a suggestion
const SUGGESTION_DISTANCE: usize = 2;

/// A line the parser skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number
    pub line: usize,
    pub content: String,
    pub reason: String,
    /// Closest known keyword when the line looks like a typo
    pub suggestion: Option<PackageType>,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.reason, self.content)?;
        if let Some(kind) = self.suggestion {
            write!(f, ", did you mean '{}'?", kind)?;
        }
        Ok(())
    }
}

/// Parsed packages plus everything that was skipped on the way
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub packages: PackageCollection,
    pub warnings: Vec<ParseWarning>,
}

/// Parse manifest text, silently skipping lines it does not understand
pub fn parse(content: &str) -> PackageCollection {
    parse_with_warnings(content).packages
}

/// Parse manifest text and report skipped lines
pub fn parse_with_warnings(content: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut pending: Option<String> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() {
            pending = None;
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            pending = Some(comment.trim().to_string());
            continue;
        }

        match parse_declaration(line) {
            Ok(pkg) => {
                let pkg = match pending.take() {
                    Some(desc) => pkg.with_description(desc),
                    None => pkg,
                };
                report.packages.add_unique([pkg]);
            }
            Err((reason, suggestion)) => {
                pending = None;
                report.warnings.push(ParseWarning {
                    line: idx + 1,
                    content: line.to_string(),
                    reason,
                    suggestion,
                });
            }
        }
    }

    report
}

type DeclError = (String, Option<PackageType>);

fn parse_declaration(line: &str) -> std::result::Result<Package, DeclError> {
    let (keyword, rest) = match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    };

    let package_type: PackageType = keyword.parse().map_err(|_| {
        (
            format!("unknown keyword '{}'", keyword),
            suggest_keyword(keyword),
        )
    })?;

    let (name, mut rest) = take_quoted(rest)
        .ok_or_else(|| (format!("expected a quoted name after '{}'", keyword), None))?;

    let mut options = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('#') {
            break;
        }
        let Some(after_comma) = rest.strip_prefix(',') else {
            return Err((format!("unexpected text '{}'", rest), None));
        };
        // `tap "user/repo", "https://..."` takes the clone URL positionally
        if package_type == PackageType::Tap
            && let Some((url, remainder)) = take_quoted(after_comma.trim_start())
        {
            options.push(("url".to_string(), url));
            rest = remainder;
            continue;
        }
        let (key, value, remainder) = take_option(after_comma)
            .ok_or_else(|| (format!("malformed option '{}'", after_comma.trim()), None))?;
        options.push((key, value));
        rest = remainder;
    }

    let mut pkg = if package_type == PackageType::Mas {
        // `mas "Title", id: 123` is identified by its numeric id
        let id = options
            .iter()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.clone());
        match id {
            Some(id) => {
                let pkg = Package::new(package_type, id).map_err(|e| (e.to_string(), None))?;
                if name != pkg.name {
                    pkg.with_full_name(name)
                } else {
                    pkg
                }
            }
            None => Package::new(package_type, name).map_err(|e| (e.to_string(), None))?,
        }
    } else {
        Package::new(package_type, name).map_err(|e| (e.to_string(), None))?
    };

    for (key, value) in options {
        pkg.options.insert(key, value);
    }
    Ok(pkg)
}

/// Split a leading `"value"` or `'value'` off `s`, resolving escapes
///
/// Double quotes understand `\\`, `\"`, `\n`, `\r` and `\t`; single
/// quotes only `\\` and `\'`, as in Ruby.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut value = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((pos, c)) = chars.next() {
        if c == quote {
            return Some((value, &s[pos + c.len_utf8()..]));
        }
        if c != '\\' {
            value.push(c);
            continue;
        }
        let (_, next) = chars.next()?;
        match (quote, next) {
            ('"', 'n') => value.push('\n'),
            ('"', 'r') => value.push('\r'),
            ('"', 't') => value.push('\t'),
            ('"', _) => value.push(next),
            (_, '\\' | '\'') => value.push(next),
            (_, _) => {
                value.push('\\');
                value.push(next);
            }
        }
    }
    None
}

/// Byte length of the `[...]` or `{...}` group `s` starts with
///
/// Nested groups and quoted strings inside the group are skipped over.
fn group_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote: Option<char> = None;
    let mut escaped = false;
    for (pos, c) in s.char_indices() {
        if let Some(quote) = in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_quote = Some(c),
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            _ if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

fn is_option_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `key: value` (value quoted, a `[..]`/`{..}` group, or bare) from the start of `s`
fn take_option(s: &str) -> Option<(String, String, &str)> {
    let s = s.trim_start();
    let colon = s.find(':')?;
    let key = s[..colon].trim();
    if !is_option_key(key) {
        return None;
    }
    let value_part = s[colon + 1..].trim_start();

    if let Some((value, rest)) = take_quoted(value_part) {
        return Some((key.to_string(), value, rest));
    }

    if value_part.starts_with(['[', '{']) {
        let end = group_len(value_part)?;
        return Some((
            key.to_string(),
            value_part[..end].to_string(),
            &value_part[end..],
        ));
    }

    let end = value_part
        .find(|c: char| c == ',' || c == '#')
        .unwrap_or(value_part.len());
    let value = value_part[..end].trim();
    if value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string(), &value_part[end..]))
}

fn suggest_keyword(keyword: &str) -> Option<PackageType> {
    let lowered = keyword.to_ascii_lowercase();
    PackageType::ALL
        .into_iter()
        .map(|t| (t, strsim::levenshtein(&lowered, t.keyword())))
        .filter(|(_, dist)| *dist <= SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(t, _)| t)
}

/// Render a collection as manifest text
///
/// Groups are written in [`PackageType::ALL`] order, separated by a blank
/// line; items keep collection order inside their group.
pub fn write(collection: &PackageCollection) -> String {
    let groups = collection.by_type();
    let mut out = String::new();

    for package_type in PackageType::ALL {
        let Some(group) = groups.get(&package_type) else {
            continue;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        for pkg in group {
            if !pkg.description.is_empty() {
                out.push_str("# ");
                out.push_str(&single_line(&pkg.description));
                out.push('\n');
            }
            out.push_str(&declaration(pkg));
            out.push('\n');
        }
    }

    out
}

fn declaration(pkg: &Package) -> String {
    let mut line = if pkg.package_type == PackageType::Mas {
        format!(
            "mas {}, id: {}",
            quote(pkg.display_name()),
            format_value(&pkg.name)
        )
    } else {
        format!("{} {}", pkg.package_type, quote(&pkg.name))
    };

    if pkg.package_type == PackageType::Tap
        && let Some(url) = pkg.option("url")
    {
        line.push_str(&format!(", {}", quote(url)));
    }

    for (key, value) in &pkg.options {
        let positional = match pkg.package_type {
            PackageType::Mas => key == "id",
            PackageType::Tap => key == "url",
            _ => false,
        };
        if positional {
            continue;
        }
        if !is_option_key(key) {
            tracing::warn!("{}: dropping option with unwritable key '{}'", pkg.id(), key);
            continue;
        }
        line.push_str(&format!(", {}: {}", key, format_value(value)));
    }
    line
}

/// Write an option value bare when it reads back unchanged, quoted otherwise
fn format_value(value: &str) -> String {
    let group = value.starts_with(['[', '{'])
        && group_len(value) == Some(value.len())
        && !value.contains(['\n', '\r']);
    let symbol = value
        .strip_prefix(':')
        .is_some_and(|sym| !sym.is_empty() && sym.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    let word = value == "true"
        || value == "false"
        || (!value.is_empty() && value.chars().all(|c| c.is_ascii_digit()));
    if group || symbol || word {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Quote a string so [`take_quoted`] returns it unchanged
///
/// Single quotes are used for values with `"` that need no escaping there.
fn quote(value: &str) -> String {
    let single = value.contains('"')
        && !value.contains(['\'', '\\', '\n', '\r', '\t']);
    if single {
        return format!("'{}'", value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read and parse a manifest file, logging skipped lines
pub fn read(path: &Path) -> Result<PackageCollection> {
    let report = read_report(path)?;
    for warning in &report.warnings {
        tracing::warn!("{}: {}", path.display(), warning);
    }
    Ok(report.packages)
}

/// Read a manifest file and keep the parse warnings
pub fn read_report(path: &Path) -> Result<ParseReport> {
    if !path.exists() {
        return Err(SyncError::ManifestNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_with_warnings(&content))
}

/// Write a collection to `path`, creating parent directories as needed
pub fn write_to(path: &Path, collection: &PackageCollection) -> Result<()> {
    write_with_header(path, collection, None)
}

/// Write a collection with an optional leading comment block
///
/// The header is separated from the first declaration by a blank line so it
/// never becomes a package description.
pub fn write_with_header(
    path: &Path,
    collection: &PackageCollection,
    header: Option<&str>,
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut content = String::new();
    if let Some(header) = header {
        for line in header.lines() {
            content.push_str("# ");
            content.push_str(line);
            content.push('\n');
        }
        content.push('\n');
    }
    content.push_str(&write(collection));

    fs::write(path, content)?;
    tracing::debug!("Wrote {} packages to {}", collection.len(), path.display());
    Ok(())
}
