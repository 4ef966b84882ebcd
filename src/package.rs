//! Package identity - the unit brewsync tracks across machines
//!
//! A package is identified solely by its type and name. Everything else
//! (display name, options, description) is carried along for presentation
//! and manifest round-tripping but never takes part in comparisons.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Category of a tracked package
///
/// The lowercase keyword doubles as the manifest keyword and the ID prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Homebrew tap (repository registration)
    Tap,
    /// Homebrew formula
    Brew,
    /// Homebrew cask
    Cask,
    /// VS Code extension
    Vscode,
    /// Cursor extension
    Cursor,
    /// Antigravity extension
    Antigravity,
    /// Binary installed with `go install`
    Go,
    /// Mac App Store title
    Mas,
}

impl PackageType {
    /// Every type, in manifest group order
    pub const ALL: [PackageType; 8] = [
        PackageType::Tap,
        PackageType::Brew,
        PackageType::Cask,
        PackageType::Vscode,
        PackageType::Cursor,
        PackageType::Antigravity,
        PackageType::Go,
        PackageType::Mas,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PackageType::Tap => "tap",
            PackageType::Brew => "brew",
            PackageType::Cask => "cask",
            PackageType::Vscode => "vscode",
            PackageType::Cursor => "cursor",
            PackageType::Antigravity => "antigravity",
            PackageType::Go => "go",
            PackageType::Mas => "mas",
        }
    }

    /// Human-readable group heading
    pub fn label(self) -> &'static str {
        match self {
            PackageType::Tap => "Taps",
            PackageType::Brew => "Formulae",
            PackageType::Cask => "Casks",
            PackageType::Vscode => "VS Code extensions",
            PackageType::Cursor => "Cursor extensions",
            PackageType::Antigravity => "Antigravity extensions",
            PackageType::Go => "Go tools",
            PackageType::Mas => "App Store apps",
        }
    }

    /// Whether this type is handled by Homebrew itself
    pub fn is_homebrew(self) -> bool {
        matches!(
            self,
            PackageType::Tap | PackageType::Brew | PackageType::Cask
        )
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for PackageType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        PackageType::ALL
            .into_iter()
            .find(|t| t.keyword() == s)
            .ok_or_else(|| SyncError::Validation(format!("unknown package type '{}'", s)))
    }
}

/// Parsed `type:name` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    pub package_type: PackageType,
    pub name: String,
}

impl PackageId {
    pub fn new(package_type: PackageType, name: impl Into<String>) -> Self {
        Self {
            package_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package_type, self.name)
    }
}

impl FromStr for PackageId {
    type Err = SyncError;

    /// Parse `type:name`. Only the first colon separates, so Go module
    /// paths and tap formulae keep their own punctuation.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| SyncError::Validation(format!("expected 'type:name', got '{}'", s)))?;
        let package_type = kind.parse()?;
        if name.trim().is_empty() {
            return Err(SyncError::Validation(format!("empty name in '{}'", s)));
        }
        Ok(Self::new(package_type, name))
    }
}

/// A single trackable package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    #[serde(rename = "type")]
    pub package_type: PackageType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Package {
    /// Create a package, rejecting an empty name
    pub fn new(package_type: PackageType, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SyncError::Validation(format!(
                "{} package with empty name",
                package_type
            )));
        }
        Ok(Self {
            package_type,
            name,
            full_name: None,
            options: BTreeMap::new(),
            description: String::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// `type:name`, the sole identity key
    pub fn id(&self) -> String {
        format!("{}:{}", self.package_type, self.name)
    }

    pub fn package_id(&self) -> PackageId {
        PackageId::new(self.package_type, self.name.clone())
    }

    /// Name to show users: the full name when the identifier is opaque
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.package_type == other.package_type && self.name == other.name
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_type.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.full_name {
            Some(full) if full != &self.name => {
                write!(f, "{}:{} ({})", self.package_type, self.name, full)
            }
            _ => write!(f, "{}:{}", self.package_type, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_format() {
        let pkg = Package::new(PackageType::Brew, "git").unwrap();
        assert_eq!(pkg.id(), "brew:git");

        let tap = Package::new(PackageType::Tap, "homebrew/cask-fonts").unwrap();
        assert_eq!(tap.id(), "tap:homebrew/cask-fonts");
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Package::new(PackageType::Brew, "").is_err());
        assert!(Package::new(PackageType::Cask, "   ").is_err());
    }

    #[test]
    fn test_identity_ignores_metadata() {
        let a = Package::new(PackageType::Brew, "ripgrep")
            .unwrap()
            .with_description("fast grep");
        let b = Package::new(PackageType::Brew, "ripgrep")
            .unwrap()
            .with_option("link", "false");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_identity_is_case_sensitive_and_typed() {
        let lower = Package::new(PackageType::Brew, "git").unwrap();
        let upper = Package::new(PackageType::Brew, "Git").unwrap();
        let cask = Package::new(PackageType::Cask, "git").unwrap();
        assert_ne!(lower, upper);
        assert_ne!(lower, cask);
    }

    #[test]
    fn test_package_type_round_trip() {
        for t in PackageType::ALL {
            assert_eq!(t.keyword().parse::<PackageType>().unwrap(), t);
        }
        assert!("npm".parse::<PackageType>().is_err());
    }

    #[test]
    fn test_package_id_parse() {
        let id: PackageId = "go:golang.org/x/tools/gopls".parse().unwrap();
        assert_eq!(id.package_type, PackageType::Go);
        assert_eq!(id.name, "golang.org/x/tools/gopls");
        assert_eq!(id.to_string(), "go:golang.org/x/tools/gopls");

        assert!("brew".parse::<PackageId>().is_err());
        assert!("brew:".parse::<PackageId>().is_err());
        assert!("pip:requests".parse::<PackageId>().is_err());
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let app = Package::new(PackageType::Mas, "497799835")
            .unwrap()
            .with_full_name("Xcode");
        assert_eq!(app.display_name(), "Xcode");
        assert_eq!(app.to_string(), "mas:497799835 (Xcode)");
    }
}
