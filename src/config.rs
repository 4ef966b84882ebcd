//! brewsync configuration file
//!
//! Lives at `config.yaml` in the config directory:
//!
//! ```yaml
//! default_source: mini
//! machines:
//!   mini:
//!     hostname: Mac-mini
//!     brewfile: ~/dotfiles/Brewfile.mini
//!   air:
//!     hostname: MacBook-Air
//!     brewfile: ~/dotfiles/Brewfile.air
//! ignore:
//!   global:
//!     categories: [mas]
//!     packages: ["brew:htop"]
//!   machines:
//!     air:
//!       packages: ["cask:docker"]
//! machine_specific:
//!   mini: ["brew:ollama"]
//! ```
//!
//! **Directory resolution**: `BREWSYNC_CONFIG_DIR`, else
//! `$XDG_CONFIG_HOME/brewsync`, else `~/.config/brewsync`.

use crate::error::{Result, SyncError};
use crate::ignore::{IgnoreConfig, MachineSpecificSet};
use crate::package::PackageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const CONFIG_FILE: &str = "config.yaml";

/// Get the brewsync configuration directory
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BREWSYNC_CONFIG_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return PathBuf::from(xdg).join("brewsync");
    }
    home_dir().join(".config/brewsync")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_default()
}

/// Expand a leading `~/` to `$HOME`
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Short host name of this machine
pub fn hostname() -> Option<String> {
    let from_command = Command::new("hostname")
        .arg("-s")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|h| !h.is_empty());

    from_command.or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
}

/// One machine taking part in the sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub brewfile: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides host name detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_machine: Option<String>,
    /// Machine to import from when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,
    #[serde(default)]
    pub machines: BTreeMap<String, MachineConfig>,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub machine_specific: MachineSpecificSet,
}

impl Config {
    /// Load from the default config directory
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        for entry in config.invalid_entries() {
            tracing::warn!("{}: ignoring invalid package ID '{}'", path.display(), entry);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn machine(&self, name: &str) -> Result<&MachineConfig> {
        self.machines
            .get(name)
            .ok_or_else(|| SyncError::UnknownMachine(name.to_string()))
    }

    /// Manifest path for `name`, with `~` expanded
    pub fn brewfile_path(&self, name: &str) -> Result<PathBuf> {
        Ok(expand_tilde(&self.machine(name)?.brewfile))
    }

    /// Machine whose configured host name matches `host` (case-insensitive)
    pub fn machine_for_host(&self, host: &str) -> Option<&str> {
        self.machines
            .iter()
            .find(|(_, m)| {
                m.hostname
                    .as_deref()
                    .is_some_and(|h| h.eq_ignore_ascii_case(host))
            })
            .map(|(name, _)| name.as_str())
    }

    /// The machine brewsync is running on
    ///
    /// `current_machine` wins; otherwise the host name is matched against
    /// the machine table.
    pub fn current_machine(&self) -> Result<String> {
        if let Some(name) = &self.current_machine {
            self.machine(name)?;
            return Ok(name.clone());
        }
        let host = hostname().unwrap_or_default();
        self.machine_for_host(&host)
            .map(str::to_string)
            .ok_or(SyncError::UnknownMachine(host))
    }

    /// Source machine: the explicit one, else `default_source`
    pub fn source_machine(&self, explicit: Option<&str>) -> Result<String> {
        let name = explicit
            .map(str::to_string)
            .or_else(|| self.default_source.clone())
            .ok_or_else(|| SyncError::Validation("no source machine given".to_string()))?;
        self.machine(&name)?;
        Ok(name)
    }

    /// Ignore and machine-specific entries that are not valid `type:name` IDs
    pub fn invalid_entries(&self) -> Vec<String> {
        let ignore_ids = std::iter::once(&self.ignore.global)
            .chain(self.ignore.machines.values())
            .flat_map(|layer| layer.packages.iter());
        let specific_ids = self.machine_specific.machines.values().flatten();

        ignore_ids
            .chain(specific_ids)
            .filter(|id| id.parse::<PackageId>().is_err())
            .cloned()
            .collect()
    }
}
