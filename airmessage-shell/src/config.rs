//! Shell Configuration
//!
//! Configuration management for the AirMessage shell.

use airmessage_core::{ContactsConfig, ContextConfig, PlatformConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "shell.toml";

/// Shell configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Host platform selection
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Contacts source
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// Storage paths
    #[serde(default)]
    pub paths: PathConfig,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Configuration directory
    pub config_dir: PathBuf,

    /// Data directory (contacts exports, etc.)
    pub data_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join("airmessage"),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("airmessage")
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Load configuration from the default location, creating it if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Settings handed to the application context
    pub fn context_config(&self) -> ContextConfig {
        ContextConfig {
            platform: self.platform.clone(),
            contacts: self.contacts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airmessage_core::PlatformKind;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.platform.kind, PlatformKind::Browser);
        assert!(config.contacts.source.is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "[platform]\nkind = \"desktop\"\ninitially_visible = false\n\n[contacts]\nsource = \"/tmp/contacts.json\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.platform.kind, PlatformKind::Desktop);
        assert!(!config.platform.initially_visible);

        let context = config.context_config();
        assert_eq!(
            context.contacts.source,
            Some(PathBuf::from("/tmp/contacts.json"))
        );
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[platform]\nkind = \"toaster\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
