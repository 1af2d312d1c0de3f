//! Runtime configuration
//!
//! Settings are read from `gamestore.yaml` in the data directory when it
//! exists; command-line flags override them.
//!
//! ```yaml
//! bind: 127.0.0.1:3000
//! history: true
//! templates: ./my-templates
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "gamestore.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Data directory; collections live under `<root>/collections`
    #[serde(skip)]
    pub root: PathBuf,
    /// Address the HTTP server listens on
    pub bind: String,
    /// Directory of template overrides
    pub templates: Option<PathBuf>,
    /// Commit every write to a git repository in the data directory
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bind: "127.0.0.1:3000".to_string(),
            templates: None,
            history: true,
        }
    }
}

impl Config {
    /// Defaults rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load `<root>/gamestore.yaml`, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config: Config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        config.root = root.to_path_buf();

        // Relative template paths are relative to the data directory
        if let Some(templates) = config.templates.as_mut() {
            if templates.is_relative() {
                *templates = root.join(&*templates);
            }
        }

        Ok(config)
    }

    /// Write this config to `<root>/gamestore.yaml`
    pub fn save(&self) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| crate::Error::YamlSerializeError {
            message: e.to_string(),
        })?;
        std::fs::write(self.root.join(CONFIG_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();

        assert_eq!(config.root, tmp.path());
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert!(config.history);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "history: false\ntemplates: views\n").unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert!(!config.history);
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.templates, Some(tmp.path().join("views")));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.bind = "0.0.0.0:8080".into();
        config.save().unwrap();

        assert_eq!(Config::load(tmp.path()).unwrap(), config);
    }
}
