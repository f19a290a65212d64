use crate::error::{MailAdmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_VERIFY_DELAY_MS: u64 = 1500;
pub const DEFAULT_TOP_USERS: usize = 3;

/// Configuration for mailadm, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MailAdmConfig {
    /// Rows per page for list commands
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How long a DNS verification takes before the domain turns Active
    #[serde(default = "default_verify_delay_ms")]
    pub verify_delay_ms: u64,

    /// Mailboxes shown in the dashboard storage ranking
    #[serde(default = "default_top_users")]
    pub top_users: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_verify_delay_ms() -> u64 {
    DEFAULT_VERIFY_DELAY_MS
}

fn default_top_users() -> usize {
    DEFAULT_TOP_USERS
}

impl Default for MailAdmConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            verify_delay_ms: DEFAULT_VERIFY_DELAY_MS,
            top_users: DEFAULT_TOP_USERS,
        }
    }
}

pub const CONFIG_KEYS: &[&str] = &["page_size", "verify_delay_ms", "top_users"];

impl MailAdmConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(MailAdmError::Io)?;
        let config: MailAdmConfig =
            serde_json::from_str(&content).map_err(MailAdmError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(MailAdmError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(MailAdmError::Serialization)?;
        fs::write(config_path, content).map_err(MailAdmError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page_size" => Some(self.page_size.to_string()),
            "verify_delay_ms" => Some(self.verify_delay_ms.to_string()),
            "top_users" => Some(self.top_users.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || {
            MailAdmError::Validation(format!("'{}' is not a valid value for {}", value, key))
        };
        match key {
            "page_size" => {
                let size: usize = value.trim().parse().map_err(|_| invalid())?;
                if size == 0 {
                    return Err(MailAdmError::Validation(
                        "page_size must be at least 1".to_string(),
                    ));
                }
                self.page_size = size;
            }
            "verify_delay_ms" => self.verify_delay_ms = value.trim().parse().map_err(|_| invalid())?,
            "top_users" => self.top_users = value.trim().parse().map_err(|_| invalid())?,
            _ => {
                return Err(MailAdmError::Validation(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MailAdmConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.verify_delay_ms, 1500);
        assert_eq!(config.top_users, 3);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = MailAdmConfig::load(dir.path().join("absent")).unwrap();
        assert_eq!(config, MailAdmConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();

        let mut config = MailAdmConfig::default();
        config.set("page_size", "25").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = MailAdmConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.page_size, 25);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"top_users": 5}"#).unwrap();

        let config = MailAdmConfig::load(dir.path()).unwrap();
        assert_eq!(config.top_users, 5);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = MailAdmConfig::default();
        assert!(config.set("page_size", "0").is_err());
        assert!(config.set("page_size", "many").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, MailAdmConfig::default());
    }

    #[test]
    fn test_list_all_covers_every_key() {
        let config = MailAdmConfig::default();
        let all = config.list_all();
        assert_eq!(all.len(), CONFIG_KEYS.len());
        assert_eq!(all[1], ("verify_delay_ms", "1500".to_string()));
    }
}
