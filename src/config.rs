use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".carbontrack";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_OWNER: &str = "local";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    pub api_port: u16,
    pub default_owner: String,
}

impl Default for Config {
    fn default() -> Self {
        let root = default_root_dir();

        Self {
            db_path: root.join("db").join("carbon.db"),
            api_port: 7891,
            default_owner: DEFAULT_OWNER.to_string(),
        }
    }
}

impl Config {
    pub fn root_dir() -> PathBuf {
        default_root_dir()
    }

    pub fn config_path() -> PathBuf {
        default_root_dir().join(CONFIG_FILE)
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load().or_else(|_| {
            let config = Self::default();
            config.save()?;
            Ok(config)
        })
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(&config_path)?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "db_path" => {
                self.db_path = expand_home(value);
            }
            "api_port" => {
                self.api_port = value
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            "default_owner" => {
                let owner = value.trim();
                if owner.is_empty() {
                    bail!("default_owner must not be empty");
                }
                self.default_owner = owner.to_string();
            }
            _ => {
                bail!("Unsupported config key: {key}. Supported keys: db_path, api_port, default_owner");
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "db_path" => Some(self.db_path.display().to_string()),
            "api_port" => Some(self.api_port.to_string()),
            "default_owner" => Some(self.default_owner.clone()),
            _ => None,
        }
    }
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn rejects_unknown_config_key() {
        let mut config = Config::default();
        assert!(config.set_value("polling_seconds", "300").is_err());
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut config = Config::default();
        config.set_value("api_port", "9000").expect("set port");
        config.set_value("default_owner", "alice").expect("set owner");

        assert_eq!(config.get_value("api_port").as_deref(), Some("9000"));
        assert_eq!(config.get_value("default_owner").as_deref(), Some("alice"));
        assert!(config.get_value("unknown").is_none());
    }

    #[test]
    fn empty_owner_is_rejected() {
        let mut config = Config::default();
        assert!(config.set_value("default_owner", "  ").is_err());
    }
}
