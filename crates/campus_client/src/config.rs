use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub http_proxy_auth: Option<ProxyAuth>,
    #[serde(default)]
    pub https_proxy_auth: Option<ProxyAuth>,
    /// Where the persistent store lives; `~/.campus` when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Keep the session in memory only
    #[serde(default)]
    pub ephemeral: bool,
}

const CONFIG_FILE_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "CAMPUS_CONFIG";

fn default_api_base() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_login_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn campus_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".campus")
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: default_api_base(),
            http_proxy: String::new(),
            https_proxy: String::new(),
            http_proxy_auth: None,
            https_proxy_auth: None,
            data_dir: None,
            login_timeout_secs: default_login_timeout_secs(),
            max_retries: default_max_retries(),
            ephemeral: false,
        }
    }
}

impl Config {
    /// Load `config.toml` (or the file named by `CAMPUS_CONFIG`), then apply
    /// environment overrides. A missing or broken file falls back to defaults.
    pub fn new() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_PATH));

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{e}; using defaults");
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from variables resolved by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("API_BASE") {
            self.api_base = api_base;
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(data_dir) = lookup("CAMPUS_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Some(timeout) = lookup("CAMPUS_LOGIN_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => self.login_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid CAMPUS_LOGIN_TIMEOUT_SECS={timeout:?}"),
            }
        }
        if let Some(retries) = lookup("CAMPUS_MAX_RETRIES") {
            match retries.trim().parse() {
                Ok(count) => self.max_retries = count,
                Err(_) => log::warn!("Ignoring invalid CAMPUS_MAX_RETRIES={retries:?}"),
            }
        }
        if let Some(ephemeral) = lookup("CAMPUS_EPHEMERAL") {
            self.ephemeral = parse_bool_env(&ephemeral);
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(campus_dir)
    }

    pub fn login_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.login_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn parse_bool_env_true_values() {
        for value in ["1", "true", "TRUE", " yes ", "Y", "on"] {
            assert!(parse_bool_env(value), "value {value:?} should be true");
        }
    }

    #[test]
    fn parse_bool_env_false_values() {
        for value in ["0", "false", "no", "off", "", "  "] {
            assert!(!parse_bool_env(value), "value {value:?} should be false");
        }
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base = \"https://rewards.campus.edu/api\"\nmax_retries = 5\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_base, "https://rewards.campus.edu/api");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.login_timeout_secs, 15);
        assert!(!config.ephemeral);
    }

    #[test]
    fn broken_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base = [").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("API_BASE", "https://staging.campus.edu/api"),
            ("CAMPUS_DATA_DIR", "/tmp/campus-test"),
            ("CAMPUS_LOGIN_TIMEOUT_SECS", "30"),
            ("CAMPUS_MAX_RETRIES", "many"),
            ("CAMPUS_EPHEMERAL", "yes"),
        ]));

        assert_eq!(config.api_base, "https://staging.campus.edu/api");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/campus-test"));
        assert_eq!(config.login_timeout(), std::time::Duration::from_secs(30));
        assert_eq!(config.max_retries, default_max_retries());
        assert!(config.ephemeral);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config {
            login_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.login_timeout(), std::time::Duration::from_secs(1));
    }
}
