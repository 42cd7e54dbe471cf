use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Namespace selected at startup
  #[serde(default = "default_namespace")]
  pub namespace: String,
  #[serde(default)]
  pub refresh: RefreshConfig,
  #[serde(default)]
  pub retry: RetryConfig,
  /// How many samples each metric chart keeps
  #[serde(default = "default_series_capacity")]
  pub series_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
  /// Seconds between automatic refresh cycles
  #[serde(default = "default_period_secs")]
  pub period_secs: u64,
  /// Debounce window for the manual refresh button
  #[serde(default = "default_cooldown_ms")]
  pub manual_cooldown_ms: u64,
}

impl Default for RefreshConfig {
  fn default() -> Self {
    Self {
      period_secs: default_period_secs(),
      manual_cooldown_ms: default_cooldown_ms(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
  /// Total attempts per fetch, including the first
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
  /// Retry N waits base_delay_ms * N before running
  #[serde(default = "default_base_delay_ms")]
  pub base_delay_ms: u64,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts: default_max_attempts(),
      base_delay_ms: default_base_delay_ms(),
    }
  }
}

fn default_base_url() -> String {
  "http://127.0.0.1:8001".to_string()
}

fn default_namespace() -> String {
  "default".to_string()
}

fn default_period_secs() -> u64 {
  10
}

fn default_cooldown_ms() -> u64 {
  1_000
}

fn default_max_attempts() -> u32 {
  3
}

fn default_base_delay_ms() -> u64 {
  1_000
}

fn default_series_capacity() -> usize {
  10
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      namespace: default_namespace(),
      refresh: RefreshConfig::default(),
      retry: RetryConfig::default(),
      series_capacity: default_series_capacity(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./kubedash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/kubedash/config.yaml
  ///
  /// Built-in defaults apply when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("kubedash.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("kubedash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_gets_all_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.api.base_url, "http://127.0.0.1:8001");
    assert_eq!(config.namespace, "default");
    assert_eq!(config.refresh.period_secs, 10);
    assert_eq!(config.refresh.manual_cooldown_ms, 1_000);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.series_capacity, 10);
  }

  #[test]
  fn partial_overrides_keep_remaining_defaults() {
    let raw = r#"
api:
  base_url: http://metrics.internal:9000
refresh:
  period_secs: 30
"#;
    let config: Config = serde_yaml::from_str(raw).unwrap();
    assert_eq!(config.api.base_url, "http://metrics.internal:9000");
    assert_eq!(config.refresh.period_secs, 30);
    assert_eq!(config.refresh.manual_cooldown_ms, 1_000);
    assert_eq!(config.retry.max_attempts, 3);
  }
}
