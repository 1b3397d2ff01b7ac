use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "holocron";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base address all endpoint paths are relative to
  pub url: String,
  /// Film list endpoint
  pub films_path: String,
  /// Single film endpoint; `{id}` is replaced with the film id
  pub film_path: String,
  /// Single character endpoint; `{id}` is replaced with the character id
  pub character_path: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: "https://swapi.dev/api".to_string(),
      films_path: "films".to_string(),
      film_path: "films/{id}".to_string(),
      character_path: "people/{id}".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Persist the cache between runs
  pub enabled: bool,
  /// Database file (defaults to the data directory)
  pub path: Option<PathBuf>,
  /// Name of the slot the cache snapshot is stored under
  pub slot: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
      slot: "catalogState".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./holocron.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/holocron/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  /// `HOLOCRON_API_URL` overrides `api.url`.
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

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var("HOLOCRON_API_URL") {
      config.api.url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from(format!("{}.yaml", APP_NAME));
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join(APP_NAME).join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Directory for the cache database and log files.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join(APP_NAME))
  }

  /// Database path for the persisted cache.
  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.storage.path {
      Some(path) => Ok(path.clone()),
      None => Ok(Self::data_dir()?.join("cache.db")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.api.url, "https://swapi.dev/api");
    assert_eq!(config.api.film_path, "films/{id}");
    assert!(config.storage.enabled);
    assert_eq!(config.storage.slot, "catalogState");
  }

  #[test]
  fn test_partial_config_keeps_other_defaults() {
    let config = Config::from_yaml(
      "api:\n  url: http://localhost:9000/api\nstorage:\n  enabled: false\n",
    )
    .unwrap();
    assert_eq!(config.api.url, "http://localhost:9000/api");
    assert_eq!(config.api.character_path, "people/{id}");
    assert!(!config.storage.enabled);
    assert_eq!(config.storage.slot, "catalogState");
  }

  #[test]
  fn test_explicit_database_path() {
    let config = Config::from_yaml("storage:\n  path: /tmp/holocron-test.db\n").unwrap();
    assert_eq!(
      config.database_path().unwrap(),
      PathBuf::from("/tmp/holocron-test.db")
    );
  }

  #[test]
  fn test_invalid_yaml_is_an_error() {
    assert!(Config::from_yaml("api: [not, a, map]").is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/holocron.yaml"))).is_err());
  }
}
