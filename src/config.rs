use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::constants;

/// User preferences stored in `<config dir>/prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub display_mode: Option<String>,
  /// Catalog URL or local path; falls back to the built-in catalog URL.
  pub catalog_source: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = ProjectDirs::from("", "", &constants().app_name) {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match toml::from_str(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "config: ignoring unreadable prefs"),
        }
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = ProjectDirs::from("", "", &constants().app_name) {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self)
          && let Err(e) = std::fs::write(&config_file, content)
        {
          warn!(path = %config_file.display(), err = %e, "config: failed to save prefs");
        }
      }
    }
  }

  /// The catalog source to use: CLI flag, then prefs, then the built-in URL.
  pub fn catalog_source(&self, cli: Option<&str>) -> String {
    cli.map(str::to_string).or_else(|| self.catalog_source.clone()).unwrap_or_else(|| constants().catalog_url.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefs_toml_round_trip() {
    let config = Config {
      theme_name: Some("Dusk".to_string()),
      display_mode: Some("ascii".to_string()),
      catalog_source: None,
    };
    let text = toml::to_string(&config).unwrap();
    assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
  }

  #[test]
  fn missing_keys_default_to_none() {
    let config: Config = toml::from_str("theme_name = \"Paper\"").unwrap();
    assert_eq!(config.theme_name.as_deref(), Some("Paper"));
    assert!(config.catalog_source.is_none());
  }

  #[test]
  fn catalog_source_precedence() {
    let mut config = Config::default();
    assert_eq!(config.catalog_source(None), constants().catalog_url);
    config.catalog_source = Some("./local.json".to_string());
    assert_eq!(config.catalog_source(None), "./local.json");
    assert_eq!(config.catalog_source(Some("https://cli.example/c.json")), "https://cli.example/c.json");
  }
}
