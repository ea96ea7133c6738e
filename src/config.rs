use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

/// User preferences read from `prefs.toml` in the platform config dir.
#[derive(Deserialize, Default, Debug, PartialEq, Eq)]
pub struct Config {
  /// Catalog file to load instead of the embedded one.
  pub catalog_path: Option<PathBuf>,
  /// `tracing` filter directive used when `RUST_LOG` is unset.
  pub log_filter: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file) {
        return Self::parse(&content);
      }
    }
    Self::default()
  }

  /// Parse prefs content, falling back to defaults when it is malformed.
  pub fn parse(content: &str) -> Self {
    toml::from_str(content).unwrap_or_default()
  }
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "vp")
}

/// Directory for the rolling log file. Falls back to `.logs` in the working dir.
pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_local_dir().join("logs")).unwrap_or_else(|| PathBuf::from(".logs"))
}
