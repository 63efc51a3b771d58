//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::compliance::EngineDefaults;
use crate::core::Project;

/// CQT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new records
    pub author: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Nominal tile length (mm) when a batch does not declare one
    pub nominal_length: Option<f64>,

    /// Nominal tile width (mm) when a batch does not declare one
    pub nominal_width: Option<f64>,

    /// Nominal tile thickness (mm) when a batch does not declare one
    pub nominal_thickness: Option<f64>,

    /// Whether missing nominal dimensions fall back to the values above
    pub nominal_fallback: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/cqt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.cqt/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.merge(Self::from_env());

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    fn from_env() -> Config {
        Config {
            author: std::env::var("CQT_AUTHOR").ok(),
            default_format: None,
            nominal_length: env_number("CQT_NOMINAL_LENGTH"),
            nominal_width: env_number("CQT_NOMINAL_WIDTH"),
            nominal_thickness: env_number("CQT_NOMINAL_THICKNESS"),
            nominal_fallback: None,
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cqt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.nominal_length.is_some() {
            self.nominal_length = other.nominal_length;
        }
        if other.nominal_width.is_some() {
            self.nominal_width = other.nominal_width;
        }
        if other.nominal_thickness.is_some() {
            self.nominal_thickness = other.nominal_thickness;
        }
        if other.nominal_fallback.is_some() {
            self.nominal_fallback = other.nominal_fallback;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Fallback reference values for the compliance engine
    pub fn engine_defaults(&self) -> EngineDefaults {
        let base = EngineDefaults::default();
        EngineDefaults {
            nominal_length: self.nominal_length.unwrap_or(base.nominal_length),
            nominal_width: self.nominal_width.unwrap_or(base.nominal_width),
            nominal_thickness: self.nominal_thickness.unwrap_or(base.nominal_thickness),
            nominal_fallback: self.nominal_fallback.unwrap_or(base.nominal_fallback),
        }
    }
}

fn env_number(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value > 0.0 => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "ignoring invalid nominal dimension");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults_from_empty_config() {
        let config = Config::default();
        assert_eq!(config.engine_defaults(), EngineDefaults::default());
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut config: Config = serde_yml::from_str("nominal_length: 300\nauthor: lab").unwrap();
        let project: Config = serde_yml::from_str("nominal_length: 400\nnominal_fallback: false").unwrap();
        config.merge(project);

        assert_eq!(config.author.as_deref(), Some("lab"));
        let defaults = config.engine_defaults();
        assert_eq!(defaults.nominal_length, 400.0);
        assert_eq!(defaults.nominal_width, 200.0);
        assert!(!defaults.nominal_fallback);
    }

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "nominal_thickness: 8.5\n").unwrap();

        let config = Config::read_file(&project.config_path()).unwrap();
        assert_eq!(config.nominal_thickness, Some(8.5));
    }

    #[test]
    fn test_invalid_config_file_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "nominal_length: [not, a, number]\n").unwrap();
        assert!(Config::read_file(&path).is_none());
    }
}
