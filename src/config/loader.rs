// src/config/loader.rs
//! Layered configuration loading
//!
//! Defaults, then optional TOML files in order, then `GLUCOSE_`-prefixed
//! environment overrides. Missing files are skipped; malformed ones fail.

use crate::config::{validate_meal_window_config, MealWindowConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(String),
    ParseError(String),
    ValidationError(String),
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Configuration parse error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
            ConfigError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Environment variable prefix for overrides, e.g.
/// `GLUCOSE_POST_MINUTES=240`.
const ENV_PREFIX: &str = "GLUCOSE_";

/// Loads and merges meal-window configuration.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Loader with no file layers; defaults plus environment only.
    pub fn new() -> Self {
        Self {
            config_paths: Vec::new(),
        }
    }

    /// Loader merging the given TOML files in order. Later files win.
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
        }
    }

    /// Load, merge, and validate the configuration.
    pub fn load(&self) -> Result<MealWindowConfig, ConfigError> {
        let mut merged = toml::Value::try_from(MealWindowConfig::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for path in &self.config_paths {
            if !path.exists() {
                debug!(path = %path.display(), "config file missing, skipping layer");
                continue;
            }
            let layer = Self::load_file(path)?;
            Self::merge(&mut merged, layer);
        }

        Self::apply_environment_overrides(&mut merged);

        let config: MealWindowConfig = merged
            .try_into()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate_meal_window_config(&config).map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Validate a single file without merging it into a run config.
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let value = Self::load_file(path.as_ref())?;
        let config: MealWindowConfig = value
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
        validate_meal_window_config(&config).map_err(ConfigError::ValidationError)
    }

    fn load_file(path: &Path) -> Result<toml::Value, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn merge(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(config: &mut toml::Value) {
        let table = match config {
            toml::Value::Table(table) => table,
            _ => return,
        };
        for (key, value) in std::env::vars() {
            if let Some(field) = key.strip_prefix(ENV_PREFIX) {
                let field = field.to_lowercase();
                if !table.contains_key(&field) {
                    continue;
                }
                if let Ok(parsed) = value.parse::<i64>() {
                    debug!(field = %field, value = parsed, "applying environment override");
                    table.insert(field, toml::Value::Integer(parsed));
                }
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults_with_no_layers() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, MealWindowConfig::default());
    }

    #[test]
    fn test_missing_file_layer_is_skipped() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/meal.toml")]);
        assert!(loader.load().is_ok());
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "post_minutes = 240\nslope_minutes = 90").unwrap();

        let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]);
        let config = loader.load().unwrap();
        assert_eq!(config.post_minutes, 240);
        assert_eq!(config.slope_minutes, 90);
        assert_eq!(config.grid_minutes, 5);
    }

    #[test]
    fn test_later_layers_win() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "post_minutes = 240").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "post_minutes = 120").unwrap();

        let loader = ConfigLoader::with_paths(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(loader.load().unwrap().post_minutes, 120);
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "slope_minutes = 999").unwrap();

        let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()]);
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_file() {
        let mut good = NamedTempFile::new().unwrap();
        writeln!(good, "grid_minutes = 1").unwrap();
        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "grid_minutes = 0").unwrap();

        let loader = ConfigLoader::new();
        assert!(loader.validate_file(good.path()).is_ok());
        assert!(loader.validate_file(bad.path()).is_err());
    }
}
