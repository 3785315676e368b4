use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::ConfigError;
use super::extractor::FieldNaming;
use super::geometry::TilingStrategy;
use super::locator::LocateStrategy;
use super::render::OutputFormat;

/// Structure representing the application configuration. Contains pathing, geometry and store
/// layout information.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub noise_path: Option<PathBuf>,
    pub geometry_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub output_format: OutputFormat,
    pub tiling: TilingStrategy,
    pub locate_strategy: LocateStrategy,
    pub event_table: String,
    pub event_id_field: String,
    pub fields: FieldNaming,
    pub z_range: Option<(f64, f64)>,
}

impl Default for Config {
    /// Generate a new Config object. Uses the sequential layout, the bundled geometry, and the
    /// calibration file fers_noises.json in the working directory
    fn default() -> Self {
        Self {
            noise_path: Some(PathBuf::from(DEFAULT_NOISE_FILE)),
            geometry_path: None,
            output_path: PathBuf::from("."),
            output_format: OutputFormat::default(),
            tiling: TilingStrategy::sequential(),
            locate_strategy: LocateStrategy::default(),
            event_table: String::from(DEFAULT_EVENT_TABLE),
            event_id_field: String::from(DEFAULT_EVENT_ID_FIELD),
            fields: FieldNaming::default(),
            z_range: Some((DEFAULT_Z_MIN, DEFAULT_Z_MAX)),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        std::fs::write(config_path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Get the path to the output artifact for an event
    pub fn get_output_file_name(&self, event: i64, extension: &str) -> Result<PathBuf, ConfigError> {
        if self.output_path.is_dir() {
            Ok(self
                .output_path
                .join(format!("event_display_{event}.{extension}")))
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }

    pub fn has_noise_path(&self) -> bool {
        self.noise_path.is_some()
    }
}
