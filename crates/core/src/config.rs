//! Configuration management for HikePal.
//!
//! Every section has defaults, so a TOML file only needs the keys it
//! overrides. The defaults reproduce the Dragon's Back demo setup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::track::DistanceMethod;
use crate::types::{Coordinate, Teammate};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub annotations: AnnotationConfig,
    pub recording: RecordingConfig,
    pub safety: SafetyConfig,
    pub logging: LoggingConfig,
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Period of both the position loop and the session clock
    pub tick_interval_ms: u64,
    pub start_latitude: f64,
    pub start_longitude: f64,
    /// Fixed RNG seed for reproducible walks; random when absent
    pub seed: Option<u64>,
    pub teammates: Vec<RosterEntry>,
}

/// One teammate in the starting roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// JSON file with `facilities` and `risk_zones` arrays
    pub source_path: Option<PathBuf>,
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub distance_method: DistanceSetting,
    pub default_track_name: String,
}

/// Config-file spelling of [`DistanceMethod`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSetting {
    #[default]
    Approximate,
    Haversine,
}

impl From<DistanceSetting> for DistanceMethod {
    fn from(setting: DistanceSetting) -> Self {
        match setting {
            DistanceSetting::Approximate => DistanceMethod::Approximate,
            DistanceSetting::Haversine => DistanceMethod::Haversine,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub emergency_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            start_latitude: 22.2225,
            start_longitude: 114.2415,
            seed: None,
            teammates: vec![
                RosterEntry {
                    id: "t1".to_string(),
                    name: "Alice".to_string(),
                    latitude: 22.228,
                    longitude: 114.242,
                },
                RosterEntry {
                    id: "t2".to_string(),
                    name: "Bob".to_string(),
                    latitude: 22.227,
                    longitude: 114.2415,
                },
            ],
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            distance_method: DistanceSetting::Approximate,
            default_track_name: "My Hike".to_string(),
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            emergency_number: "999".to_string(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./hikepal-data"),
        }
    }
}

impl SimulationConfig {
    /// Starting user coordinate
    pub fn start_coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.start_latitude, self.start_longitude)
    }

    /// Build the teammate roster
    pub fn roster(&self) -> Result<Vec<Teammate>> {
        self.teammates
            .iter()
            .map(|entry| {
                let position = Coordinate::new(entry.latitude, entry.longitude)?;
                Ok(Teammate::new(entry.id.clone(), entry.name.clone(), position))
            })
            .collect()
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reject settings the runtime cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.simulation.tick_interval_ms == 0 {
            return Err(CoreError::Config(
                "simulation.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        self.simulation.start_coordinate()?;
        self.simulation.roster()?;

        let mut seen = HashSet::new();
        for entry in &self.simulation.teammates {
            if !seen.insert(entry.id.as_str()) {
                return Err(CoreError::Config(format!(
                    "duplicate teammate id '{}'",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}
