use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::tracker::{GeoPosition, HeadingMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub feed: Option<FeedConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub web: Option<WebConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    #[default]
    Live,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    #[serde(default = "default_seconds_per_query")]
    pub seconds_per_query: u32,
    #[serde(default = "default_seconds_per_cleanup")]
    pub seconds_per_cleanup: u32,
    /// Defaults to `seconds_per_cleanup`.
    pub stale_after_seconds: Option<i64>,
    /// Half-extent of the query box, degrees.
    #[serde(default = "default_coordinate_tolerance")]
    pub coordinate_tolerance: f64,
    #[serde(default)]
    pub mode: DataMode,
    #[serde(default)]
    pub heading_mode: HeadingMode,
    /// Initial location, as if pushed by a location source at startup.
    pub center: Option<GeoPosition>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
            seconds_per_query: default_seconds_per_query(),
            seconds_per_cleanup: default_seconds_per_cleanup(),
            stale_after_seconds: None,
            coordinate_tolerance: default_coordinate_tolerance(),
            mode: DataMode::default(),
            heading_mode: HeadingMode::default(),
            center: None,
        }
    }
}

impl TrackerConfig {
    pub fn stale_after_seconds(&self) -> i64 {
        self.stale_after_seconds
            .unwrap_or(i64::from(self.seconds_per_cleanup))
    }
}

fn default_ticks_per_second() -> u32 {
    60
}

fn default_seconds_per_query() -> u32 {
    10
}

fn default_seconds_per_cleanup() -> u32 {
    30
}

fn default_coordinate_tolerance() -> f64 {
    0.25
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    "https://opensky-network.org/api/states/all".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_simulation_count")]
    pub count: usize,
    #[serde(default = "default_speed_up")]
    pub speed_up: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            count: default_simulation_count(),
            speed_up: default_speed_up(),
            seed: None,
        }
    }
}

fn default_simulation_count() -> usize {
    20
}

fn default_speed_up() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.into()));
        let t = &self.tracker;

        if t.ticks_per_second == 0 {
            return invalid("ticks_per_second must be positive");
        }
        if t.seconds_per_query == 0 || t.seconds_per_cleanup == 0 {
            return invalid("seconds_per_query and seconds_per_cleanup must be positive");
        }
        if !(t.coordinate_tolerance.is_finite() && t.coordinate_tolerance > 0.0) {
            return invalid("coordinate_tolerance must be a positive number");
        }
        if t.stale_after_seconds() < 0 {
            return invalid("stale_after_seconds must not be negative");
        }
        if t.mode == DataMode::Live && self.feed.is_none() {
            return invalid("live mode needs a 'feed' section");
        }
        if !(self.simulation.speed_up.is_finite() && self.simulation.speed_up > 0.0) {
            return invalid("simulation.speed_up must be a positive number");
        }
        Ok(())
    }
}
