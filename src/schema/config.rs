//! Configuration types for the simulation driver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{SearchConfig, SearchConfigError};

/// What the driver does when the next rule is not ready at switch time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchPolicy {
    /// Block until the pending search finishes.
    #[default]
    Block,
    /// Keep stepping with the current rule and retry on the next tick.
    Defer,
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Probability that a cell starts alive when the grid is (re)seeded.
    pub fill_ratio: f64,
    /// Generations each rule stays active before switching.
    pub generations_per_rule: u64,
    /// Behaviour when the next rule is late.
    #[serde(default)]
    pub switch_policy: SwitchPolicy,
    /// Generate a fresh palette whenever the rule switches.
    #[serde(default = "default_true")]
    pub refresh_palette_on_switch: bool,
    /// Reseed the grid when every cell has died.
    #[serde(default = "default_true")]
    pub reseed_on_extinction: bool,
    /// Prepare the next rule on a worker thread while the current one runs.
    #[serde(default = "default_true")]
    pub background_search: bool,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Rule search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 150,
            fill_ratio: 0.3,
            generations_per_rule: 1000,
            switch_policy: SwitchPolicy::default(),
            refresh_palette_on_switch: true,
            reseed_on_extinction: true,
            background_search: true,
            random_seed: None,
            search: SearchConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(0.0..=1.0).contains(&self.fill_ratio) {
            return Err(ConfigError::InvalidFillRatio(self.fill_ratio));
        }
        if self.generations_per_rule == 0 {
            return Err(ConfigError::InvalidGenerationsPerRule);
        }
        self.search.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Fill ratio must be within [0, 1], got {0}")]
    InvalidFillRatio(f64),
    #[error("Generations per rule must be non-zero")]
    InvalidGenerationsPerRule,
    #[error("Search config validation failed: {0}")]
    Search(#[from] SearchConfigError),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        let config = SimulationConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_invalid_fill_ratio() {
        for fill_ratio in [-0.1, 1.01, f64::NAN] {
            let config = SimulationConfig {
                fill_ratio,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidFillRatio(_))
            ));
        }
    }

    #[test]
    fn test_nested_search_error() {
        let mut config = SimulationConfig::default();
        config.search.batch_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Search(_))));
    }

    #[test]
    fn test_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.grid_size(), config.grid_size());
        assert_eq!(parsed.search, config.search);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("life.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"width": 64, "height": 48, "fill_ratio": 0.25, "generations_per_rule": 300,
               "switch_policy": "Defer", "random_seed": 7}}"#
        )
        .unwrap();

        let config = SimulationConfig::load(&path).unwrap();
        assert_eq!(config.grid_size(), 64 * 48);
        assert_eq!(config.switch_policy, SwitchPolicy::Defer);
        assert_eq!(config.random_seed, Some(7));
        assert!(config.reseed_on_extinction);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SimulationConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
