use crate::{
    error::{CdrError, CdrResult},
    types::Year,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationConfig {
    /// Lower bound of the subscriber count. The upper bound is
    /// `min_count * max_multiplier`.
    pub min_count: u64,
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: u64,
}

fn default_max_multiplier() -> u64 {
    10
}

impl PopulationConfig {
    pub fn max_count(&self) -> u64 {
        self.min_count.saturating_mul(self.max_multiplier)
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            min_count: 10,
            max_multiplier: default_max_multiplier(),
        }
    }
}

/// Upper bound for `max_call_duration_secs`: the length of the longest month.
pub const MAX_CALL_DURATION_LIMIT_SECS: u64 = 31 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrafficConfig {
    /// Closed interval the per-month attempt ceiling is drawn from.
    pub calls_min: u64,
    pub calls_max: u64,
    /// Longest possible call. Durations are drawn from [1, max].
    pub max_call_duration_secs: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            calls_min: 20,
            calls_max: 1000,
            max_call_duration_secs: 3600,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> CdrResult<()> {
        if self.calls_min > self.calls_max {
            return Err(CdrError::InvalidRange {
                name: "calls per month",
                min: self.calls_min,
                max: self.calls_max,
            });
        }
        if self.max_call_duration_secs == 0 {
            return Err(CdrError::InvalidRange {
                name: "call duration",
                min: 1,
                max: 0,
            });
        }
        if self.max_call_duration_secs > MAX_CALL_DURATION_LIMIT_SECS {
            return Err(CdrError::AboveLimit {
                name: "max call duration (s)",
                value: self.max_call_duration_secs,
                limit: MAX_CALL_DURATION_LIMIT_SECS,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default = "default_year")]
    pub year: Year,
    /// Master seed. None means "derive one at startup".
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub traffic: TrafficConfig,
    #[serde(default = "default_cdr_dir")]
    pub cdr_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

fn default_year() -> Year {
    2024
}

fn default_cdr_dir() -> PathBuf {
    PathBuf::from("cdr_files")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            seed: None,
            population: PopulationConfig::default(),
            traffic: TrafficConfig::default(),
            cdr_dir: default_cdr_dir(),
            report_dir: default_report_dir(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON config file. Missing sections fall back to defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CdrResult<()> {
        if self.population.min_count == 0 {
            return Err(CdrError::EmptyPopulation);
        }
        if self.population.max_multiplier == 0 {
            return Err(CdrError::InvalidRange {
                name: "subscriber count",
                min: self.population.min_count,
                max: 0,
            });
        }
        self.traffic.validate()
    }

    /// Config with small hardcoded values for use in tests.
    pub fn default_test() -> Self {
        Self {
            year: 2024,
            seed: Some(42),
            population: PopulationConfig {
                min_count: 5,
                max_multiplier: 2,
            },
            traffic: TrafficConfig {
                calls_min: 20,
                calls_max: 120,
                max_call_duration_secs: 3600,
            },
            cdr_dir: default_cdr_dir(),
            report_dir: default_report_dir(),
        }
    }
}
