//! Per-run analysis configuration.
//!
//! ```toml
//! confidence_threshold = 0.7
//! timeout_ms = 2000
//! enabled_stages = ["interpret", "clauses", "sentiment"]
//! reference_date = "2026-10-16"
//!
//! [sovereignty]
//! servility_weight = 0.6
//! alignment_weight = 0.4
//! ```
//!
//! Missing keys take their defaults. Environment overrides are applied with
//! [`AnalysisConfig::apply_overrides`], which takes the pairs explicitly.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use verobrix::DEFAULT_MAX_INPUT_BYTES;
use verobrix_scoring::SovereigntyRubric;

use crate::errors::{ConfigResult, ConfigurationError};
use crate::stage::Stage;

pub const ENV_CONFIDENCE_THRESHOLD: &str = "VEROBRIX_CONFIDENCE_THRESHOLD";
pub const ENV_TIMEOUT_MS: &str = "VEROBRIX_TIMEOUT_MS";
pub const ENV_ENABLED_STAGES: &str = "VEROBRIX_ENABLED_STAGES";

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const MAX_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Contradictions below this confidence are dropped
    pub confidence_threshold: f64,
    /// Budget for each analyzer call
    pub timeout_ms: u64,
    pub enabled_stages: BTreeSet<Stage>,
    pub max_input_bytes: usize,
    /// "Today" for dated deadlines of documents built by
    /// [`Orchestrator::analyze`](crate::Orchestrator::analyze)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    pub sovereignty: SovereigntyRubric,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            enabled_stages: Stage::ALL.into_iter().collect(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            reference_date: None,
            sovereignty: SovereigntyRubric::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigurationError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with the process environment's overrides applied.
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self::default().apply_overrides(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        self.enabled_stages.contains(&stage)
    }

    /// Apply `VEROBRIX_*` overrides from `pairs`. Other keys are ignored.
    ///
    /// The result is not validated; call [`validate`](Self::validate) after
    /// the last override.
    pub fn apply_overrides<I, K, V>(mut self, pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let invalid = |message: String| ConfigurationError::Override {
                key: key.to_string(),
                value: value.to_string(),
                message,
            };
            match key {
                ENV_CONFIDENCE_THRESHOLD => {
                    self.confidence_threshold =
                        value.parse().map_err(|e| invalid(format!("{}", e)))?;
                }
                ENV_TIMEOUT_MS => {
                    self.timeout_ms = value.parse().map_err(|e| invalid(format!("{}", e)))?;
                }
                ENV_ENABLED_STAGES => {
                    self.enabled_stages = value
                        .split(',')
                        .filter(|name| !name.trim().is_empty())
                        .map(str::parse)
                        .collect::<Result<_, _>>()
                        .map_err(invalid)?;
                }
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.confidence_threshold.is_finite() || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(ConfigurationError::Invalid {
                key: "confidence_threshold",
                message: format!("{} is not in [0, 1]", self.confidence_threshold),
            });
        }
        if !(1..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigurationError::Invalid {
                key: "timeout_ms",
                message: format!("{} is not in 1..={}", self.timeout_ms, MAX_TIMEOUT_MS),
            });
        }
        if !self.is_enabled(Stage::Interpret) {
            return Err(ConfigurationError::Invalid {
                key: "enabled_stages",
                message: "the interpret stage cannot be disabled".to_string(),
            });
        }
        if self.max_input_bytes == 0 {
            return Err(ConfigurationError::Invalid {
                key: "max_input_bytes",
                message: "must be greater than zero".to_string(),
            });
        }
        self.sovereignty
            .validate()
            .map_err(|e| ConfigurationError::Invalid {
                key: "sovereignty",
                message: e.to_string(),
            })
    }
}
