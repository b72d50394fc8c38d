//! Selection configuration.
//!
//! A [`SelectionConfig`] is an immutable value handed to every selection
//! call. Presets replace module-level constants so that several
//! configurations can be used side by side (e.g. A/B comparisons).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default recency decay applied to reference history entries.
const DEFAULT_TIME_DECAY: f64 = 0.85;

/// Errors that can occur while building or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terms that contribute to the composite score.
///
/// Lower-is-better metrics appear in their inverted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTerm {
    Novelty,
    #[serde(alias = "rho")]
    MeaningDensity,
    #[serde(alias = "sigma")]
    Recombinability,
    /// `1 - normalized distance`.
    #[serde(alias = "d")]
    Reachability,
    #[serde(alias = "gamma")]
    Resonance,
    /// `1 - normalized description length`.
    #[serde(alias = "lambda")]
    Simplicity,
    #[serde(alias = "beta")]
    AestheticAlignment,
    #[serde(alias = "M")]
    Binding,
}

impl ScoreTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTerm::Novelty => "novelty",
            ScoreTerm::MeaningDensity => "meaning_density",
            ScoreTerm::Recombinability => "recombinability",
            ScoreTerm::Reachability => "reachability",
            ScoreTerm::Resonance => "resonance",
            ScoreTerm::Simplicity => "simplicity",
            ScoreTerm::AestheticAlignment => "aesthetic_alignment",
            ScoreTerm::Binding => "binding",
        }
    }
}

impl fmt::Display for ScoreTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-negative weight per score term. Missing terms weigh 0.
///
/// Weights are used as given; they are never rescaled to sum to 1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricWeights(BTreeMap<ScoreTerm, f64>);

impl MetricWeights {
    /// Creates an empty weight set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight of a term.
    pub fn with(mut self, term: ScoreTerm, weight: f64) -> Self {
        self.0.insert(term, weight);
        self
    }

    /// Returns the weight of a term, 0 when unset.
    pub fn get(&self, term: ScoreTerm) -> f64 {
        self.0.get(&term).copied().unwrap_or(0.0)
    }

    /// Iterates over the configured terms in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (ScoreTerm, f64)> + '_ {
        self.0.iter().map(|(term, weight)| (*term, *weight))
    }

    /// Sum of all weights; the upper bound of a composite score.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(ScoreTerm, f64)> for MetricWeights {
    fn from_iter<T: IntoIterator<Item = (ScoreTerm, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Hard thresholds on normalized metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardConstraints {
    /// Minimum normalized aesthetic alignment.
    pub beta_min: f64,
    /// Minimum normalized resonance.
    pub gamma_min: f64,
    /// Maximum normalized phase difference.
    pub phi_tol: f64,
}

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Creativity-first weighting with a novelty-leaning MMR balance.
    #[default]
    CreativeMax,
    /// Same weights as `CreativeMax` with a stronger diversity penalty.
    Balanced,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "creative-max" | "creative" => Ok(Preset::CreativeMax),
            "balanced" => Ok(Preset::Balanced),
            other => Err(ConfigError::InvalidValue {
                key: "preset".to_string(),
                message: format!("unknown preset '{}'", other),
            }),
        }
    }
}

/// Configuration for one selection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Weights of the composite score terms.
    pub weights: MetricWeights,
    /// Hard-constraint thresholds.
    #[serde(alias = "hard_constraints")]
    pub constraints: HardConstraints,
    /// MMR balance in [0, 1]: 1 ranks purely by score, 0 purely by dissimilarity.
    pub diversity_alpha: f64,
    /// Multiplier applied to exception candidates (> 1).
    pub exception_boost: f64,
    /// Target selection size.
    #[serde(alias = "K")]
    pub k: usize,
    /// Per-generation decay of reference history weights, in (0, 1].
    #[serde(default = "default_time_decay")]
    pub time_decay: f64,
}

fn default_time_decay() -> f64 {
    DEFAULT_TIME_DECAY
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::preset(Preset::CreativeMax)
    }
}

impl SelectionConfig {
    /// Creates a configuration from a named preset.
    pub fn preset(preset: Preset) -> Self {
        let weights = MetricWeights::new()
            .with(ScoreTerm::Novelty, 0.25)
            .with(ScoreTerm::MeaningDensity, 0.20)
            .with(ScoreTerm::Recombinability, 0.15)
            .with(ScoreTerm::Reachability, 0.10)
            .with(ScoreTerm::Resonance, 0.10)
            .with(ScoreTerm::Simplicity, 0.10)
            .with(ScoreTerm::AestheticAlignment, 0.05)
            .with(ScoreTerm::Binding, 0.05);

        let diversity_alpha = match preset {
            Preset::CreativeMax => 0.65,
            Preset::Balanced => 0.40,
        };

        Self {
            weights,
            constraints: HardConstraints {
                beta_min: 0.35,
                gamma_min: 0.30,
                phi_tol: 0.65,
            },
            diversity_alpha,
            exception_boost: 1.35,
            k: 5,
            time_decay: DEFAULT_TIME_DECAY,
        }
    }

    /// Loads and validates a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from a preset overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SELECT_K`: Target selection size
    /// - `SELECT_DIVERSITY_ALPHA`: MMR balance coefficient
    /// - `SELECT_EXCEPTION_BOOST`: Exception boost multiplier
    /// - `SELECT_BETA_MIN`: Minimum aesthetic alignment
    /// - `SELECT_GAMMA_MIN`: Minimum resonance
    /// - `SELECT_PHI_TOL`: Maximum phase difference
    /// - `SELECT_TIME_DECAY`: Reference history decay
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the result is invalid.
    pub fn from_env(preset: Preset) -> Result<Self, ConfigError> {
        Self::preset(preset).with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a key lookup and validates the result.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SELECT_K") {
            let k: i64 = parse_env_value(&val, "SELECT_K")?;
            if k <= 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "k must be greater than 0, got {}",
                    k
                )));
            }
            self.k = k as usize;
        }

        if let Some(val) = lookup("SELECT_DIVERSITY_ALPHA") {
            self.diversity_alpha = parse_env_value(&val, "SELECT_DIVERSITY_ALPHA")?;
        }

        if let Some(val) = lookup("SELECT_EXCEPTION_BOOST") {
            self.exception_boost = parse_env_value(&val, "SELECT_EXCEPTION_BOOST")?;
        }

        if let Some(val) = lookup("SELECT_BETA_MIN") {
            self.constraints.beta_min = parse_env_value(&val, "SELECT_BETA_MIN")?;
        }

        if let Some(val) = lookup("SELECT_GAMMA_MIN") {
            self.constraints.gamma_min = parse_env_value(&val, "SELECT_GAMMA_MIN")?;
        }

        if let Some(val) = lookup("SELECT_PHI_TOL") {
            self.constraints.phi_tol = parse_env_value(&val, "SELECT_PHI_TOL")?;
        }

        if let Some(val) = lookup("SELECT_TIME_DECAY") {
            self.time_decay = parse_env_value(&val, "SELECT_TIME_DECAY")?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::ValidationFailed(
                "k must be greater than 0".to_string(),
            ));
        }

        for (term, weight) in self.weights.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    term, weight
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.constraints.beta_min) {
            return Err(ConfigError::ValidationFailed(
                "beta_min must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.constraints.gamma_min) {
            return Err(ConfigError::ValidationFailed(
                "gamma_min must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !self.constraints.phi_tol.is_finite() || self.constraints.phi_tol < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "phi_tol must be a non-negative number".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.diversity_alpha) {
            return Err(ConfigError::ValidationFailed(
                "diversity_alpha must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !self.exception_boost.is_finite() || self.exception_boost <= 1.0 {
            return Err(ConfigError::ValidationFailed(
                "exception_boost must be greater than 1.0".to_string(),
            ));
        }

        if !(self.time_decay > 0.0 && self.time_decay <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "time_decay must be in (0.0, 1.0]".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the target selection size.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Builder method to set the MMR balance coefficient.
    pub fn with_diversity_alpha(mut self, alpha: f64) -> Self {
        self.diversity_alpha = alpha;
        self
    }

    /// Builder method to set the exception boost multiplier.
    pub fn with_exception_boost(mut self, boost: f64) -> Self {
        self.exception_boost = boost;
        self
    }

    /// Builder method to replace the weight set.
    pub fn with_weights(mut self, weights: MetricWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builder method to replace the hard constraints.
    pub fn with_constraints(mut self, constraints: HardConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Builder method to set the reference history decay.
    pub fn with_time_decay(mut self, decay: f64) -> Self {
        self.time_decay = decay;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
