//! TOML-based engine configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cpi::batch::{BatchProcessor, DEFAULT_GRID_INTENSITY};
use crate::cpi::discount::TierSchedule;
use crate::cpi::rewards::RewardPolicy;
use crate::cpi::score::Scoring;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the demo preset. Load from TOML with
/// [`VerdantConfig::from_toml_file`] or use [`VerdantConfig::demo`] for the
/// built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerdantConfig {
    /// Score formula and discount schedule.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Reward savings estimate.
    #[serde(default)]
    pub rewards: RewardsConfig,
    /// Ingestion policy.
    #[serde(default)]
    pub input: InputConfig,
    /// Demo seeder parameters.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Score formula and discount schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// `"plateau"` (default) or `"improvement"`.
    pub strategy: Scoring,
    /// `"current"` (90/70/50, default) or `"legacy"` (90/75/60).
    pub tiers: TierSchedule,
    /// Grid intensity for units with no in-period readings (kg CO₂e/kWh).
    pub default_intensity: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: Scoring::Plateau,
            tiers: TierSchedule::Current,
            default_intensity: DEFAULT_GRID_INTENSITY,
        }
    }
}

/// Reward savings estimate parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardsConfig {
    /// Assumed monthly rent (USD).
    pub monthly_rent_usd: f64,
    /// Months the current discount is assumed to have applied.
    pub months: u32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        let policy = RewardPolicy::default();
        Self {
            monthly_rent_usd: policy.monthly_rent_usd,
            months: policy.months,
        }
    }
}

/// How ingestion treats out-of-range values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Fail on non-finite or negative consumption and intensity.
    #[default]
    Reject,
    /// Accept values unchanged.
    PassThrough,
}

/// Ingestion parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub policy: InputPolicy,
}

/// Demo seeder parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Master random seed.
    pub seed: u64,
    /// Building the roster belongs to.
    pub building_id: String,
    /// Year of the scored billing month.
    pub year: i32,
    /// Scored billing month (1-12). The month before it is also seeded.
    pub month: u32,
    /// Quota as a fraction of baseline (0.0-1.0].
    pub quota_factor: f64,
    /// Lower bound of synthetic daily grid intensity.
    pub intensity_min: f64,
    /// Upper bound of synthetic daily grid intensity.
    pub intensity_max: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            building_id: "bldg_01".to_string(),
            year: 2025,
            month: 2,
            quota_factor: 0.9,
            intensity_min: 0.38,
            intensity_max: 0.46,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"demo.month"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl VerdantConfig {
    /// Returns the demo configuration: plateau scoring, current tiers.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Returns the legacy preset: improvement scoring with 90/75/60 tiers.
    pub fn legacy() -> Self {
        Self {
            scoring: ScoringConfig {
                strategy: Scoring::Improvement,
                tiers: TierSchedule::Legacy,
                ..ScoringConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "legacy"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "legacy" => Ok(Self::legacy()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.scoring;
        if !s.default_intensity.is_finite() || s.default_intensity < 0.0 {
            errors.push(ConfigError {
                field: "scoring.default_intensity".into(),
                message: "must be a finite number >= 0".into(),
            });
        }

        let r = &self.rewards;
        if !r.monthly_rent_usd.is_finite() || r.monthly_rent_usd < 0.0 {
            errors.push(ConfigError {
                field: "rewards.monthly_rent_usd".into(),
                message: "must be a finite number >= 0".into(),
            });
        }

        let d = &self.demo;
        if d.building_id.trim().is_empty() {
            errors.push(ConfigError {
                field: "demo.building_id".into(),
                message: "must not be empty".into(),
            });
        }
        if !(1..=12).contains(&d.month) {
            errors.push(ConfigError {
                field: "demo.month".into(),
                message: format!("must be in [1, 12], got {}", d.month),
            });
        }
        if !(d.quota_factor > 0.0 && d.quota_factor <= 1.0) {
            errors.push(ConfigError {
                field: "demo.quota_factor".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if !(d.intensity_min > 0.0) {
            errors.push(ConfigError {
                field: "demo.intensity_min".into(),
                message: "must be > 0".into(),
            });
        }
        if !(d.intensity_min < d.intensity_max) || !d.intensity_max.is_finite() {
            errors.push(ConfigError {
                field: "demo.intensity_max".into(),
                message: "must be finite and > demo.intensity_min".into(),
            });
        }

        errors
    }

    /// Reward policy described by the `[rewards]` section.
    pub fn reward_policy(&self) -> RewardPolicy {
        RewardPolicy {
            monthly_rent_usd: self.rewards.monthly_rent_usd,
            months: self.rewards.months,
        }
    }

    /// Batch processor described by the `[scoring]` section.
    pub fn processor(&self) -> BatchProcessor<Scoring> {
        BatchProcessor::new(
            self.scoring.strategy,
            self.scoring.tiers,
            self.scoring.default_intensity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::score::ScoringStrategy;

    #[test]
    fn demo_preset_valid() {
        let cfg = VerdantConfig::demo();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = VerdantConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[scoring]
strategy = "improvement"
tiers = "legacy"
default_intensity = 0.4

[rewards]
monthly_rent_usd = 1800.0
months = 6

[input]
policy = "pass_through"

[demo]
seed = 7
building_id = "bldg_02"
year = 2024
month = 11
quota_factor = 0.85
intensity_min = 0.3
intensity_max = 0.5
"#;
        let cfg = VerdantConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.scoring.strategy), Some(Scoring::Improvement));
        assert_eq!(cfg.as_ref().map(|c| c.scoring.tiers), Some(TierSchedule::Legacy));
        assert_eq!(cfg.as_ref().map(|c| c.input.policy), Some(InputPolicy::PassThrough));
        assert_eq!(cfg.as_ref().map(|c| c.demo.month), Some(11));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[scoring]
strategy = "plateau"
bogus_field = true
"#;
        assert!(VerdantConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let toml = r#"
[scoring]
strategy = "linear"
"#;
        assert!(VerdantConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_month() {
        let mut cfg = VerdantConfig::demo();
        cfg.demo.month = 13;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.month"));
    }

    #[test]
    fn validation_catches_inverted_intensity_range() {
        let mut cfg = VerdantConfig::demo();
        cfg.demo.intensity_min = 0.5;
        cfg.demo.intensity_max = 0.4;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.intensity_max"));
    }

    #[test]
    fn validation_reports_every_error() {
        let mut cfg = VerdantConfig::demo();
        cfg.scoring.default_intensity = f64::NAN;
        cfg.rewards.monthly_rent_usd = -1.0;
        cfg.demo.quota_factor = 0.0;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in VerdantConfig::PRESETS {
            let cfg = VerdantConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn legacy_preset_selects_improvement_formula() {
        let cfg = VerdantConfig::legacy();
        let processor = cfg.processor();
        assert_eq!(processor.strategy().name(), "improvement");
        assert_eq!(processor.tiers(), TierSchedule::Legacy);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[demo]
seed = 99
"#;
        let cfg = VerdantConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.demo.seed), Some(99));
        // month kept default
        assert_eq!(cfg.as_ref().map(|c| c.demo.month), Some(2));
        // rewards kept default
        assert_eq!(cfg.as_ref().map(|c| c.reward_policy().months), Some(3));
    }
}
