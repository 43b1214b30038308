use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `RIVERFLOW__CORRELATION_WINDOW=60`
pub const ENV_PREFIX: &str = "RIVERFLOW";

/// Indicator pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exponent applied to the spread magnitude
    pub power: f64,
    /// Pressure decay factor, 0 < ratio < 1
    pub ratio: f64,
    /// Window for the pressure EMA and closeness SMA
    pub smoothing_window: usize,
    pub band_window: usize,
    /// Standard deviations between mid and outer band
    pub band_width: f64,
    pub correlation_window: usize,
    /// Also compute the whole-history `cor` column (O(N^2))
    pub expanding_correlation: bool,
    /// Also compute the running mean `closeness_avg`
    pub closeness_avg: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            power: 1.0,
            ratio: 0.96,
            smoothing_window: 5,
            band_window: 5,
            band_width: 2.0,
            correlation_window: 40,
            expanding_correlation: false,
            closeness_avg: false,
        }
    }
}

impl PipelineConfig {
    /// Layer an optional config file and environment overrides over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let cfg: PipelineConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        tracing::debug!("Loaded pipeline config: {:?}", cfg);
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("smoothing", self.smoothing_window),
            ("band", self.band_window),
            ("correlation", self.correlation_window),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWindow { name, value });
            }
        }

        if !(self.ratio > 0.0 && self.ratio < 1.0) {
            return Err(ConfigError::InvalidRatio(self.ratio));
        }
        if !(self.power > 0.0) {
            return Err(ConfigError::InvalidPower(self.power));
        }
        if !(self.band_width >= 0.0) {
            return Err(ConfigError::InvalidBandWidth(self.band_width));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = PipelineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.correlation_window, 40);
        assert_eq!(cfg.ratio, 0.96);
    }

    #[test]
    fn test_rejects_zero_window() {
        let cfg = PipelineConfig {
            band_window: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroWindow { name: "band", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_ratio() {
        for ratio in [0.0, 1.0, -0.5, f64::NAN] {
            let cfg = PipelineConfig {
                ratio,
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidRatio(_))));
        }
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("riverflow-config-{}.toml", std::process::id()));
        std::fs::write(&path, "correlation_window = 60\nexpanding_correlation = true\n").unwrap();

        let cfg = PipelineConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.correlation_window, 60);
        assert!(cfg.expanding_correlation);
        // Untouched keys keep their defaults
        assert_eq!(cfg.smoothing_window, 5);
    }

    #[test]
    fn test_load_reads_environment_overrides() {
        // Same value as the file test above, so the two can run concurrently
        std::env::set_var("RIVERFLOW__CORRELATION_WINDOW", "60");
        let result = PipelineConfig::load(None);
        std::env::remove_var("RIVERFLOW__CORRELATION_WINDOW");

        let cfg = result.unwrap();
        assert_eq!(cfg.correlation_window, 60);
        assert_eq!(cfg.band_window, 5);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let path = std::env::temp_dir().join(format!("riverflow-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "ratio = 1.5\n").unwrap();

        let result = PipelineConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::InvalidRatio(_))));
    }
}
