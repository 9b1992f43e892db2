//! Analysis defaults configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::Orientation;
use crate::domain::pricing::{DEFAULT_AHP_VARIATION, DEFAULT_TOPSIS_VARIATION};

/// Default parameters for the built-in analyses
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Relative perturbation of AHP judgments in sensitivity runs
    #[serde(default = "default_ahp_variation")]
    pub ahp_variation: f64,

    /// Relative perturbation of TOPSIS criterion weights in sensitivity runs
    #[serde(default = "default_topsis_variation")]
    pub topsis_variation: f64,

    /// DEA orientation for plan efficiency
    #[serde(default)]
    pub dea_orientation: Orientation,
}

impl AnalysisConfig {
    /// Validate analysis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_variation("ahp_variation", self.ahp_variation)?;
        check_variation("topsis_variation", self.topsis_variation)?;
        Ok(())
    }
}

fn check_variation(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidVariation { field, value })
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ahp_variation: default_ahp_variation(),
            topsis_variation: default_topsis_variation(),
            dea_orientation: Orientation::default(),
        }
    }
}

fn default_ahp_variation() -> f64 {
    DEFAULT_AHP_VARIATION
}

fn default_topsis_variation() -> f64 {
    DEFAULT_TOPSIS_VARIATION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ahp_variation, 0.25);
        assert_eq!(config.topsis_variation, 0.10);
        assert_eq!(config.dea_orientation, Orientation::Output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_match_pricing_models() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ahp_variation, DEFAULT_AHP_VARIATION);
        assert_eq!(config.topsis_variation, DEFAULT_TOPSIS_VARIATION);
    }

    #[test]
    fn test_variation_bounds() {
        for bad in [0.0, 1.0, -0.2, f64::NAN] {
            let config = AnalysisConfig {
                ahp_variation: bad,
                ..AnalysisConfig::default()
            };
            assert!(config.validate().is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_orientation_deserialization() {
        let json = r#"{ "dea_orientation": "input", "topsis_variation": 0.2 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.dea_orientation, Orientation::Input);
        assert_eq!(config.topsis_variation, 0.2);
        assert_eq!(config.ahp_variation, 0.25);
    }
}
