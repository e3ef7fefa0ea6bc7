use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::scales::{
    BAR_PERCENT_SCALE, COLOR_MEAN_MULTIPLIER, RADIUS_PX_MAX, RADIUS_PX_MIN,
    SCATTER_X_PADDING_HIGH, SCATTER_X_PADDING_LOW, SCATTER_Y_PADDING_HIGH,
    SCATTER_Y_PADDING_LOW,
};
use crate::errors::SurveyError;

/// Padding factors multiplied into the scatterplot axis extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterPadding {
    /// Factor applied to the smallest average-years value.
    pub x_low: f64,
    /// Factor applied to the largest average-years value.
    pub x_high: f64,
    /// Factor applied to the smallest median compensation.
    pub y_low: f64,
    /// Factor applied to the largest median compensation.
    pub y_high: f64,
}

impl Default for ScatterPadding {
    fn default() -> Self {
        Self {
            x_low: SCATTER_X_PADDING_LOW,
            x_high: SCATTER_X_PADDING_HIGH,
            y_low: SCATTER_Y_PADDING_LOW,
            y_high: SCATTER_Y_PADDING_HIGH,
        }
    }
}

/// How respondent counts map onto bubble radii.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusScale {
    /// Radius grows linearly with the respondent count.
    #[default]
    Linear,
    /// Radius grows with the logarithm of the respondent count.
    ///
    /// Groups with zero respondents are left out of the domain so its lower
    /// bound stays strictly positive.
    Log,
}

/// Top-level configuration for the built-in view models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Padding for the scatterplot axes.
    pub scatter_padding: ScatterPadding,
    /// Radius scale used by the scatterplot bubbles.
    pub radius_scale: RadiusScale,
    /// Smallest bubble radius in pixels.
    pub radius_px_min: f64,
    /// Largest bubble radius in pixels.
    pub radius_px_max: f64,
    /// Multiplier applied to the mean median compensation to cap the map colour domain.
    pub color_mean_multiplier: f64,
    /// Scale for bar heights (100 means percent of filtered respondents).
    pub bar_percent_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scatter_padding: ScatterPadding::default(),
            radius_scale: RadiusScale::default(),
            radius_px_min: RADIUS_PX_MIN,
            radius_px_max: RADIUS_PX_MAX,
            color_mean_multiplier: COLOR_MEAN_MULTIPLIER,
            bar_percent_scale: BAR_PERCENT_SCALE,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file; missing keys fall back to defaults.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, SurveyError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        config.validated()
    }

    /// Reject configurations that cannot drive a scale.
    pub fn validated(self) -> Result<Self, SurveyError> {
        if !(self.radius_px_min >= 0.0 && self.radius_px_min <= self.radius_px_max) {
            return Err(SurveyError::Configuration(format!(
                "radius range {}..{} must be non-negative and ordered",
                self.radius_px_min, self.radius_px_max
            )));
        }
        let padding = &self.scatter_padding;
        if [padding.x_low, padding.x_high, padding.y_low, padding.y_high]
            .iter()
            .any(|factor| !factor.is_finite() || *factor <= 0.0)
        {
            return Err(SurveyError::Configuration(
                "scatter padding factors must be positive".to_string(),
            ));
        }
        if !(self.color_mean_multiplier.is_finite() && self.color_mean_multiplier > 0.0) {
            return Err(SurveyError::Configuration(
                "color mean multiplier must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"radius_scale": "log", "scatter_padding": {"y_high": 1.5}}"#)
                .unwrap();
        assert_eq!(config.radius_scale, RadiusScale::Log);
        assert_eq!(config.scatter_padding.y_high, 1.5);
        assert_eq!(config.scatter_padding.x_low, SCATTER_X_PADDING_LOW);
        assert_eq!(config.radius_px_max, RADIUS_PX_MAX);
    }

    #[test]
    fn validated_rejects_inverted_radius_range() {
        let config = PipelineConfig {
            radius_px_min: 20.0,
            radius_px_max: 5.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validated(),
            Err(SurveyError::Configuration(_))
        ));
    }

    #[test]
    fn from_json_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"color_mean_multiplier": 3.0}"#).unwrap();
        let config = PipelineConfig::from_json_path(&path).unwrap();
        assert_eq!(config.color_mean_multiplier, 3.0);
        assert_eq!(config.radius_scale, RadiusScale::Linear);
    }
}
