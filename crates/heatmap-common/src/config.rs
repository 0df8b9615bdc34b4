//! Heat map construction configuration.

use crate::error::{HeatmapError, HeatmapResult};
use crate::gradient::{default_gradient, validate_stops, Color, GradientStop};
use crate::point::FieldMapping;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a heat map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Default stamp radius in pixels for points without their own.
    pub radius: u32,

    /// Ordered gradient color stops for the palette.
    pub gradient: Vec<GradientStop>,

    /// Upper clamp for colorized alpha, 0-1.
    pub max_opacity: f64,

    /// Lower clamp for colorized alpha, 0-1.
    pub min_opacity: f64,

    /// Stamp softness in [0, 1]: 0 renders hard-edged discs, higher values
    /// shrink the opaque core and widen the radial fade.
    pub blur: f64,

    /// Fixed output alpha override, 0-1; when set (> 0) it is used verbatim
    /// for every colorized pixel instead of the min/max clamp policy.
    pub opacity: Option<f64>,

    /// Take the output alpha from the palette's own alpha channel instead of
    /// the clamp policy.
    pub use_gradient_opacity: bool,

    /// Which input field feeds each grid axis and the weight.
    pub fields: FieldMapping,

    /// Visible surface width in pixels.
    pub width: u32,

    /// Visible surface height in pixels.
    pub height: u32,

    /// Background fill for the visible surface; transparent when unset.
    pub background_color: Option<Color>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            radius: 40,
            gradient: default_gradient(),
            max_opacity: 1.0,
            min_opacity: 0.0,
            blur: 0.85,
            opacity: None,
            use_gradient_opacity: false,
            fields: FieldMapping::default(),
            width: 512,
            height: 512,
            background_color: None,
        }
    }
}

impl HeatmapConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.radius == 0 {
            return Err(HeatmapError::invalid_config("radius must be > 0"));
        }

        if self.width == 0 || self.height == 0 {
            return Err(HeatmapError::invalid_config(
                "surface dimensions must be > 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.blur) {
            return Err(HeatmapError::invalid_config("blur must be within [0, 1]"));
        }

        for (name, v) in [
            ("max_opacity", self.max_opacity),
            ("min_opacity", self.min_opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(HeatmapError::invalid_config(format!(
                    "{} must be within [0, 1]",
                    name
                )));
            }
        }

        if self.min_opacity > self.max_opacity {
            return Err(HeatmapError::invalid_config(
                "min_opacity must not exceed max_opacity",
            ));
        }

        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(HeatmapError::invalid_config(
                    "opacity must be within [0, 1]",
                ));
            }
        }

        validate_stops(&self.gradient)
    }
}
