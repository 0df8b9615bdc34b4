//! Gradient color stops and color parsing for palette construction.

use crate::error::{HeatmapError, HeatmapResult};
use serde::{Deserialize, Serialize};

/// Color representation supporting multiple input formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB" or "#RRGGBBAA"
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Named color
    Named(String),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn transparent() -> Self {
        Color::Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert to an RGBA tuple.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Hex(s) => parse_hex_color(s),
            Color::Array(arr) => {
                let r = arr.first().copied().unwrap_or(0);
                let g = arr.get(1).copied().unwrap_or(0);
                let b = arr.get(2).copied().unwrap_or(0);
                let a = arr.get(3).copied().unwrap_or(255);
                (r, g, b, a)
            }
            Color::Named(name) => named_color(name),
            Color::Rgba { r, g, b, a } => (*r, *g, *b, *a),
        }
    }
}

fn parse_hex_color(s: &str) -> (u8, u8, u8, u8) {
    let s = s.trim_start_matches('#');

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(0);
        (r, g, b, 255)
    } else if s.len() == 8 {
        let r = u8::from_str_radix(&s[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&s[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&s[4..6], 16).unwrap_or(0);
        let a = u8::from_str_radix(&s[6..8], 16).unwrap_or(255);
        (r, g, b, a)
    } else {
        (0, 0, 0, 255)
    }
}

fn named_color(name: &str) -> (u8, u8, u8, u8) {
    match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" => (0, 255, 255, 255),
        "magenta" => (255, 0, 255, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => (0, 0, 0, 255),
    }
}

/// A color stop on the normalized `[0, 1]` gradient axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position of the stop in `[0, 1]`.
    pub position: f64,

    /// The color at this stop.
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// The stock blue-to-red density gradient.
pub fn default_gradient() -> Vec<GradientStop> {
    vec![
        GradientStop::new(0.25, Color::Named("blue".to_string())),
        GradientStop::new(0.55, Color::Named("green".to_string())),
        GradientStop::new(0.85, Color::Named("yellow".to_string())),
        GradientStop::new(1.0, Color::Named("red".to_string())),
    ]
}

/// Validate an ordered set of gradient stops.
pub fn validate_stops(stops: &[GradientStop]) -> HeatmapResult<()> {
    if stops.len() < 2 {
        return Err(HeatmapError::invalid_gradient(
            "gradient must have at least 2 color stops",
        ));
    }

    for stop in stops {
        if !(0.0..=1.0).contains(&stop.position) || !stop.position.is_finite() {
            return Err(HeatmapError::invalid_gradient(format!(
                "stop position {} outside [0, 1]",
                stop.position
            )));
        }
    }

    // Stops must be in strictly ascending position order
    for pair in stops.windows(2) {
        if pair[1].position <= pair[0].position {
            return Err(HeatmapError::invalid_gradient(
                "color stops must be in ascending position order",
            ));
        }
    }

    Ok(())
}
