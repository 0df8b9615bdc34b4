//! Weighted data points, field remapping and bulk datasets.

use crate::error::HeatmapResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single weighted observation.
///
/// `value` defaults to 1 when absent; `radius` defaults to the store's
/// configured default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: i64,
    pub y: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
}

impl DataPoint {
    pub fn new(x: i64, y: i64, value: f64) -> Self {
        Self {
            x,
            y,
            value: Some(value),
            radius: None,
        }
    }

    pub fn with_radius(x: i64, y: i64, value: f64, radius: u32) -> Self {
        Self {
            x,
            y,
            value: Some(value),
            radius: Some(radius),
        }
    }

    /// Read the field selected by `field`, if present.
    pub fn field(&self, field: PointField) -> Option<f64> {
        match field {
            PointField::X => Some(self.x as f64),
            PointField::Y => Some(self.y as f64),
            PointField::Value => self.value,
        }
    }
}

/// Which input field feeds a grid axis or the accumulated weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointField {
    X,
    Y,
    Value,
}

/// Maps input point fields onto the grid axes and the weight.
///
/// The identity mapping is almost always what you want; remapping exists for
/// hosts whose point streams carry axes in unconventional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub x: PointField,
    pub y: PointField,
    pub value: PointField,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            x: PointField::X,
            y: PointField::Y,
            value: PointField::Value,
        }
    }
}

/// The unit passed from the store to the renderer.
///
/// A plain value object copied across the boundary; the renderer never sees
/// the store's internal grid through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint {
    pub x: i64,
    pub y: i64,
    pub value: f64,
    pub radius: u32,
}

/// A bulk dataset: full-replace input and the `get_data` output shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkData {
    /// Explicit minimum; treated as 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Explicit maximum; when absent the maximum accumulated from `data`
    /// is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub data: Vec<DataPoint>,
}

impl BulkData {
    /// Parse a bulk dataset from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a bulk dataset from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
