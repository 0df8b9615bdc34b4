//! 256-entry RGBA lookup table built from gradient color stops.

use heatmap_common::gradient::validate_stops;
use heatmap_common::{GradientStop, HeatmapResult};

/// Number of palette entries; indices are raw intensity bytes.
pub const PALETTE_SIZE: usize = 256;

/// Color palette indexed by normalized intensity (0-255).
///
/// Rebuilt from scratch whenever the gradient stops change, never updated
/// incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteLut {
    data: Vec<u8>,
}

impl PaletteLut {
    /// Build the table with standard linear-gradient semantics: the first
    /// stop's color fills everything below its position, the last stop's
    /// everything above, and consecutive stops interpolate linearly, alpha
    /// included.
    pub fn build(stops: &[GradientStop]) -> HeatmapResult<Self> {
        validate_stops(stops)?;

        let mut data = vec![0u8; PALETTE_SIZE * 4];
        for i in 0..PALETTE_SIZE {
            let position = i as f64 / (PALETTE_SIZE - 1) as f64;
            let rgba = sample(stops, position);
            data[i * 4..i * 4 + 4].copy_from_slice(&rgba);
        }

        Ok(Self { data })
    }

    /// RGBA entry for the given intensity byte.
    pub fn rgba(&self, index: u8) -> [u8; 4] {
        let off = index as usize * 4;
        [
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ]
    }

    /// The raw 1024-byte RGBA table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Sample the gradient at `position` in `[0, 1]`.
fn sample(stops: &[GradientStop], position: f64) -> [u8; 4] {
    // validate_stops guarantees at least two stops in ascending order
    let first = &stops[0];
    let last = &stops[stops.len() - 1];

    if position <= first.position {
        return to_array(first.color.to_rgba());
    }
    if position >= last.position {
        return to_array(last.color.to_rgba());
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if position <= hi.position {
            let t = (position - lo.position) / (hi.position - lo.position);
            return lerp_rgba(lo.color.to_rgba(), hi.color.to_rgba(), t);
        }
    }

    to_array(last.color.to_rgba())
}

fn to_array((r, g, b, a): (u8, u8, u8, u8)) -> [u8; 4] {
    [r, g, b, a]
}

/// Linear interpolation between two RGBA colors.
fn lerp_rgba(a: (u8, u8, u8, u8), b: (u8, u8, u8, u8), t: f64) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| ((x as f64) * (1.0 - t) + (y as f64) * t).round() as u8;
    [
        lerp(a.0, b.0),
        lerp(a.1, b.1),
        lerp(a.2, b.2),
        lerp(a.3, b.3),
    ]
}
