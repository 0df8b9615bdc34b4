//! Radial intensity stamps and their per-radius cache.

use std::collections::HashMap;
use tracing::debug;

/// A square alpha-only stamp of side `2 * radius` encoding radial falloff.
///
/// Coverage is 1.0 inside the opaque core and fades linearly to 0 at the
/// rim. A core factor of 1.0 produces a hard-edged disc; smaller factors
/// shrink the core and widen the fade.
#[derive(Debug, Clone)]
pub struct AlphaTemplate {
    radius: u32,
    alpha: Vec<f32>,
}

impl AlphaTemplate {
    /// Render the stamp for `radius` with the given opaque-core factor.
    pub fn generate(radius: u32, core_factor: f64) -> Self {
        let size = radius as usize * 2;
        let mut alpha = vec![0.0f32; size * size];

        let r = radius as f64;
        let core = r * core_factor.clamp(0.0, 1.0);
        let hard = core_factor >= 1.0;

        for ty in 0..size {
            for tx in 0..size {
                // sampled at the pixel center
                let dx = tx as f64 + 0.5 - r;
                let dy = ty as f64 + 0.5 - r;
                let d = (dx * dx + dy * dy).sqrt();

                let coverage = if hard {
                    if d <= r {
                        1.0
                    } else {
                        0.0
                    }
                } else if d <= core {
                    1.0
                } else if d >= r {
                    0.0
                } else {
                    1.0 - (d - core) / (r - core)
                };

                alpha[ty * size + tx] = coverage as f32;
            }
        }

        Self { radius, alpha }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        self.radius * 2
    }

    /// Coverage at template pixel `(tx, ty)`.
    pub fn alpha_at(&self, tx: u32, ty: u32) -> f32 {
        self.alpha[(ty * self.size() + tx) as usize]
    }
}

/// Memoized stamps keyed by integer radius.
///
/// The opaque-core factor is global cache state; changing it drops every
/// cached stamp. Within a fixed factor, templates are immutable and never
/// evicted; the radius domain per session is small and finite.
#[derive(Debug)]
pub struct TemplateCache {
    templates: HashMap<u32, AlphaTemplate>,
    core_factor: f64,
}

impl TemplateCache {
    pub fn new(core_factor: f64) -> Self {
        Self {
            templates: HashMap::new(),
            core_factor,
        }
    }

    pub fn core_factor(&self) -> f64 {
        self.core_factor
    }

    /// Change the opaque-core factor, invalidating the cache if it moved.
    pub fn set_core_factor(&mut self, core_factor: f64) {
        if (core_factor - self.core_factor).abs() > f64::EPSILON {
            debug!(core_factor, "template cache invalidated");
            self.templates.clear();
            self.core_factor = core_factor;
        }
    }

    /// Fetch the stamp for `radius`, rendering it on first use.
    pub fn get_or_create(&mut self, radius: u32) -> &AlphaTemplate {
        let core_factor = self.core_factor;
        self.templates.entry(radius).or_insert_with(|| {
            debug!(radius, core_factor, "rendering intensity template");
            AlphaTemplate::generate(radius, core_factor)
        })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
