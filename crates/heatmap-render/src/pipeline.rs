//! The two-stage render pipeline: alpha stamping and dirty-region
//! colorization.

use heatmap_common::{
    Color, GradientStop, GridSnapshot, HeatmapConfig, HeatmapResult, RenderDelta, RenderPoint,
};
use tracing::debug;

use crate::palette::PaletteLut;
use crate::png;
use crate::surface::{AlphaSurface, ColorSurface, DirtyRegion};
use crate::template::TemplateCache;

/// Renders aggregation events into a false-color raster.
///
/// Owns the off-screen alpha accumulation surface and the visible RGBA
/// surface. Partial renders stamp into the alpha surface and recolor only
/// the touched region; full renders clear both surfaces first. When either
/// surface has zero area every operation is a silent no-op.
pub struct RenderPipeline {
    alpha: AlphaSurface,
    visible: ColorSurface,
    palette: PaletteLut,
    templates: TemplateCache,
    gradient: Vec<GradientStop>,

    default_radius: u32,
    // opacity parameters scaled to the 0-255 alpha domain; 0 means unset
    // for the fixed override
    opacity: u8,
    max_opacity: u8,
    min_opacity: u8,
    use_gradient_opacity: bool,

    // extrema of the most recent render, for value read-back
    min: f64,
    max: f64,
}

impl RenderPipeline {
    pub fn new(config: &HeatmapConfig) -> HeatmapResult<Self> {
        let palette = PaletteLut::build(&config.gradient)?;

        Ok(Self {
            alpha: AlphaSurface::new(config.width, config.height),
            visible: ColorSurface::new(
                config.width,
                config.height,
                background_rgba(config.background_color.as_ref()),
            ),
            palette,
            templates: TemplateCache::new(1.0 - config.blur),
            gradient: config.gradient.clone(),
            default_radius: config.radius,
            opacity: scale_opacity(config.opacity.unwrap_or(0.0)),
            max_opacity: scale_opacity(config.max_opacity),
            min_opacity: scale_opacity(config.min_opacity),
            use_gradient_opacity: config.use_gradient_opacity,
            min: 0.0,
            max: 1.0,
        })
    }

    pub fn width(&self) -> u32 {
        self.alpha.width()
    }

    pub fn height(&self) -> u32 {
        self.alpha.height()
    }

    /// Incremental render: stamp the delta's points, recolor the touched
    /// region. Nothing is cleared.
    pub fn render_partial(&mut self, delta: &RenderDelta) {
        if delta.points.is_empty() || !self.surfaces_available() {
            return;
        }

        let dirty = self.draw_alpha(delta.min, delta.max, &delta.points);
        self.colorize(dirty);
    }

    /// Full repaint: clear both surfaces, then stamp and recolor the whole
    /// snapshot.
    pub fn render_all(&mut self, snapshot: &GridSnapshot<'_>) {
        if !self.surfaces_available() {
            return;
        }

        self.alpha.clear();
        self.visible.clear();

        let points = snapshot.to_points();
        debug!(points = points.len(), "full repaint");
        if points.is_empty() {
            self.min = snapshot.min;
            self.max = snapshot.max;
            return;
        }

        let dirty = self.draw_alpha(snapshot.min, snapshot.max, &points);
        self.colorize(dirty);
    }

    /// Read the data value back from a rendered pixel.
    ///
    /// Returns 0 when the point is off-surface or no surface is available.
    pub fn get_value_at(&self, x: i64, y: i64) -> f64 {
        if !self.surfaces_available() || x < 0 || y < 0 {
            return 0.0;
        }

        match self.alpha.get(x as u32, y as u32) {
            Some(alpha) => ((self.max - self.min).abs() * (alpha as f64 / 255.0)).round(),
            None => 0.0,
        }
    }

    /// Normalized intensity byte at a pixel of the accumulation surface.
    pub fn coverage_at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.alpha.get(x as u32, y as u32).unwrap_or(0)
    }

    /// Visible-surface pixel at `(x, y)`, if on-surface.
    pub fn pixel_at(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        if x < 0 || y < 0 {
            return None;
        }
        self.visible.get(x as u32, y as u32)
    }

    /// Raw RGBA bytes of the visible surface, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.visible.pixels()
    }

    /// Encode the visible surface as a PNG.
    pub fn to_png(&self) -> HeatmapResult<Vec<u8>> {
        png::encode_auto(
            self.visible.pixels(),
            self.width() as usize,
            self.height() as usize,
        )
    }

    /// Resize both surfaces. Raster contents are dropped; the host must
    /// re-render.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.alpha.resize(width, height);
        self.visible.resize(width, height);
    }

    /// Re-apply style parameters from a configuration.
    ///
    /// The palette is rebuilt only when the gradient stops changed, and the
    /// template cache is invalidated only when the blur factor moved.
    pub fn update_config(&mut self, config: &HeatmapConfig) -> HeatmapResult<()> {
        if config.gradient != self.gradient {
            debug!("gradient changed, rebuilding palette");
            self.palette = PaletteLut::build(&config.gradient)?;
            self.gradient = config.gradient.clone();
        }

        self.templates.set_core_factor(1.0 - config.blur);
        self.default_radius = config.radius;
        self.opacity = scale_opacity(config.opacity.unwrap_or(0.0));
        self.max_opacity = scale_opacity(config.max_opacity);
        self.min_opacity = scale_opacity(config.min_opacity);
        self.use_gradient_opacity = config.use_gradient_opacity;
        self.visible
            .set_background(background_rgba(config.background_color.as_ref()));

        if config.width != self.width() || config.height != self.height() {
            self.set_dimensions(config.width, config.height);
        }

        Ok(())
    }

    fn surfaces_available(&self) -> bool {
        self.alpha.is_available() && self.visible.is_available()
    }

    /// Stage one: stamp every point into the alpha surface.
    ///
    /// Returns the dirty region covering the unclipped stamp rects; the
    /// caller hands it straight to [`colorize`](Self::colorize).
    fn draw_alpha(&mut self, min: f64, max: f64, points: &[RenderPoint]) -> DirtyRegion {
        self.min = min;
        self.max = max;
        let range = max - min;

        let mut dirty = DirtyRegion::EMPTY;

        for point in points {
            let radius = if point.radius > 0 {
                point.radius
            } else {
                self.default_radius
            };
            if radius == 0 {
                continue;
            }

            let rect_x = point.x - radius as i64;
            let rect_y = point.y - radius as i64;

            // Values above the running maximum saturate at it.
            let value = point.value.min(max);
            let intensity = if range.abs() < f64::EPSILON {
                1.0
            } else {
                (value - min) / range
            };
            // Intensities below 0.01 would quantize to zero coverage and
            // become unreadable on read-back, so they are floored.
            let intensity = intensity.clamp(0.01, 1.0) as f32;

            let template = self.templates.get_or_create(radius);
            let size = template.size() as i64;

            for ty in 0..size {
                let py = rect_y + ty;
                if py < 0 || py >= self.alpha.height() as i64 {
                    continue;
                }
                for tx in 0..size {
                    let px = rect_x + tx;
                    if px < 0 || px >= self.alpha.width() as i64 {
                        continue;
                    }

                    let coverage = template.alpha_at(tx as u32, ty as u32);
                    if coverage == 0.0 {
                        continue;
                    }
                    self.alpha.blend(px as u32, py as u32, coverage * intensity);
                }
            }

            dirty.union_rect(rect_x, rect_y, size, size);
        }

        dirty
    }

    /// Stage two: recolor the dirty region through the palette.
    ///
    /// Pixels with zero coverage are skipped entirely, leaving whatever the
    /// background put there.
    fn colorize(&mut self, dirty: DirtyRegion) {
        let Some((x0, y0, w, h)) = dirty.clamp_to(self.alpha.width(), self.alpha.height()) else {
            return;
        };

        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let alpha = match self.alpha.get(x, y) {
                    Some(a) if a > 0 => a,
                    _ => continue,
                };

                let [r, g, b, palette_alpha] = self.palette.rgba(alpha);

                let final_alpha = if self.use_gradient_opacity {
                    palette_alpha
                } else if self.opacity > 0 {
                    self.opacity
                } else if alpha < self.max_opacity {
                    alpha.max(self.min_opacity)
                } else {
                    self.max_opacity
                };

                self.visible.put(x, y, [r, g, b, final_alpha]);
            }
        }
    }
}

fn scale_opacity(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn background_rgba(color: Option<&Color>) -> [u8; 4] {
    match color {
        Some(color) => {
            let (r, g, b, a) = color.to_rgba();
            [r, g, b, a]
        }
        None => [0, 0, 0, 0],
    }
}
