//! Streaming heat map: weighted 2D observations in, false-color raster out.
//!
//! [`HeatMap`] wires the aggregation store to the render pipeline over
//! synchronous typed event channels. Every data mutation completes its
//! corresponding render before returning; there is no buffering and no
//! background work.
//!
//! ```
//! use heatmap::HeatMap;
//! use heatmap_common::{DataPoint, HeatmapConfig};
//!
//! let mut map = HeatMap::new(HeatmapConfig::default()).unwrap();
//! map.add_data(&DataPoint::new(100, 100, 5.0));
//! map.add_data(&DataPoint::new(120, 110, 8.0));
//!
//! let png = map.to_png().unwrap();
//! assert!(!png.is_empty());
//! ```

use heatmap_common::{
    BulkData, DataPoint, ExtremaChange, GradientStop, GridSnapshot, HeatmapConfig, HeatmapResult,
    RenderDelta, StoreSink,
};
use heatmap_render::RenderPipeline;
use heatmap_store::DataStore;
use tracing::debug;

pub use heatmap_common as common;
pub use heatmap_render as render;
pub use heatmap_store as store;

/// Snapshot handed to the extrema observer.
#[derive(Debug, Clone)]
pub struct ExtremaSnapshot {
    pub min: f64,
    pub max: f64,
    pub gradient: Vec<GradientStop>,
}

type ExtremaCallback = Box<dyn FnMut(&ExtremaSnapshot)>;

/// A streaming heat map instance.
///
/// Owns both halves of the system: the [`DataStore`] holding the sparse
/// value grid and the [`RenderPipeline`] holding the raster surfaces.
pub struct HeatMap {
    config: HeatmapConfig,
    store: DataStore,
    pipeline: RenderPipeline,
    on_extrema_change: Option<ExtremaCallback>,
}

impl HeatMap {
    /// Create a heat map from a validated configuration.
    pub fn new(config: HeatmapConfig) -> HeatmapResult<Self> {
        config.validate()?;

        let store = DataStore::new(&config);
        let pipeline = RenderPipeline::new(&config)?;

        Ok(Self {
            config,
            store,
            pipeline,
            on_extrema_change: None,
        })
    }

    /// Register the observer invoked whenever the running extrema change.
    pub fn set_on_extrema_change(&mut self, callback: impl FnMut(&ExtremaSnapshot) + 'static) {
        self.on_extrema_change = Some(Box::new(callback));
    }

    /// Feed a single observation; the matching partial or full render runs
    /// before this returns.
    pub fn add_data(&mut self, point: &DataPoint) {
        let mut dispatch = Dispatch {
            pipeline: &mut self.pipeline,
            callback: self.on_extrema_change.as_mut(),
            gradient: &self.config.gradient,
        };
        self.store.add_data(point, &mut dispatch);
    }

    /// Replace the whole dataset; clears the surfaces and repaints.
    pub fn set_data(&mut self, bulk: &BulkData) {
        let mut dispatch = Dispatch {
            pipeline: &mut self.pipeline,
            callback: self.on_extrema_change.as_mut(),
            gradient: &self.config.gradient,
        };
        self.store.set_data(bulk, &mut dispatch);
    }

    /// Override the running maximum and repaint.
    pub fn set_data_max(&mut self, max: f64) {
        let mut dispatch = Dispatch {
            pipeline: &mut self.pipeline,
            callback: self.on_extrema_change.as_mut(),
            gradient: &self.config.gradient,
        };
        self.store.set_data_max(max, &mut dispatch);
    }

    /// Override the running minimum and repaint.
    pub fn set_data_min(&mut self, min: f64) {
        let mut dispatch = Dispatch {
            pipeline: &mut self.pipeline,
            callback: self.on_extrema_change.as_mut(),
            gradient: &self.config.gradient,
        };
        self.store.set_data_min(min, &mut dispatch);
    }

    /// Repaint the visible surface from the current grid contents without
    /// touching the extrema.
    pub fn repaint(&mut self) {
        self.pipeline.render_all(&self.store.snapshot());
    }

    /// Flatten the current grid for inspection or serialization.
    pub fn get_data(&self) -> BulkData {
        self.store.get_data()
    }

    /// Read the data value back from a rendered pixel.
    pub fn get_value_at(&self, x: i64, y: i64) -> f64 {
        self.pipeline.get_value_at(x, y)
    }

    /// Encode the visible surface as a PNG.
    pub fn to_png(&self) -> HeatmapResult<Vec<u8>> {
        self.pipeline.to_png()
    }

    /// Resize the surfaces and repaint, since resizing drops the raster
    /// contents.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        debug!(width, height, "resizing surfaces");
        self.pipeline.set_dimensions(width, height);
        self.config.width = width;
        self.config.height = height;
        self.repaint();
    }

    /// Apply a new configuration to the pipeline.
    ///
    /// The grid contents are kept; call [`repaint`](Self::repaint) to see
    /// style changes applied to previously rendered data.
    pub fn update_config(&mut self, config: HeatmapConfig) -> HeatmapResult<()> {
        config.validate()?;
        self.pipeline.update_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Raw RGBA bytes of the visible surface, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.pipeline.pixels()
    }
}

/// Routes store events into the pipeline and the extrema observer.
struct Dispatch<'a> {
    pipeline: &'a mut RenderPipeline,
    callback: Option<&'a mut ExtremaCallback>,
    gradient: &'a [GradientStop],
}

impl StoreSink for Dispatch<'_> {
    fn on_partial_render(&mut self, delta: &RenderDelta) {
        self.pipeline.render_partial(delta);
    }

    fn on_full_render(&mut self, snapshot: &GridSnapshot<'_>) {
        self.pipeline.render_all(snapshot);
    }

    fn on_extrema_change(&mut self, change: &ExtremaChange) {
        if let Some(callback) = self.callback.as_mut() {
            callback(&ExtremaSnapshot {
                min: change.min,
                max: change.max,
                gradient: self.gradient.to_vec(),
            });
        }
    }
}
