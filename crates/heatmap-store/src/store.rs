//! The aggregation store and its two accumulation disciplines.

use heatmap_common::{
    BulkData, Cell, CellGrid, DataPoint, ExtremaChange, FieldMapping, GridSnapshot, HeatmapConfig,
    RenderDelta, RenderPoint, StoreSink,
};
use tracing::debug;

/// Accumulates weighted points into a sparse integer grid and tracks the
/// running value extrema.
///
/// Every mutating operation emits exactly one render event through the
/// supplied sink: a partial delta for in-range insertions, a full repaint
/// whenever the extrema move. Extrema updates are never silent.
pub struct DataStore {
    grid: CellGrid,
    min: f64,
    max: f64,
    default_radius: u32,
    fields: FieldMapping,
}

impl DataStore {
    pub fn new(config: &HeatmapConfig) -> Self {
        Self {
            grid: CellGrid::new(),
            min: 0.0,
            max: 0.0,
            default_radius: config.radius,
            fields: config.fields,
        }
    }

    /// Running `(min, max)` extrema.
    pub fn extrema(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Borrowed view of the whole grid, e.g. for a host-driven repaint.
    pub fn snapshot(&self) -> GridSnapshot<'_> {
        GridSnapshot {
            min: self.min,
            max: self.max,
            cells: &self.grid,
        }
    }

    /// Insert a single observation.
    ///
    /// The cell at the point's coordinates is created on first touch and
    /// accumulates additively afterwards. The very first point in an empty
    /// store seeds `min = max = value` and is delivered as a partial delta.
    /// An insertion that pushes a cell past the running extrema routes
    /// through [`DataStore::set_data_max`] / [`DataStore::set_data_min`]
    /// instead: the point is left out of any partial delta and is drawn by
    /// the full repaint those trigger.
    pub fn add_data(&mut self, point: &DataPoint, sink: &mut dyn StoreSink) {
        let seed = self.grid.is_empty();
        let (render_point, stored) = self.accumulate(point);

        if seed {
            self.min = stored;
            self.max = stored;
        } else if stored > self.max {
            self.set_data_max(stored, sink);
            return;
        } else if stored < self.min {
            self.set_data_min(stored, sink);
            return;
        }

        sink.on_partial_render(&RenderDelta {
            min: self.min,
            max: self.max,
            points: vec![render_point],
        });
    }

    /// Replace the entire grid with a bulk dataset.
    ///
    /// Points are inserted through the non-forcing path: extrema growth
    /// during the load updates the internal counters without firing any
    /// event. The dataset's explicit `min` (default 0) and `max` (kept from
    /// the load when absent) are then applied, followed by one
    /// extrema-change and one full-render event.
    pub fn set_data(&mut self, bulk: &BulkData, sink: &mut dyn StoreSink) {
        self.grid.clear();

        for (i, point) in bulk.data.iter().enumerate() {
            let (_, stored) = self.accumulate(point);
            if i == 0 {
                self.min = stored;
                self.max = stored;
            } else if stored > self.max {
                self.max = stored;
            } else if stored < self.min {
                self.min = stored;
            }
        }

        self.min = bulk.min.unwrap_or(0.0);
        if let Some(max) = bulk.max {
            self.max = max;
        }

        debug!(
            points = bulk.data.len(),
            cells = self.grid.len(),
            min = self.min,
            max = self.max,
            "bulk dataset loaded"
        );

        sink.on_extrema_change(&ExtremaChange {
            min: self.min,
            max: self.max,
        });
        sink.on_full_render(&self.snapshot());
    }

    /// Override the running maximum.
    pub fn set_data_max(&mut self, max: f64, sink: &mut dyn StoreSink) {
        self.max = max;

        sink.on_extrema_change(&ExtremaChange {
            min: self.min,
            max: self.max,
        });
        sink.on_full_render(&self.snapshot());
    }

    /// Override the running minimum.
    pub fn set_data_min(&mut self, min: f64, sink: &mut dyn StoreSink) {
        self.min = min;

        sink.on_extrema_change(&ExtremaChange {
            min: self.min,
            max: self.max,
        });
        sink.on_full_render(&self.snapshot());
    }

    /// Flatten the grid into a dense point list for inspection or
    /// serialization. Points are ordered by coordinates so the output is
    /// deterministic regardless of insertion order.
    pub fn get_data(&self) -> BulkData {
        let mut data: Vec<DataPoint> = self
            .grid
            .iter()
            .map(|(&(x, y), cell)| DataPoint {
                x,
                y,
                value: Some(cell.value),
                radius: Some(cell.radius),
            })
            .collect();
        data.sort_by_key(|p| (p.x, p.y));

        BulkData {
            min: Some(self.min),
            max: Some(self.max),
            data,
        }
    }

    /// Create or accumulate the cell for `point`.
    ///
    /// Returns the render point carrying the submitted value (not the
    /// accumulated one) and the cell's stored value after the insertion.
    fn accumulate(&mut self, point: &DataPoint) -> (RenderPoint, f64) {
        let x = point.field(self.fields.x).unwrap_or(0.0) as i64;
        let y = point.field(self.fields.y).unwrap_or(0.0) as i64;
        let value = point.field(self.fields.value).unwrap_or(1.0);
        let radius = point.radius.unwrap_or(self.default_radius);

        let cell = self
            .grid
            .entry((x, y))
            .and_modify(|c| c.value += value)
            .or_insert(Cell { value, radius });

        (
            RenderPoint {
                x,
                y,
                value,
                radius,
            },
            cell.value,
        )
    }
}
