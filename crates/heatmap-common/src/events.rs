//! Typed event channels between the aggregation store and the renderer.
//!
//! Three fixed channels replace a generic string-keyed dispatcher:
//! partial-render, full-render and extrema-change, each with its own payload
//! type. Delivery is synchronous and ordered, at most once per store
//! operation per channel, with no buffering.

use crate::grid::CellGrid;
use crate::point::RenderPoint;

/// Payload for an incremental render touching a handful of points.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDelta {
    pub min: f64,
    pub max: f64,
    pub points: Vec<RenderPoint>,
}

/// Borrowed view of the entire grid for a full repaint.
#[derive(Debug, Clone, Copy)]
pub struct GridSnapshot<'a> {
    pub min: f64,
    pub max: f64,
    pub cells: &'a CellGrid,
}

impl GridSnapshot<'_> {
    /// Flatten the sparse grid into renderer-ready points.
    ///
    /// Iteration order is unspecified; stamping is commutative so the
    /// resulting raster does not depend on it.
    pub fn to_points(&self) -> Vec<RenderPoint> {
        self.cells
            .iter()
            .map(|(&(x, y), cell)| RenderPoint {
                x,
                y,
                value: cell.value,
                radius: cell.radius,
            })
            .collect()
    }
}

/// Notification that the running extrema moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremaChange {
    pub min: f64,
    pub max: f64,
}

/// Synchronous receiver for store events.
///
/// The store calls exactly one render channel per public operation, plus
/// extrema-change whenever the running extrema are overridden.
/// Implementations must not call back into the store.
pub trait StoreSink {
    fn on_partial_render(&mut self, delta: &RenderDelta);
    fn on_full_render(&mut self, snapshot: &GridSnapshot<'_>);
    fn on_extrema_change(&mut self, change: &ExtremaChange);
}
