//! False-color rendering of aggregated point data.
//!
//! A two-stage pipeline: radial intensity stamps accumulate into an
//! alpha-only surface, then only the touched region is recolored through a
//! 256-entry palette lookup onto the visible RGBA surface.

pub mod palette;
pub mod pipeline;
pub mod png;
pub mod surface;
pub mod template;

pub use palette::PaletteLut;
pub use pipeline::RenderPipeline;
pub use surface::{AlphaSurface, ColorSurface, DirtyRegion};
pub use template::{AlphaTemplate, TemplateCache};
