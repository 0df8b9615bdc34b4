//! Tests for the stamp-then-colorize render pipeline.

use heatmap_common::{
    CellGrid, Color, GridSnapshot, HeatmapConfig, RenderDelta, RenderPoint,
};
use heatmap_render::RenderPipeline;

fn test_config(width: u32, height: u32) -> HeatmapConfig {
    HeatmapConfig {
        radius: 10,
        width,
        height,
        ..HeatmapConfig::default()
    }
}

fn delta(min: f64, max: f64, points: Vec<RenderPoint>) -> RenderDelta {
    RenderDelta { min, max, points }
}

fn point(x: i64, y: i64, value: f64, radius: u32) -> RenderPoint {
    RenderPoint {
        x,
        y,
        value,
        radius,
    }
}

// ============================================================================
// Stamping
// ============================================================================

#[test]
fn test_partial_render_stamps_at_point_center() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 50.0, 10)]));

    // Center carries half intensity, well away from the stamp is untouched.
    let center = pipeline.coverage_at(32, 32);
    assert!((center as i32 - 128).abs() <= 1);
    assert_eq!(pipeline.coverage_at(5, 5), 0);
}

#[test]
fn test_partial_render_does_not_clear_previous_stamps() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(16, 16, 100.0, 5)]));
    pipeline.render_partial(&delta(0.0, 100.0, vec![point(48, 48, 100.0, 5)]));

    assert!(pipeline.coverage_at(16, 16) > 0);
    assert!(pipeline.coverage_at(48, 48) > 0);
}

#[test]
fn test_full_render_clears_first() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();
    pipeline.render_partial(&delta(0.0, 100.0, vec![point(16, 16, 100.0, 5)]));
    assert!(pipeline.coverage_at(16, 16) > 0);

    let mut cells = CellGrid::new();
    cells.insert(
        (48, 48),
        heatmap_common::Cell {
            value: 100.0,
            radius: 5,
        },
    );
    pipeline.render_all(&GridSnapshot {
        min: 0.0,
        max: 100.0,
        cells: &cells,
    });

    assert_eq!(pipeline.coverage_at(16, 16), 0);
    assert!(pipeline.coverage_at(48, 48) > 0);
}

#[test]
fn test_overlapping_stamps_brighten_but_saturate() {
    let mut single = RenderPipeline::new(&test_config(64, 64)).unwrap();
    let mut double = RenderPipeline::new(&test_config(64, 64)).unwrap();

    // Mid-intensity points four pixels apart; the midpoint of the pair sits
    // inside both stamps.
    single.render_partial(&delta(0.0, 100.0, vec![point(30, 32, 60.0, 10)]));
    double.render_partial(&delta(
        0.0,
        100.0,
        vec![point(30, 32, 60.0, 10), point(34, 32, 60.0, 10)],
    ));

    let alone = single.coverage_at(32, 32);
    let combined = double.coverage_at(32, 32);
    assert!(combined > alone);
    assert!(combined <= 255);
}

#[test]
fn test_extreme_value_pair_never_overflows() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    // One point at the maximum, an adjacent one at the minimum.
    pipeline.render_partial(&delta(
        10.0,
        100.0,
        vec![point(32, 32, 100.0, 10), point(33, 32, 10.0, 10)],
    ));

    assert_eq!(pipeline.coverage_at(32, 32), 255);
    assert!(pipeline.coverage_at(33, 32) > 0);
}

#[test]
fn test_floored_minimum_remains_readable() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    // A point at the running minimum would normalize to zero intensity;
    // the floor keeps its center coverage above zero.
    pipeline.render_partial(&delta(10.0, 100.0, vec![point(32, 32, 10.0, 10)]));

    assert!(pipeline.coverage_at(32, 32) > 0);
}

#[test]
fn test_values_above_max_saturate_at_max() {
    let mut capped = RenderPipeline::new(&test_config(64, 64)).unwrap();
    let mut over = RenderPipeline::new(&test_config(64, 64)).unwrap();

    capped.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));
    over.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 250.0, 10)]));

    assert_eq!(
        capped.coverage_at(32, 32),
        over.coverage_at(32, 32),
    );
}

#[test]
fn test_degenerate_range_renders_fully_opaque() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    // First-point scenario: min == max == value.
    pipeline.render_partial(&delta(50.0, 50.0, vec![point(32, 32, 50.0, 10)]));

    assert_eq!(pipeline.coverage_at(32, 32), 255);
}

#[test]
fn test_stamp_near_origin_is_clipped_without_panic() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(2, 2, 100.0, 10)]));

    assert!(pipeline.coverage_at(2, 2) > 0);
    assert_eq!(pipeline.coverage_at(63, 63), 0);
}

#[test]
fn test_empty_delta_is_a_no_op() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();
    pipeline.render_partial(&delta(0.0, 100.0, vec![]));
    assert_eq!(pipeline.coverage_at(32, 32), 0);
}

// ============================================================================
// Value read-back
// ============================================================================

#[test]
fn test_get_value_at_round_trips_within_tolerance() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 50.0, 10)]));

    let read_back = pipeline.get_value_at(32, 32);
    assert!((read_back - 50.0).abs() <= 1.0, "read back {}", read_back);
}

#[test]
fn test_get_value_at_out_of_bounds_is_zero() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();
    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 50.0, 10)]));

    assert_eq!(pipeline.get_value_at(-1, 10), 0.0);
    assert_eq!(pipeline.get_value_at(10, 500), 0.0);
}

#[test]
fn test_unavailable_surfaces_no_op_everything() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();
    pipeline.set_dimensions(0, 0);

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(5, 5, 50.0, 10)]));
    let cells = CellGrid::new();
    pipeline.render_all(&GridSnapshot {
        min: 0.0,
        max: 100.0,
        cells: &cells,
    });

    assert_eq!(pipeline.get_value_at(5, 5), 0.0);
}

// ============================================================================
// Colorization
// ============================================================================

#[test]
fn test_colorize_writes_palette_color_inside_stamp_only() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));

    // Full intensity maps to the top of the default gradient (red).
    let center = pipeline.pixel_at(32, 32).unwrap();
    assert_eq!(center[0], 255);
    assert_eq!(center[1], 0);
    assert_eq!(center[2], 0);
    assert!(center[3] > 0);

    // Transparent pixels are left untouched on the visible surface.
    assert_eq!(pipeline.pixel_at(5, 5).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn test_fixed_opacity_overrides_clamp_policy() {
    let mut config = test_config(64, 64);
    config.opacity = Some(0.5);
    let mut pipeline = RenderPipeline::new(&config).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));

    assert_eq!(pipeline.pixel_at(32, 32).unwrap()[3], 128);
    // Every touched pixel carries the same fixed alpha.
    assert_eq!(pipeline.pixel_at(30, 32).unwrap()[3], 128);
}

#[test]
fn test_opacity_clamp_policy() {
    let mut config = test_config(64, 64);
    config.max_opacity = 0.5;
    config.min_opacity = 0.2;
    let mut pipeline = RenderPipeline::new(&config).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));

    // Center coverage 255 exceeds max_opacity (128) and is capped there.
    assert_eq!(pipeline.pixel_at(32, 32).unwrap()[3], 128);

    // A faint rim pixel sits below min_opacity (51) and is raised to it.
    let mut raised = None;
    for x in 22..42 {
        let coverage = pipeline.coverage_at(x, 32);
        if coverage > 0 && coverage < 51 {
            raised = pipeline.pixel_at(x, 32);
            break;
        }
    }
    if let Some(pixel) = raised {
        assert_eq!(pixel[3], 51);
    }
}

#[test]
fn test_gradient_opacity_uses_palette_alpha() {
    let mut config = test_config(64, 64);
    config.use_gradient_opacity = true;
    config.gradient = vec![
        heatmap_common::GradientStop::new(
            0.0,
            Color::Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 0,
            },
        ),
        heatmap_common::GradientStop::new(
            1.0,
            Color::Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 200,
            },
        ),
    ];
    let mut pipeline = RenderPipeline::new(&config).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));

    // Full coverage indexes the top palette entry, whose alpha is 200.
    assert_eq!(pipeline.pixel_at(32, 32).unwrap()[3], 200);
}

#[test]
fn test_background_color_survives_outside_stamps() {
    let mut config = test_config(32, 32);
    config.background_color = Some(Color::Named("white".to_string()));
    let mut pipeline = RenderPipeline::new(&config).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(16, 16, 100.0, 5)]));

    assert_eq!(pipeline.pixel_at(0, 0).unwrap(), [255, 255, 255, 255]);
    assert_ne!(pipeline.pixel_at(16, 16).unwrap(), [255, 255, 255, 255]);
}

// ============================================================================
// Reconfiguration
// ============================================================================

#[test]
fn test_set_dimensions_drops_contents() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();
    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));
    assert!(pipeline.coverage_at(32, 32) > 0);

    pipeline.set_dimensions(128, 128);

    assert_eq!(pipeline.width(), 128);
    assert_eq!(pipeline.height(), 128);
    assert_eq!(pipeline.coverage_at(32, 32), 0);
}

#[test]
fn test_update_config_rebuilds_palette() {
    let mut pipeline = RenderPipeline::new(&test_config(64, 64)).unwrap();

    let mut config = test_config(64, 64);
    config.gradient = vec![
        heatmap_common::GradientStop::new(0.0, Color::Named("black".to_string())),
        heatmap_common::GradientStop::new(1.0, Color::Named("white".to_string())),
    ];
    pipeline.update_config(&config).unwrap();

    pipeline.render_partial(&delta(0.0, 100.0, vec![point(32, 32, 100.0, 10)]));
    let center = pipeline.pixel_at(32, 32).unwrap();
    assert_eq!(&center[0..3], &[255, 255, 255]);
}
