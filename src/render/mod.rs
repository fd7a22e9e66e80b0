//! Density-adaptive geometry generation.
//!
//! A render pass maps the visible sample range and the surface's pixel width
//! onto one of three strategies: exact per-sample vertices when the screen
//! has room for every point, a column-wise min/max envelope when it does not,
//! and a single vertical segment when the whole series collapses into one
//! pixel column. The vertex count is bounded by the pixel width in every
//! mode, never by the sample count.

mod columns;

use glam::Vec2;
use tracing::trace;

use crate::geometry::{RenderMode, VisibleGeometry};
use crate::numeric::SampleValue;
use crate::query::MinMaxSearch;
use crate::view::ViewWindow;

/// Everything a render pass reads from the series: one immutable snapshot.
pub(crate) struct SeriesFrame<'a, T> {
    pub samples: &'a [T],
    pub search: &'a MinMaxSearch<T>,
    pub sample_period: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub min_render_index: usize,
    pub max_render_index: usize,
    pub parallel: bool,
    pub marker_size: f32,
}

pub(crate) fn render_into<T: SampleValue>(
    frame: &SeriesFrame<'_, T>,
    view: &ViewWindow,
    out: &mut VisibleGeometry,
) {
    out.reset();
    if view.is_degenerate() {
        return;
    }

    let width = view.width_px as f64;
    let offset_points = (view.x_min - frame.x_offset) / frame.sample_period;
    let column_point_count = (view.x_span() / width) / frame.sample_period;
    let visible_index1 = offset_points.floor();
    let visible_index2 = (offset_points + column_point_count * (width + 1.0)).floor();
    let visible_count = visible_index2 - visible_index1;
    let points_per_column = visible_count / width;

    // Pixel footprint of the entire series at the current zoom.
    let data_width_px =
        (frame.samples.len() as f64 - 1.0) * frame.sample_period * view.px_per_x_unit();

    if data_width_px <= 1.0 || visible_count + 2.0 <= 1.0 {
        single_column(frame, view, out);
    } else if points_per_column > 1.0 {
        columns::high_density_into(frame, view, offset_points, column_point_count, out);
    } else {
        low_density(frame, view, visible_index1, visible_index2, out);
    }

    if out.vertices.is_empty() {
        out.reset();
    }
    trace!(
        mode = ?out.mode,
        vertices = out.vertices.len(),
        tree = frame.search.is_tree(),
        "render pass"
    );
}

/// The whole series is at most one pixel column wide: one vertical segment
/// spanning the envelope of the full render range.
fn single_column<T: SampleValue>(
    frame: &SeriesFrame<'_, T>,
    view: &ViewWindow,
    out: &mut VisibleGeometry,
) {
    let (low, high) = frame.search.range_minmax(
        frame.samples,
        frame.min_render_index,
        frame.max_render_index,
    );
    let x = view.x_to_px(frame.x_offset);
    out.vertices
        .push(Vec2::new(x, view.y_to_px(low.as_f64() + frame.y_offset)));
    out.vertices
        .push(Vec2::new(x, view.y_to_px(high.as_f64() + frame.y_offset)));
    out.mode = RenderMode::SingleColumn;
}

/// Zoomed in far enough that individual samples are visible: emit them all,
/// plus one padding sample on the right so the line leaves the screen edge.
fn low_density<T: SampleValue>(
    frame: &SeriesFrame<'_, T>,
    view: &ViewWindow,
    visible_index1: f64,
    visible_index2: f64,
    out: &mut VisibleGeometry,
) {
    let len = frame.samples.len() as isize;
    let mut v1 = visible_index1 as isize;
    let mut v2 = visible_index2 as isize;

    if v1 < frame.min_render_index as isize {
        v1 = frame.min_render_index as isize;
    }
    if v2 > len - 2 {
        v2 = len - 2;
    }
    if v2 > frame.max_render_index as isize - 1 {
        v2 = frame.max_render_index as isize - 1;
    }
    if v2 + 1 < v1 {
        return;
    }

    out.vertices.reserve((v2 + 2 - v1) as usize);
    for i in v1..=v2 + 1 {
        let i = i as usize;
        out.vertices.push(Vec2::new(
            view.x_to_px(frame.sample_period * i as f64 + frame.x_offset),
            view.y_to_px(frame.samples[i].as_f64() + frame.y_offset),
        ));
    }
    out.mode = RenderMode::LowDensity;

    // Markers shrink as the samples close in on each other, so they fade out
    // instead of popping when the user zooms away.
    let px_between_samples = (frame.sample_period * view.px_per_x_unit()) as f32;
    let zoom_transition_scale = (px_between_samples / 10.0).min(1.0);
    out.marker_radius_px = frame.marker_size * zoom_transition_scale / 2.0;
}
