//! Per-pixel-column min/max intervals for high-density rendering.

use glam::Vec2;
use rayon::prelude::*;

use crate::geometry::{RenderMode, VisibleGeometry};
use crate::numeric::SampleValue;
use crate::view::ViewWindow;

use super::SeriesFrame;

/// Below this many columns the rayon dispatch costs more than it saves.
const PARALLEL_COLUMN_THRESHOLD: usize = 64;

/// One pixel column's slice of the envelope.
struct ColumnInterval {
    x_px: usize,
    y_top: f32,
    y_bottom: f32,
}

pub(super) fn high_density_into<T: SampleValue>(
    frame: &SeriesFrame<'_, T>,
    view: &ViewWindow,
    offset_points: f64,
    column_point_count: f64,
    out: &mut VisibleGeometry,
) {
    let x_px_start =
        (((-1.0 - offset_points + frame.min_render_index as f64) / column_point_count) - 1.0)
            .ceil()
            .max(0.0) as usize;
    let x_px_end = (((frame.max_render_index as f64 - offset_points) / column_point_count)
        .ceil()
        .max(0.0) as usize)
        .min(view.width_px);
    if x_px_start >= x_px_end {
        return;
    }

    let compute = |x_px: usize| column_interval(frame, view, offset_points, column_point_count, x_px);

    // Columns are independent reads against one immutable snapshot; the
    // indexed collect keeps them in ascending column order either way.
    let intervals: Vec<ColumnInterval> =
        if frame.parallel && x_px_end - x_px_start >= PARALLEL_COLUMN_THRESHOLD {
            (x_px_start..x_px_end).into_par_iter().map(compute).collect()
        } else {
            (x_px_start..x_px_end).map(compute).collect()
        };

    out.vertices.reserve(intervals.len() * 2);
    for interval in &intervals {
        let x = interval.x_px as f32;
        out.vertices.push(Vec2::new(x, interval.y_top));
        out.vertices.push(Vec2::new(x, interval.y_bottom));
    }

    // Alternate each column's pair order so the polyline stays continuous
    // with the previous column's last vertex.
    let points = &mut out.vertices;
    for i in 1..points.len() / 2 {
        if points[2 * i].y >= points[2 * i - 1].y {
            points.swap(2 * i, 2 * i + 1);
        }
    }

    out.mode = RenderMode::HighDensity;
}

fn column_interval<T: SampleValue>(
    frame: &SeriesFrame<'_, T>,
    view: &ViewWindow,
    offset_points: f64,
    column_point_count: f64,
    x_px: usize,
) -> ColumnInterval {
    let min_index = frame.min_render_index as f64;
    let max_index = frame.max_render_index as f64;
    let i1 = (offset_points + column_point_count * x_px as f64)
        .floor()
        .clamp(min_index, max_index) as usize;
    let i2 = (offset_points + column_point_count * (x_px as f64 + 1.0))
        .floor()
        .clamp(min_index, max_index) as usize;

    let (low, high) = frame.search.range_minmax(frame.samples, i1, i2);
    ColumnInterval {
        x_px,
        y_top: view.y_to_px(high.as_f64() + frame.y_offset),
        y_bottom: view.y_to_px(low.as_f64() + frame.y_offset),
    }
}
