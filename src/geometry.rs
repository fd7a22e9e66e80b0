//! Vertex-list output consumed by an external rasterizer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How the visible range was turned into vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Nothing visible; the vertex list is empty.
    Empty,
    /// The whole series collapses into one pixel column: a single vertical
    /// segment spanning the full render range's envelope.
    SingleColumn,
    /// More than one sample per pixel column: a column-wise min/max polyline,
    /// two vertices per column.
    HighDensity,
    /// At most one sample per pixel column: one vertex per visible sample,
    /// no aggregation.
    LowDensity,
}

/// Ordered pixel-space polyline for one render pass.
///
/// Vertices run left to right in pixel-column order (sample order in
/// [`RenderMode::LowDensity`]); the rasterizer draws them as connected line
/// segments. Reuse one instance across frames through
/// [`crate::SignalSeries::visible_geometry_into`] to keep the vertex
/// allocation warm.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleGeometry {
    pub mode: RenderMode,
    pub vertices: Vec<Vec2>,
    /// Marker radius in pixels for [`RenderMode::LowDensity`]; zero in every
    /// other mode. Markers shrink as the view zooms out so they fade instead
    /// of popping.
    pub marker_radius_px: f32,
}

impl VisibleGeometry {
    pub fn new() -> Self {
        Self {
            mode: RenderMode::Empty,
            vertices: Vec::new(),
            marker_radius_px: 0.0,
        }
    }

    /// Whether sample markers should be drawn on top of the polyline.
    pub fn markers_visible(&self) -> bool {
        self.marker_radius_px > 0.25
    }

    pub(crate) fn reset(&mut self) {
        self.mode = RenderMode::Empty;
        self.vertices.clear();
        self.marker_radius_px = 0.0;
    }
}

impl Default for VisibleGeometry {
    fn default() -> Self {
        Self::new()
    }
}
