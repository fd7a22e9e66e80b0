//! Visible window and data-to-pixel projection.

use serde::{Deserialize, Serialize};

/// The visible slice of the plot and the pixel size of the draw surface.
///
/// Supplied by the hosting viewport for every render pass and never stored
/// by the engine. Pixel row 0 is the top edge, so the y projection flips.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub width_px: usize,
    pub height_px: usize,
}

impl ViewWindow {
    pub fn new(x: (f64, f64), y: (f64, f64), width_px: usize, height_px: usize) -> Self {
        Self {
            x_min: x.0,
            x_max: x.1,
            y_min: y.0,
            y_max: y.1,
            width_px,
            height_px,
        }
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Horizontal pixels per data unit.
    pub fn px_per_x_unit(&self) -> f64 {
        self.width_px as f64 / self.x_span()
    }

    pub fn x_to_px(&self, x: f64) -> f32 {
        ((x - self.x_min) * self.px_per_x_unit()) as f32
    }

    pub fn y_to_px(&self, y: f64) -> f32 {
        let scale = self.height_px as f64 / self.y_span();
        (self.height_px as f64 - (y - self.y_min) * scale) as f32
    }

    /// True when nothing can be drawn into this window.
    pub fn is_degenerate(&self) -> bool {
        self.width_px == 0
            || self.height_px == 0
            || !(self.x_span() > 0.0)
            || !(self.y_span() > 0.0)
            || !self.x_span().is_finite()
            || !self.y_span().is_finite()
    }
}
