//! Signal series: the sample buffer, its metadata, and the tree lifecycle.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SignalError;
use crate::geometry::VisibleGeometry;
use crate::numeric::SampleValue;
use crate::query::MinMaxSearch;
use crate::render::{self, SeriesFrame};
use crate::segment_tree::{SegmentTree, MAX_SAMPLES};
use crate::view::ViewWindow;

/// When and whether the min/max tree is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeMode {
    /// Build before the constructor returns.
    #[default]
    Sync,
    /// Build on a spawned thread; renders use linear scans until the tree is
    /// published.
    Background,
    /// Never build: linear scans only. The tree costs two arrays of the
    /// next power of two above the sample count, up to ~4x the raw sample
    /// memory, so the largest datasets may prefer to skip it.
    Disabled,
}

/// Diagnostic view of the tree lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeState {
    Building,
    Ready,
    Fallback,
}

/// Construction parameters for [`SignalSeries`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Data-space distance between adjacent samples; must be positive.
    pub sample_period: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    /// Inclusive start of the rendered sub-range; defaults to 0.
    pub min_render_index: Option<usize>,
    /// Inclusive end of the rendered sub-range; defaults to the last sample.
    pub max_render_index: Option<usize>,
    pub tree: TreeMode,
    /// Fan high-density column queries out on rayon.
    pub parallel: bool,
    /// Marker diameter in pixels at full zoom, for the exact render mode.
    pub marker_size: f32,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            sample_period: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
            min_render_index: None,
            max_render_index: None,
            tree: TreeMode::Sync,
            parallel: true,
            marker_size: 5.0,
        }
    }
}

#[derive(Debug)]
enum TreeSlot<T> {
    Building { epoch: u64 },
    Ready(Arc<SegmentTree<T>>),
    Fallback,
}

/// An evenly spaced numeric signal with a pixel-bounded render path.
///
/// Owns the sample buffer and keeps the min/max tree authoritative across
/// mutations. The caller owns the single-writer discipline: a series must not
/// be mutated while a render pass is reading it. The buffer and tree are held
/// behind `Arc`s, so a violated discipline degrades to a copy-on-write of the
/// touched buffer instead of a torn read, but the result of such a race is
/// still unspecified mixing of old and new frames.
#[derive(Debug)]
pub struct SignalSeries<T: SampleValue> {
    samples: Arc<Vec<T>>,
    sample_period: f64,
    x_offset: f64,
    y_offset: f64,
    min_render_index: usize,
    max_render_index: usize,
    tree_mode: TreeMode,
    parallel: bool,
    marker_size: f32,
    slot: Arc<RwLock<TreeSlot<T>>>,
    /// Stamp for in-flight background builds; bumping it abandons them.
    epoch: u64,
}

impl<T: SampleValue> SignalSeries<T> {
    /// Builds a series with default configuration and a synchronous tree build.
    pub fn new(samples: Vec<T>, sample_period: f64) -> Result<Self, SignalError> {
        Self::with_config(
            samples,
            SeriesConfig {
                sample_period,
                ..SeriesConfig::default()
            },
        )
    }

    pub fn with_config(samples: Vec<T>, config: SeriesConfig) -> Result<Self, SignalError> {
        if samples.is_empty() {
            return Err(SignalError::EmptySamples);
        }
        let len = samples.len();
        if len > MAX_SAMPLES {
            return Err(SignalError::CapacityExceeded {
                len,
                max: MAX_SAMPLES,
            });
        }
        if !(config.sample_period > 0.0) || !config.sample_period.is_finite() {
            return Err(SignalError::NonPositivePeriod {
                period: config.sample_period,
            });
        }
        let min_render_index = config.min_render_index.unwrap_or(0);
        let max_render_index = config.max_render_index.unwrap_or(len - 1);
        if min_render_index > max_render_index || max_render_index > len - 1 {
            return Err(SignalError::InvalidRenderRange {
                min: min_render_index,
                max: max_render_index,
                len,
            });
        }

        let mut series = Self {
            samples: Arc::new(samples),
            sample_period: config.sample_period,
            x_offset: config.x_offset,
            y_offset: config.y_offset,
            min_render_index,
            max_render_index,
            tree_mode: config.tree,
            parallel: config.parallel,
            marker_size: config.marker_size,
            slot: Arc::new(RwLock::new(TreeSlot::Fallback)),
            epoch: 0,
        };
        match config.tree {
            TreeMode::Sync => series.build_sync(),
            TreeMode::Background => series.spawn_build(),
            TreeMode::Disabled => {}
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Option<T> {
        self.samples.get(index).copied()
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.sample_period
    }

    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    pub fn set_x_offset(&mut self, x_offset: f64) {
        self.x_offset = x_offset;
    }

    pub fn set_y_offset(&mut self, y_offset: f64) {
        self.y_offset = y_offset;
    }

    /// Inclusive `(min, max)` sub-range of indices the render path may touch.
    pub fn render_range(&self) -> (usize, usize) {
        (self.min_render_index, self.max_render_index)
    }

    pub fn set_render_range(&mut self, min: usize, max: usize) -> Result<(), SignalError> {
        let len = self.samples.len();
        if min > max || max > len - 1 {
            return Err(SignalError::InvalidRenderRange { min, max, len });
        }
        self.min_render_index = min;
        self.max_render_index = max;
        Ok(())
    }

    pub fn set_sample_period(&mut self, period: f64) -> Result<(), SignalError> {
        if !(period > 0.0) || !period.is_finite() {
            return Err(SignalError::NonPositivePeriod { period });
        }
        self.sample_period = period;
        Ok(())
    }

    pub fn set_sample_rate(&mut self, rate: f64) -> Result<(), SignalError> {
        if !(rate > 0.0) || !rate.is_finite() {
            return Err(SignalError::NonPositiveRate { rate });
        }
        self.sample_period = 1.0 / rate;
        Ok(())
    }

    /// Replaces one sample and repairs the tree in O(log n).
    pub fn update_point(&mut self, index: usize, value: T) -> Result<(), SignalError> {
        let len = self.samples.len();
        if index >= len {
            return Err(SignalError::IndexOutOfBounds { index, len });
        }
        Arc::make_mut(&mut self.samples)[index] = value;
        self.repair_tree(|tree, samples| tree.point_update(samples, index));
        Ok(())
    }

    /// Replaces `values.len()` samples starting at `from` and repairs the
    /// tree in O(range length + log n).
    pub fn update_range(&mut self, from: usize, values: &[T]) -> Result<(), SignalError> {
        let len = self.samples.len();
        let to = from.saturating_add(values.len());
        if to > len {
            return Err(SignalError::RangeOutOfBounds { from, to, len });
        }
        if values.is_empty() {
            return Ok(());
        }
        Arc::make_mut(&mut self.samples)[from..to].copy_from_slice(values);
        self.repair_tree(|tree, samples| tree.range_update(samples, from, to));
        Ok(())
    }

    /// Replaces the whole buffer; `values` must keep the sample count.
    pub fn update_all(&mut self, values: &[T]) -> Result<(), SignalError> {
        let len = self.samples.len();
        if values.len() != len {
            return Err(SignalError::RangeOutOfBounds {
                from: 0,
                to: values.len(),
                len,
            });
        }
        self.update_range(0, values)
    }

    /// Min and max of `samples[l..=r]`, through the tree when it is ready.
    pub fn range_minmax(&self, l: usize, r: usize) -> Result<(T, T), SignalError> {
        let len = self.samples.len();
        if l > r || r >= len {
            return Err(SignalError::RangeOutOfBounds {
                from: l,
                to: r.saturating_add(1),
                len,
            });
        }
        Ok(self.search_engine().range_minmax(&self.samples, l, r))
    }

    /// Data-space extent of the render range as `(x_min, x_max, y_min, y_max)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (low, high) = self.search_engine().range_minmax(
            &self.samples,
            self.min_render_index,
            self.max_render_index,
        );
        (
            self.sample_period * self.min_render_index as f64 + self.x_offset,
            self.sample_period * self.max_render_index as f64 + self.x_offset,
            low.as_f64() + self.y_offset,
            high.as_f64() + self.y_offset,
        )
    }

    /// Produces the pixel-space polyline for one view of this series.
    pub fn visible_geometry(&self, view: &ViewWindow) -> VisibleGeometry {
        let mut out = VisibleGeometry::new();
        self.visible_geometry_into(view, &mut out);
        out
    }

    /// Like [`Self::visible_geometry`] but reuses the output's allocations.
    pub fn visible_geometry_into(&self, view: &ViewWindow, out: &mut VisibleGeometry) {
        let search = self.search_engine();
        let frame = SeriesFrame {
            samples: &self.samples,
            search: &search,
            sample_period: self.sample_period,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            min_render_index: self.min_render_index,
            max_render_index: self.max_render_index,
            parallel: self.parallel,
            marker_size: self.marker_size,
        };
        render::render_into(&frame, view, out);
    }

    pub fn tree_state(&self) -> TreeState {
        match &*self.slot.read() {
            TreeSlot::Building { .. } => TreeState::Building,
            TreeSlot::Ready(_) => TreeState::Ready,
            TreeSlot::Fallback => TreeState::Fallback,
        }
    }

    /// Explicitly retries a tree build, the only way out of
    /// [`TreeState::Fallback`]. Honors the configured [`TreeMode`] except
    /// that a `Disabled` series rebuilds synchronously.
    pub fn rebuild_tree(&mut self) {
        match self.tree_mode {
            TreeMode::Background => self.spawn_build(),
            TreeMode::Sync | TreeMode::Disabled => self.build_sync(),
        }
    }

    fn build_sync(&mut self) {
        let started = Instant::now();
        match SegmentTree::build(&self.samples) {
            Ok(tree) => {
                debug!(
                    len = self.samples.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "min/max tree built"
                );
                *self.slot.write() = TreeSlot::Ready(Arc::new(tree));
            }
            Err(failure) => {
                warn!(
                    len = self.samples.len(),
                    ?failure,
                    "tree build failed, queries fall back to linear scans"
                );
                *self.slot.write() = TreeSlot::Fallback;
            }
        }
    }

    fn spawn_build(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        *self.slot.write() = TreeSlot::Building { epoch };

        let samples = Arc::clone(&self.samples);
        let slot = Arc::clone(&self.slot);
        std::thread::spawn(move || {
            let started = Instant::now();
            let result = SegmentTree::build(&samples);
            let mut guard = slot.write();
            match *guard {
                // Publish only if no mutation superseded this build; the Arc
                // is created after the build finished, so readers see either
                // "not ready" or a complete tree, never a torn one.
                TreeSlot::Building { epoch: current } if current == epoch => match result {
                    Ok(tree) => {
                        debug!(
                            len = samples.len(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "min/max tree built in background"
                        );
                        *guard = TreeSlot::Ready(Arc::new(tree));
                    }
                    Err(failure) => {
                        warn!(
                            len = samples.len(),
                            ?failure,
                            "background tree build failed, queries fall back to linear scans"
                        );
                        *guard = TreeSlot::Fallback;
                    }
                },
                _ => {
                    debug!(len = samples.len(), "abandoning superseded tree build");
                }
            }
        });
    }

    fn repair_tree(&mut self, repair: impl FnOnce(&mut SegmentTree<T>, &[T])) {
        let needs_restart = {
            let mut guard = self.slot.write();
            match &mut *guard {
                TreeSlot::Ready(tree) => {
                    repair(Arc::make_mut(tree), &self.samples);
                    false
                }
                // An in-flight build snapshotted the pre-mutation buffer;
                // abandon it and start over on the new contents.
                TreeSlot::Building { .. } => true,
                TreeSlot::Fallback => false,
            }
        };
        if needs_restart {
            self.spawn_build();
        }
    }

    fn search_engine(&self) -> MinMaxSearch<T> {
        match &*self.slot.read() {
            TreeSlot::Ready(tree) => MinMaxSearch::Tree(Arc::clone(tree)),
            _ => MinMaxSearch::Scan,
        }
    }
}

impl<T: SampleValue> fmt::Display for SignalSeries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.tree_state() {
            TreeState::Building => "building",
            TreeState::Ready => "ready",
            TreeState::Fallback => "fallback",
        };
        write!(
            f,
            "SignalSeries with {} points, tree {}",
            self.samples.len(),
            state
        )
    }
}
