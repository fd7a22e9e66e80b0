//! Array-backed min/max segment tree over a sample buffer.
//!
//! Two flat 1-indexed arrays (`tree_min`, `tree_max`) sized to the smallest
//! power of two `n >= len` form an implicit complete binary tree: root at 1,
//! children of `i` at `2i` and `2i + 1`. The leaf region `[n/2, n)` holds the
//! pairwise min/max of adjacent sample pairs, so the tree costs two arrays of
//! `n` elements: up to ~4x the raw sample footprint in the worst case
//! (`len` just above a power of two). Callers that cannot afford that should
//! skip the tree entirely and query through the linear scan path.

use crate::numeric::SampleValue;

/// Hard cap on the sample count a tree can cover.
///
/// Leaf indices are computed as `n/2 + index/2` with `n` the power of two
/// rounded up from the sample count; past 2^30 that arithmetic no longer fits
/// the address space comfortably on 32-bit targets and the two backing arrays
/// stop being a sane allocation anywhere. Larger buffers must be rejected
/// up front rather than truncated.
pub const MAX_SAMPLES: usize = 1 << 30;

/// Why a tree could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFailure {
    /// More samples than the index arithmetic supports; permanent for this input.
    Capacity(usize),
    /// The backing arrays could not be allocated; the caller may retry or
    /// degrade to linear scans.
    Allocation,
}

/// Min/max segment tree, immutable-by-default snapshot of one buffer state.
///
/// Queries and updates take the sample buffer as a parameter: the buffer is
/// owned by the series, and boundary samples that have no fully-covered leaf
/// pair are read straight from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTree<T> {
    tree_min: Vec<T>,
    tree_max: Vec<T>,
    /// Size of each tree array; smallest power of two >= the sample count.
    n: usize,
}

impl<T: SampleValue> SegmentTree<T> {
    /// Builds both trees bottom-up in O(n).
    ///
    /// Pads leaves past the end of the buffer with sentinels so they never
    /// influence a query. Allocation goes through `try_reserve_exact` so an
    /// out-of-memory condition comes back as [`BuildFailure::Allocation`]
    /// instead of aborting the process.
    pub fn build(samples: &[T]) -> Result<Self, BuildFailure> {
        let len = samples.len();
        debug_assert!(len > 0, "series constructors reject empty buffers");
        if len > MAX_SAMPLES {
            return Err(BuildFailure::Capacity(len));
        }
        let n = len.next_power_of_two();

        let mut tree_min: Vec<T> = Vec::new();
        tree_min
            .try_reserve_exact(n)
            .map_err(|_| BuildFailure::Allocation)?;
        tree_min.resize(n, T::MAX_SENTINEL);

        let mut tree_max: Vec<T> = Vec::new();
        tree_max
            .try_reserve_exact(n)
            .map_err(|_| BuildFailure::Allocation)?;
        tree_max.resize(n, T::MIN_SENTINEL);

        // Bottom layer: one leaf per adjacent sample pair.
        for i in 0..len / 2 {
            tree_min[n / 2 + i] = T::min2(samples[2 * i], samples[2 * i + 1]);
            tree_max[n / 2 + i] = T::max2(samples[2 * i], samples[2 * i + 1]);
        }
        if len % 2 == 1 {
            // Odd buffer: the last sample has no pair and is its own leaf.
            tree_min[n / 2 + len / 2] = samples[len - 1];
            tree_max[n / 2 + len / 2] = samples[len - 1];
        }

        for i in (1..n / 2).rev() {
            tree_min[i] = T::min2(tree_min[2 * i], tree_min[2 * i + 1]);
            tree_max[i] = T::max2(tree_max[2 * i], tree_max[2 * i + 1]);
        }

        Ok(Self {
            tree_min,
            tree_max,
            n,
        })
    }

    /// Number of elements in each tree array.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Repairs the tree after `samples[index]` changed, in O(log n).
    ///
    /// Recomputes the leaf covering the index, then walks ancestors and stops
    /// the moment a recomputed node keeps its previous value; nothing above
    /// it can change either.
    pub fn point_update(&mut self, samples: &[T], index: usize) {
        let len = samples.len();
        let n = self.n;
        let leaf = n / 2 + index / 2;

        if index == len - 1 && len % 2 == 1 {
            self.tree_min[leaf] = samples[index];
            self.tree_max[leaf] = samples[index];
        } else {
            let pair = index ^ 1;
            self.tree_min[leaf] = T::min2(samples[index], samples[pair]);
            self.tree_max[leaf] = T::max2(samples[index], samples[pair]);
        }

        self.climb_min(leaf / 2);
        self.climb_max(leaf / 2);
    }

    /// Repairs the tree after `samples[from..to]` changed.
    ///
    /// Recomputes the touched leaf pairs directly (O(range length)), then
    /// propagates level by level; once the dirty range collapses to a single
    /// node per level it switches to the same early-exit climb as
    /// [`Self::point_update`]. The result is identical to rebuilding from
    /// scratch on the post-update buffer.
    pub fn range_update(&mut self, samples: &[T], from: usize, to: usize) {
        if from >= to {
            return;
        }
        let len = samples.len();
        let n = self.n;

        let first_pair = from / 2;
        let last_pair = (to - 1) / 2;
        for p in first_pair..=last_pair {
            let leaf = n / 2 + p;
            let a = 2 * p;
            let b = a + 1;
            if b < len {
                self.tree_min[leaf] = T::min2(samples[a], samples[b]);
                self.tree_max[leaf] = T::max2(samples[a], samples[b]);
            } else {
                self.tree_min[leaf] = samples[a];
                self.tree_max[leaf] = samples[a];
            }
        }

        let mut lo = (n / 2 + first_pair) / 2;
        let mut hi = (n / 2 + last_pair) / 2;
        while lo > 0 {
            if lo == hi {
                self.climb_min(lo);
                self.climb_max(lo);
                break;
            }
            for i in lo..=hi {
                self.tree_min[i] = T::min2(self.tree_min[2 * i], self.tree_min[2 * i + 1]);
                self.tree_max[i] = T::max2(self.tree_max[2 * i], self.tree_max[2 * i + 1]);
            }
            lo /= 2;
            hi /= 2;
        }
    }

    /// Min and max of `samples[l..=r]` in O(log n).
    ///
    /// Boundary samples whose leaf pair straddles the range edge (`l` odd,
    /// `r` even) are read from the buffer directly; from there the standard
    /// iterative climb combines tree nodes hanging off the shrinking window.
    pub fn range_query(&self, samples: &[T], l: usize, r: usize) -> (T, T) {
        if l == r {
            return (samples[l], samples[l]);
        }
        let n = self.n;
        let mut lowest = T::MAX_SENTINEL;
        let mut highest = T::MIN_SENTINEL;

        if l & 1 == 1 {
            // Right child of its pair: the leaf also covers l - 1.
            lowest = T::min2(lowest, samples[l]);
            highest = T::max2(highest, samples[l]);
        }
        if r & 1 == 0 {
            // Left child of its pair: the leaf also covers r + 1.
            lowest = T::min2(lowest, samples[r]);
            highest = T::max2(highest, samples[r]);
        }

        let mut l = (n + l + 1) / 2;
        let mut r = (n + r - 1) / 2;
        while l <= r {
            if l & 1 == 1 {
                lowest = T::min2(lowest, self.tree_min[l]);
                highest = T::max2(highest, self.tree_max[l]);
            }
            if r & 1 == 0 {
                lowest = T::min2(lowest, self.tree_min[r]);
                highest = T::max2(highest, self.tree_max[r]);
            }
            l = (l + 1) / 2;
            r = (r - 1) / 2;
        }

        (lowest, highest)
    }

    fn climb_min(&mut self, mut i: usize) {
        while i > 0 {
            let candidate = T::min2(self.tree_min[2 * i], self.tree_min[2 * i + 1]);
            if self.tree_min[i] == candidate {
                break;
            }
            self.tree_min[i] = candidate;
            i /= 2;
        }
    }

    fn climb_max(&mut self, mut i: usize) {
        while i > 0 {
            let candidate = T::max2(self.tree_max[2 * i], self.tree_max[2 * i + 1]);
            if self.tree_max[i] == candidate {
                break;
            }
            self.tree_max[i] = candidate;
            i /= 2;
        }
    }
}
