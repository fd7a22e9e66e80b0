//! Error taxonomy for series construction and mutation.

use thiserror::Error;

/// Input-shape and capacity errors reported by [`crate::SignalSeries`].
///
/// Every variant except [`SignalError::CapacityExceeded`] is an invalid-input
/// error: it is detected eagerly and fails the call that raised it, never
/// silently clamped. Allocation failure during a tree build is *not* part of
/// this taxonomy; it degrades the series to its linear-scan fallback instead
/// of surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("signal requires at least one sample")]
    EmptySamples,

    #[error("sample count {len} exceeds the supported maximum of {max}")]
    CapacityExceeded { len: usize, max: usize },

    #[error("sample period must be positive, got {period}")]
    NonPositivePeriod { period: f64 },

    #[error("sample rate must be positive, got {rate}")]
    NonPositiveRate { rate: f64 },

    #[error("render range {min}..={max} is not valid for {len} samples")]
    InvalidRenderRange { min: usize, max: usize, len: usize },

    #[error("index {index} is out of bounds for {len} samples")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("range {from}..{to} is out of bounds for {len} samples")]
    RangeOutOfBounds { from: usize, to: usize, len: usize },
}
