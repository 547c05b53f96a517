// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Color Normalization
//!
//! Color bounds are chosen as fractions of the amplitude range rather than absolute values.  A clip
//! range of `(0.1, 0.9)` makes the quietest tenth of the range one color and the loudest tenth
//! another, which keeps a single hot bin from washing out the rest of the picture.

use log::warn;

use crate::grid::Grid;
use crate::SpecgramError;

/// Fractional clip bounds, `0 <= low < high <= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    low: f64,
    high: f64,
}

impl ClipRange {
    pub fn new(low: f64, high: f64) -> Result<Self, SpecgramError> {
        // Written to also reject NaN.
        if !(low >= 0.0 && high <= 1.0 && low < high) {
            return Err(SpecgramError::InvalidParameter(format!(
                "clip range must satisfy 0 <= low < high <= 1, got ({low}, {high})"
            )));
        }
        Ok(ClipRange { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for ClipRange {
    fn default() -> Self {
        ClipRange {
            low: 0.0,
            high: 1.0,
        }
    }
}

/// Display bounds for the color map.  Values outside `[min, max]` are clamped, not discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Bounds at `clip.low` and `clip.high` of the way through the values of `grid`.
    ///
    /// A grid holding infinities or NaN is a `Configuration` error.  A constant grid yields
    /// `min == max`.  That is logged as a warning, not an error, and
    /// [`normalize`](Self::normalize) maps everything to zero.
    pub fn from_grid(grid: &Grid, clip: ClipRange) -> Result<Self, SpecgramError> {
        let (lo, hi) = grid
            .min_max()
            .ok_or_else(|| SpecgramError::Configuration("cannot scale an empty grid".into()))?;
        let range = hi - lo;
        if !range.is_finite() || grid.as_slice().iter().any(|v| v.is_nan()) {
            return Err(SpecgramError::Configuration(format!(
                "amplitude range [{lo}, {hi}] is not finite"
            )));
        }
        if range == 0.0 {
            warn!("amplitude range is zero (constant input?), every value maps to one color");
        }
        Ok(ColorScale {
            min: lo + clip.low * range,
            max: lo + clip.high * range,
        })
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0
    }

    /// Position of `value` within the bounds, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((value - self.min) / self.width()).clamp(0.0, 1.0)
    }
}
