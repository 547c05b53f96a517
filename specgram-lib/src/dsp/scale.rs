// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Amplitude Scaling
//!
//! Drops the zero-frequency row and compresses power into something worth looking at.  The DC row
//! carries nothing after mean removal and would only produce `log(0)`.

use crate::dsp::psd::RawSpectrum;
use crate::grid::Grid;

/// Power below this is treated as this.  Keeps silent bins finite in decibels.
pub const POWER_FLOOR: f64 = 1e-30;
/// Decibel value of [`POWER_FLOOR`].  Exactly-zero bins end up here instead of at -inf.
pub const DB_FLOOR: f64 = -300.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmplitudeScale {
    /// Square root of power, i.e. linear amplitude.
    #[default]
    Sqrt,
    /// `10 * log10(power)`, clamped at [`DB_FLOOR`].
    Decibel,
}

impl AmplitudeScale {
    pub fn from_db_flag(dbscale: bool) -> Self {
        if dbscale { Self::Decibel } else { Self::Sqrt }
    }

    /// Scale one power value.
    pub fn apply(&self, power: f64) -> f64 {
        match self {
            Self::Sqrt => power.max(0.0).sqrt(),
            Self::Decibel => 10.0 * power.max(POWER_FLOOR).log10(),
        }
    }
}

/// [`RawSpectrum`] minus its DC row, with amplitudes scaled.
#[derive(Debug, Clone)]
pub struct ScaledSpectrum {
    pub grid: Grid,
    pub freq: Vec<f64>,
    pub time: Vec<f64>,
    pub scale: AmplitudeScale,
}

pub fn transform(raw: &RawSpectrum, scale: AmplitudeScale) -> ScaledSpectrum {
    let grid = raw.grid.drop_rows(1).map(|p| scale.apply(p));
    ScaledSpectrum {
        grid,
        freq: raw.freq.iter().skip(1).copied().collect(),
        time: raw.time.clone(),
        scale,
    }
}
