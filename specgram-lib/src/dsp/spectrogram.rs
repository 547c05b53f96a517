// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Spectrogram
//!
//! *Well, that's... why I'm here!*
//!
//! The entry point.  Arguments are validated up front, so every parameter error surfaces before
//! any transform work is done.  There is no partial result: either the grid, axis descriptor and
//! color scale are all produced, or an error is.

use log::debug;
use serde::{Deserialize, Deserializer};

use crate::axis::{self, AxisDescriptor};
use crate::color::{ClipRange, ColorScale};
use crate::dsp::plan::{WindowPlan, DEFAULT_OVERLAP, DEFAULT_PAD_MULTIPLIER};
use crate::dsp::scale::{self, AmplitudeScale};
use crate::dsp::{psd, window::WindowFunction, Signal};
use crate::grid::Grid;
use crate::render::{RenderSurface, Target};
use crate::SpecgramError;

/// Every knob of the pipeline.  Only `sample_rate` lacks a usable default.
///
/// Loadable from TOML, where `pad_multiplier = false` disables padding:
///
/// ```toml
/// sample_rate = 100.0
/// overlap = 0.5
/// log_frequency = true
/// clip = [0.1, 0.9]
/// window = "hann"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpectrogramArgs {
    /// Samples per second.  Must be positive.
    pub sample_rate: f64,
    /// Fraction of each segment shared with the next, in `[0, 1)`.
    pub overlap: f64,
    /// FFT window length in seconds.  `None` means `sample_rate / 100`.
    pub window_seconds: Option<f64>,
    /// Emit mesh bin edges for a logarithmic frequency axis instead of an image extent.
    pub log_frequency: bool,
    /// Decibel amplitudes instead of square-root amplitudes.
    pub db_scale: bool,
    /// Zero-pad segments to this multiple of their length.  `None` disables padding.
    #[serde(deserialize_with = "de_pad_multiplier")]
    pub pad_multiplier: Option<f64>,
    /// Fractions of the amplitude range where the color map saturates.
    pub clip: (f64, f64),
    /// Taper applied to each segment.
    pub window: WindowFunction,
}

impl Default for SpectrogramArgs {
    fn default() -> Self {
        SpectrogramArgs {
            sample_rate: 0.0,
            overlap: DEFAULT_OVERLAP,
            window_seconds: None,
            log_frequency: false,
            db_scale: false,
            pad_multiplier: Some(DEFAULT_PAD_MULTIPLIER),
            clip: (0.0, 1.0),
            window: WindowFunction::BoxCar,
        }
    }
}

impl SpectrogramArgs {
    /// Defaults for everything but the sample rate.
    pub fn new(sample_rate: f64) -> Self {
        SpectrogramArgs {
            sample_rate,
            ..Default::default()
        }
    }

    /// Parse a TOML document.  Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, SpecgramError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PadSetting {
    Multiplier(f64),
    Enabled(bool),
}

fn de_pad_multiplier<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match PadSetting::deserialize(d)? {
        PadSetting::Multiplier(m) => Some(m),
        PadSetting::Enabled(true) => Some(DEFAULT_PAD_MULTIPLIER),
        PadSetting::Enabled(false) => None,
    })
}

/// Everything a renderer needs.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Amplitudes oriented for `axis`: ascending frequency rows for mesh edges, descending rows for
    /// an image extent.
    pub grid: Grid,
    pub axis: AxisDescriptor,
    pub color: ColorScale,
    /// Bin-center frequencies without DC, ascending.
    pub freq: Vec<f64>,
    /// Segment center times, ascending.
    pub time: Vec<f64>,
    /// Signal length in seconds.  The time axis spans `[0, duration]`.
    pub duration: f64,
    pub plan: WindowPlan,
    pub scale: AmplitudeScale,
}

impl Spectrogram {
    /// Frequency of grid row `row`, honoring the grid's orientation.
    pub fn row_frequency(&self, row: usize) -> f64 {
        if self.axis.is_log_frequency() {
            self.freq[row]
        } else {
            self.freq[self.freq.len() - 1 - row]
        }
    }

    /// Frequency of the row with the most total amplitude.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.grid.loudest_row().map(|r| self.row_frequency(r))
    }
}

/// Compute the spectrogram of `samples` with `args`.
pub fn spectrogram(samples: &[f64], args: &SpectrogramArgs) -> Result<Spectrogram, SpecgramError> {
    let signal = Signal::new(samples, args.sample_rate)?;
    let clip = ClipRange::new(args.clip.0, args.clip.1)?;
    let plan = WindowPlan::new(
        signal.len(),
        signal.sample_rate(),
        args.window_seconds,
        args.overlap,
        args.pad_multiplier,
    )?;

    let raw = psd::estimate(&signal, &plan, args.window)?;
    let scaled = scale::transform(&raw, AmplitudeScale::from_db_flag(args.db_scale));
    let color = ColorScale::from_grid(&scaled.grid, clip)?;
    let (axis, grid) = axis::bin(&scaled, args.log_frequency)?;
    debug!(
        "spectrogram {} x {}, color [{}, {}]",
        grid.rows(),
        grid.cols(),
        color.min,
        color.max
    );

    Ok(Spectrogram {
        grid,
        axis,
        color,
        freq: scaled.freq,
        time: scaled.time,
        duration: signal.duration(),
        plan,
        scale: scaled.scale,
    })
}

/// Compute and draw onto `target`.  An owned surface is handed back after drawing; a borrowed one
/// stays with the caller and `None` is returned.
pub fn spectrogram_into<S: RenderSurface>(
    samples: &[f64],
    args: &SpectrogramArgs,
    target: Target<'_, S>,
) -> Result<Option<S>, SpecgramError> {
    let sg = spectrogram(samples, args)?;
    target.present(&sg)
}
