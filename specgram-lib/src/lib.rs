// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core spectrogram computation.
//!
//! A complete, in-memory, single-channel signal goes in.  A grid of power amplitudes comes out,
//! together with the axis information and color bounds a renderer needs to draw it.  Drawing
//! itself is not done here.  Renderers implement [`render::RenderSurface`] and receive the
//! finished [`Spectrogram`].
//!
//! The pipeline runs strictly left to right:
//!
//! 1. [`dsp::plan`] picks the FFT length, overlap and zero-padding from sampling parameters.
//! 2. [`dsp::psd`] removes the mean and estimates the short-time power spectral density.
//! 3. [`dsp::scale`] drops the zero-frequency row and applies decibel or square-root scaling.
//! 4. [`color`] derives clipped color bounds, and [`axis`] derives bin edges or an extent.
//!
//! Every stage is a pure function of its inputs.  Nothing is cached between calls, so independent
//! invocations may run concurrently without coordination.
//!
//! ```no_run
//! use specgram_lib::prelude::*;
//!
//! let samples: Vec<f64> = dsp::sine_gen(5.0, 100.0).take(1000).collect();
//! let args = SpectrogramArgs {
//!     log_frequency: true,
//!     ..SpectrogramArgs::new(100.0)
//! };
//! let sg = spectrogram(&samples, &args)?;
//! println!("{} x {}", sg.grid.rows(), sg.grid.cols());
//! # Ok::<(), SpecgramError>(())
//! ```

pub mod axis;
pub mod color;
pub mod dsp;
pub mod grid;
pub mod render;

pub use dsp::spectrogram::{spectrogram, spectrogram_into, Spectrogram, SpectrogramArgs};

pub mod prelude {
    pub use crate::axis::{AxisDescriptor, Extent};
    pub use crate::color::{ClipRange, ColorScale};
    pub use crate::dsp::{self, plan::WindowPlan, window::WindowFunction, Signal};
    pub use crate::grid::Grid;
    pub use crate::render::{RenderSurface, Target};
    pub use crate::{spectrogram, spectrogram_into, SpecgramError, Spectrogram, SpectrogramArgs};
}

#[derive(thiserror::Error, Debug)]
pub enum SpecgramError {
    /// An argument is outside of its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The arguments are individually valid but the signal cannot be windowed with them.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reported by a [`render::RenderSurface`] that failed to draw.
    #[error("render: {0}")]
    Render(String),

    #[error("fft: {0}")]
    Fft(#[from] realfft::FftError),

    #[error("config file: {0}")]
    ConfigFile(#[from] toml::de::Error),
}
