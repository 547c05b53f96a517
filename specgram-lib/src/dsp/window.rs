// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Window Functions
//!
//! The taper multiplied into each segment before its transform.  The default is the `BoxCar`,
//! which leaves samples untouched.  Tapered windows trade main-lobe width for lower side lobes;
//! because the estimator divides by the window's energy, power levels stay comparable between
//! choices.

use std::f64::consts::TAU as TAU64;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowFunction {
    /// Also known as the Rectangle.  -13.3dB first side lobe.  Every sample counts equally.
    #[default]
    #[serde(rename = "boxcar")]
    BoxCar,
    /// Raised cosine reaching zero at both ends.  -31.5dB first side lobe.
    Hann,
    /// Cancels its first side lobe to -42.7dB but does not reach zero at the ends.
    Hamming,
    /// Aka the Triangle.  -26.5dB first side lobe.
    Bartlett,
    /// Parabolic.  -21.3dB first side lobe.
    Welch,
}

impl WindowFunction {
    /// Symmetric window of `size` samples with a peak weight of one.
    pub fn make_window(&self, size: usize) -> Vec<f64> {
        if size <= 1 {
            return vec![1.0; size];
        }
        let m = (size - 1) as f64;
        (0..size)
            .map(|n| {
                let x = n as f64 / m;
                match self {
                    Self::BoxCar => 1.0,
                    Self::Hann => 0.5 - 0.5 * (TAU64 * x).cos(),
                    Self::Hamming => 0.54 - 0.46 * (TAU64 * x).cos(),
                    Self::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
                    Self::Welch => {
                        let t = 2.0 * x - 1.0;
                        1.0 - t * t
                    }
                }
            })
            .collect()
    }
}

/// Sum of squared weights.  Dividing power by this undoes the loss introduced by tapering.
pub fn energy(window: &[f64]) -> f64 {
    window.iter().map(|w| w * w).sum()
}
