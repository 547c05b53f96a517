// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Digital Signal Processing
//!
//! The numerical half of the crate.  The stages are small and kept in separate modules so that
//! each one can be checked on its own:
//!
//! - [`plan`] derives the FFT length, overlap and padding for a signal.
//! - [`window`] holds the taper applied to each segment.  The boxcar is the default.
//! - [`psd`] runs the short-time transform and produces raw power.
//! - [`scale`] turns power into displayable amplitude.
//! - [`spectrogram`] wires the stages together behind one entry point.
//!
//! This module itself holds the few helpers every stage leans on: FFT size selection, the
//! validated [`Signal`] view, mean removal, and sine generators for exercising the pipeline.

use std::f64::consts::TAU as TAU64;

use crate::SpecgramError;

pub mod plan;
pub mod psd;
pub mod scale;
pub mod spectrogram;
pub mod window;

/// Return the power of two nearest to `x`.  Ties go to the smaller power.
///
/// `x` must be positive.  Exact powers of two are returned unchanged, and values below one yield
/// fractional powers such as `0.5`, which callers converting to a sample count must reject.
pub fn nearest_pow2(x: f64) -> f64 {
    debug_assert!(x > 0.0, "nearest_pow2 requires a positive input, got {x}");
    let exp = x.log2();
    let a = exp.ceil().exp2();
    let b = exp.floor().exp2();
    if (a - x).abs() < (b - x).abs() { a } else { b }
}

/// A borrowed, validated view of uniformly sampled real data.
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    samples: &'a [f64],
    sample_rate: f64,
}

impl<'a> Signal<'a> {
    /// Checks that the sample rate is a positive number and that every sample is finite.
    pub fn new(samples: &'a [f64], sample_rate: f64) -> Result<Self, SpecgramError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SpecgramError::InvalidParameter(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SpecgramError::InvalidParameter(format!(
                "sample {i} is not finite: {}",
                samples[i]
            )));
        }
        Ok(Signal {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &'a [f64] {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the recording in seconds.  This is the right edge of the time axis.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

/// Arithmetic mean of `samples`, zero when empty.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Copy of `samples` with the mean subtracted.  Removes DC bias so that the zero-frequency bin
/// does not swamp everything else.
pub fn detrend_mean(samples: &[f64]) -> Vec<f64> {
    let m = mean(samples);
    samples.iter().map(|s| s - m).collect()
}

/// Fixed sine wave generator.
pub fn sine_gen(f0: f64, fs: f64) -> impl Iterator<Item = f64> {
    SineSweeper::new(f0, fs)
}

/// Sine wave generator with frequency modulation.  Use to generate rough chirps when checking
/// that energy lands in the expected rows over time.
pub struct SineSweeper {
    re: f64,
    im: f64,
    cos: f64,
    sin: f64,
    fs: f64,
    f0: f64,
}

impl SineSweeper {
    pub fn new(f0: f64, fs: f64) -> Self {
        let omega = TAU64 * f0 / fs;
        Self {
            re: 1.0,
            im: 0.0,
            cos: omega.cos(),
            sin: omega.sin(),
            fs,
            f0,
        }
    }

    /// Update the frequency on the fly.  Phase is continuous across the change.
    pub fn set_frequency(&mut self, f0: f64) {
        let omega = TAU64 * f0 / self.fs;
        self.cos = omega.cos();
        self.sin = omega.sin();
        self.f0 = f0;
    }

    /// Read the current frequency.
    pub fn center(&self) -> f64 {
        self.f0
    }

    /// Return the number of samples required to cover `nwaves` full cycles.
    pub fn nsamples(&self, nwaves: f64) -> usize {
        (self.fs / self.f0 * nwaves).ceil() as usize
    }
}

impl Iterator for SineSweeper {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.im;
        let new_re = self.re * self.cos - self.im * self.sin;
        let new_im = self.re * self.sin + self.im * self.cos;
        // Renormalize so long runs do not drift in amplitude.
        let norm = (new_re * new_re + new_im * new_im).sqrt();
        self.re = new_re / norm;
        self.im = new_im / norm;
        Some(out)
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_nearest_pow2_examples() {
        assert_eq!(nearest_pow2(3.0), 2.0);
        assert_eq!(nearest_pow2(15.0), 16.0);
        assert_eq!(nearest_pow2(8.0), 8.0);
        assert_eq!(nearest_pow2(100.0), 128.0);
        assert_eq!(nearest_pow2(12.5), 16.0);
    }

    #[test]
    fn test_nearest_pow2_tie_goes_low() {
        // 6 is exactly between 4 and 8, 12 between 8 and 16.
        assert_eq!(nearest_pow2(6.0), 4.0);
        assert_eq!(nearest_pow2(12.0), 8.0);
        assert_eq!(nearest_pow2(0.75), 0.5);
    }

    #[test]
    fn test_nearest_pow2_no_closer_power() {
        for i in 1..5000 {
            let x = i as f64 * 0.37;
            let p = nearest_pow2(x);
            assert_eq!(p.log2().fract(), 0.0, "{p} is not a power of two");
            for e in -4..16 {
                let q = 2f64.powi(e);
                assert!((q - x).abs() >= (p - x).abs(), "{q} is closer to {x} than {p}");
            }
        }
    }

    #[test]
    fn test_signal_validation() {
        let s = [0.0, 1.0, 2.0, 3.0];
        assert!(matches!(
            Signal::new(&s, 0.0),
            Err(SpecgramError::InvalidParameter(_))
        ));
        assert!(matches!(
            Signal::new(&s, -10.0),
            Err(SpecgramError::InvalidParameter(_))
        ));
        assert!(matches!(
            Signal::new(&[0.0, f64::NAN], 10.0),
            Err(SpecgramError::InvalidParameter(_))
        ));
        let signal = Signal::new(&s, 2.0).unwrap();
        assert_eq!(signal.len(), 4);
        assert_abs_diff_eq!(signal.duration(), 2.0);
    }

    #[test]
    fn test_detrend_mean() {
        let out = detrend_mean(&[1.0, 2.0, 3.0, 6.0]);
        assert_abs_diff_eq!(mean(&out), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0], -2.0, epsilon = 1e-12);
        assert!(detrend_mean(&[]).is_empty());
    }

    #[test]
    fn test_sine_gen_rms() {
        let f0: f64 = 123.0;
        let fs: f64 = 48_000.0;
        let n = (7777.0 * fs / f0).ceil() as usize;

        let sum_sq: f64 = sine_gen(f0, fs).take(n).map(|s| s * s).sum();
        let rms = (sum_sq / n as f64).sqrt();

        assert_abs_diff_eq!(rms, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn test_sine_sweeper_cycles() {
        let mut s = SineSweeper::new(50.0, 1000.0);
        assert_eq!(s.nsamples(3.0), 60);
        s.set_frequency(250.0);
        assert_eq!(s.center(), 250.0);
        assert_eq!(s.nsamples(3.0), 12);

        // A quarter period in, the wave sits at its peak.
        let peak = s.nth(1).unwrap();
        assert_abs_diff_eq!(peak, 1.0, epsilon = 1e-9);
    }
}
