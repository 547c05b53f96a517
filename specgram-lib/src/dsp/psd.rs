// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Power Spectral Density
//!
//! Short-time estimation of one-sided power spectral density.  The mean of the whole signal is
//! removed first, then overlapping segments of `nfft` samples are windowed, zero-padded to the
//! plan's transform length and transformed.  Each segment becomes one column of the output.
//!
//! Scaling follows the usual density convention: `|X[k]|^2 / (fs * sum(w^2))`, doubled for every
//! bin except DC and Nyquist to fold the negative frequencies in.  Summing a column times the bin
//! width therefore gives back the mean square of the segment.

use log::trace;
use num_complex::Complex;
use realfft::RealFftPlanner;

use crate::dsp::{self, plan::WindowPlan, window, window::WindowFunction, Signal};
use crate::grid::Grid;
use crate::SpecgramError;

/// Direct output of the estimator.  Rows of `grid` line up with `freq` and columns with `time`.
#[derive(Debug, Clone)]
pub struct RawSpectrum {
    /// Non-negative power, `grid.get(f, t)`.
    pub grid: Grid,
    /// Bin frequencies in Hz, ascending from zero.
    pub freq: Vec<f64>,
    /// Segment center times in seconds, ascending.
    pub time: Vec<f64>,
}

/// Estimate the spectrogram of `signal` as segmented by `plan`.
///
/// Fails with [`SpecgramError::Configuration`] when the plan's segments are longer than the
/// signal.  Otherwise the result is a pure function of the inputs.
pub fn estimate(
    signal: &Signal,
    plan: &WindowPlan,
    window_choice: WindowFunction,
) -> Result<RawSpectrum, SpecgramError> {
    let npts = signal.len();
    let nfft = plan.nfft();
    if nfft > npts {
        return Err(SpecgramError::Configuration(format!(
            "nfft {nfft} exceeds the {npts} available samples"
        )));
    }

    let fs = signal.sample_rate();
    let data = dsp::detrend_mean(signal.samples());
    let fft_len = plan.fft_len();
    let rows = plan.freq_rows();
    let cols = plan.segments(npts);
    let step = plan.step();
    trace!("estimating {rows} x {cols}, fft length {fft_len}, step {step}");

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(fft_len);
    let mut input = r2c.make_input_vec();
    let mut spectrum: Vec<Complex<f64>> = r2c.make_output_vec();
    let mut scratch = r2c.make_scratch_vec();

    let window = window_choice.make_window(nfft);
    let scale = 1.0 / (fs * window::energy(&window));
    let nyquist = (fft_len % 2 == 0).then_some(fft_len / 2);

    let mut grid = Grid::zeros(rows, cols);
    for col in 0..cols {
        let start = col * step;
        let segment = &data[start..start + nfft];
        for (inp, (&s, &w)) in input.iter_mut().zip(segment.iter().zip(window.iter())) {
            *inp = s * w;
        }
        // Padding region.  The transform may use the input as scratch, so refill every time.
        input[nfft..].iter_mut().for_each(|v| *v = 0.0);

        r2c.process_with_scratch(&mut input, &mut spectrum, &mut scratch)?;

        for (k, c) in spectrum.iter().enumerate() {
            let one_sided = if k == 0 || Some(k) == nyquist { 1.0 } else { 2.0 };
            let power = c.norm_sqr() * scale * one_sided;
            if !power.is_finite() {
                return Err(SpecgramError::InvalidParameter(format!(
                    "power of segment {col} overflows at {:.3} Hz, sample magnitudes are too large",
                    k as f64 * fs / fft_len as f64
                )));
            }
            grid.set(k, col, power);
        }
    }

    let freq = (0..rows).map(|k| k as f64 * fs / fft_len as f64).collect();
    let half = nfft as f64 / 2.0;
    let time = (0..cols)
        .map(|col| ((col * step) as f64 + half) / fs)
        .collect();

    Ok(RawSpectrum { grid, freq, time })
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    fn plan(npts: usize, fs: f64, pad: Option<f64>) -> WindowPlan {
        WindowPlan::new(npts, fs, None, 0.9, pad).unwrap()
    }

    #[test]
    fn test_psd_shape_and_axes() {
        let samples: Vec<f64> = dsp::sine_gen(5.0, 100.0).take(1000).collect();
        let signal = Signal::new(&samples, 100.0).unwrap();
        let raw = estimate(&signal, &plan(1000, 100.0, None), WindowFunction::BoxCar).unwrap();

        assert_eq!(raw.grid.rows(), 65);
        assert_eq!(raw.grid.cols(), 68);
        assert_eq!(raw.freq.len(), raw.grid.rows());
        assert_eq!(raw.time.len(), raw.grid.cols());

        assert_eq!(raw.freq[0], 0.0);
        assert_relative_eq!(raw.freq[1], 100.0 / 128.0);
        assert_relative_eq!(raw.freq[64], 50.0);
        assert_relative_eq!(raw.time[0], 0.64);
        assert_relative_eq!(raw.time[1], 0.77);
        assert!(raw.grid.as_slice().iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_psd_padding_refines_frequency() {
        let samples: Vec<f64> = dsp::sine_gen(5.0, 100.0).take(1000).collect();
        let signal = Signal::new(&samples, 100.0).unwrap();
        let raw = estimate(&signal, &plan(1000, 100.0, Some(8.0)), WindowFunction::BoxCar).unwrap();

        assert_eq!(raw.grid.rows(), 513);
        assert_eq!(raw.grid.cols(), 68);
        assert_relative_eq!(raw.freq[1], 100.0 / 1024.0);
    }

    #[test]
    fn test_psd_sine_peak() {
        // 125 Hz sits exactly on bin 32 of a 256 point transform at 1 kHz.
        let samples: Vec<f64> = dsp::sine_gen(125.0, 1000.0).take(4096).collect();
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let plan = WindowPlan::from_parts(256, 128, None).unwrap();
        for wf in [WindowFunction::BoxCar, WindowFunction::Hann] {
            let raw = estimate(&signal, &plan, wf).unwrap();
            assert_eq!(raw.grid.loudest_row(), Some(32), "{wf:?}");
        }
    }

    #[test]
    fn test_psd_rejects_overflowing_power() {
        let samples: Vec<f64> = dsp::sine_gen(5.0, 100.0).take(1000).map(|s| s * 1e200).collect();
        let signal = Signal::new(&samples, 100.0).unwrap();
        assert!(matches!(
            estimate(&signal, &plan(1000, 100.0, None), WindowFunction::BoxCar),
            Err(SpecgramError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_psd_column_power_matches_mean_square() {
        let samples: Vec<f64> = (0..2048).map(|_| rand::random_range(-1.0..1.0)).collect();
        let signal = Signal::new(&samples, 500.0).unwrap();
        let plan = WindowPlan::from_parts(128, 64, None).unwrap();
        let raw = estimate(&signal, &plan, WindowFunction::BoxCar).unwrap();

        let detrended = dsp::detrend_mean(&samples);
        let df = raw.freq[1];
        for col in [0, 7, raw.grid.cols() - 1] {
            let start = col * plan.step();
            let seg = &detrended[start..start + 128];
            let mean_square = seg.iter().map(|s| s * s).sum::<f64>() / 128.0;
            let integrated: f64 = (0..raw.grid.rows()).map(|r| raw.grid.get(r, col)).sum::<f64>() * df;
            assert_relative_eq!(integrated, mean_square, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_psd_constant_signal_is_silent() {
        let samples = vec![3.5; 512];
        let signal = Signal::new(&samples, 10.0).unwrap();
        let plan = WindowPlan::from_parts(64, 32, Some(128)).unwrap();
        let raw = estimate(&signal, &plan, WindowFunction::BoxCar).unwrap();
        assert!(raw.grid.as_slice().iter().all(|p| *p < 1e-20));
    }

    #[test]
    fn test_psd_rejects_long_segments() {
        let samples = vec![0.0; 100];
        let signal = Signal::new(&samples, 10.0).unwrap();
        let plan = WindowPlan::from_parts(128, 0, None).unwrap();
        assert!(matches!(
            estimate(&signal, &plan, WindowFunction::BoxCar),
            Err(SpecgramError::Configuration(_))
        ));
    }
}
