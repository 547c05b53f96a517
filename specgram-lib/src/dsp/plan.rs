// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Segmentation Plan
//!
//! Before any transform runs we decide how the signal is cut up: the FFT length, how many samples
//! neighboring segments share, and how far each segment is zero-padded.  All of the "will this
//! even work" questions are answered here, so a bad configuration fails before the estimator
//! allocates anything.

use log::{debug, warn};

use crate::dsp::nearest_pow2;
use crate::SpecgramError;

/// Fraction of each segment shared with the next one.
pub const DEFAULT_OVERLAP: f64 = 0.9;
/// Segments are zero-padded to this many times their length, rounded to a power of two.
pub const DEFAULT_PAD_MULTIPLIER: f64 = 8.0;
/// Largest accepted pad multiplier after rounding.
pub const MAX_PAD_MULTIPLIER: f64 = 1024.0;

/// How the signal is segmented for the short-time transform.
///
/// `0 <= noverlap < nfft` always holds, and `nfft` is a power of two no longer than the signal the
/// plan was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    nfft: usize,
    noverlap: usize,
    pad_to: Option<usize>,
}

impl WindowPlan {
    /// Derive a plan for `npts` samples taken at `sample_rate`.
    ///
    /// - `window_seconds` defaults to `sample_rate / 100` when `None`.
    /// - `overlap` is the shared fraction of neighboring segments, in `[0, 1)`.
    /// - `pad_multiplier` enables zero padding to `nearest_pow2(mult) * nfft`.  The rounded
    ///   multiplier may not exceed [`MAX_PAD_MULTIPLIER`].
    ///
    /// When the requested window is longer than the signal, the FFT length falls back to the power
    /// of two nearest an eighth of the signal.  The plan is rejected when that is still not usable,
    /// or when it would produce fewer than two segments or two non-DC frequency rows, since a single
    /// bin has no width for the axis to center on.
    pub fn new(
        npts: usize,
        sample_rate: f64,
        window_seconds: Option<f64>,
        overlap: f64,
        pad_multiplier: Option<f64>,
    ) -> Result<Self, SpecgramError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SpecgramError::InvalidParameter(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if !(0.0..1.0).contains(&overlap) {
            return Err(SpecgramError::InvalidParameter(format!(
                "overlap fraction must lie in [0, 1), got {overlap}"
            )));
        }
        let wlen = window_seconds.unwrap_or(sample_rate / 100.0);
        if !(wlen.is_finite() && wlen > 0.0) {
            return Err(SpecgramError::InvalidParameter(format!(
                "window length must be positive, got {wlen}"
            )));
        }
        let mult = match pad_multiplier {
            Some(m) if !(m.is_finite() && m > 0.0) => {
                return Err(SpecgramError::InvalidParameter(format!(
                    "pad multiplier must be positive, got {m}"
                )));
            }
            Some(m) => {
                let rounded = nearest_pow2(m);
                if rounded < 1.0 {
                    return Err(SpecgramError::InvalidParameter(format!(
                        "pad multiplier {m} rounds below one"
                    )));
                }
                if rounded > MAX_PAD_MULTIPLIER {
                    return Err(SpecgramError::InvalidParameter(format!(
                        "pad multiplier {m} exceeds {MAX_PAD_MULTIPLIER}"
                    )));
                }
                Some(rounded as usize)
            }
            None => None,
        };
        if npts == 0 {
            return Err(SpecgramError::Configuration("signal is empty".into()));
        }

        let mut nfft = nearest_pow2(wlen * sample_rate);
        if nfft > npts as f64 {
            let fallback = nearest_pow2(npts as f64 / 8.0);
            warn!(
                "window of {nfft} samples exceeds signal length {npts}, using {fallback} instead"
            );
            nfft = fallback;
        }
        // Fractional powers truncate to zero and are caught below.
        let nfft = nfft as usize;
        if nfft < 2 || nfft > npts {
            return Err(SpecgramError::Configuration(format!(
                "signal of {npts} samples is too short to window (nfft = {nfft})"
            )));
        }

        let noverlap = (nfft as f64 * overlap).floor() as usize;
        let pad_to = match mult {
            Some(m) => Some(nfft.checked_mul(m).ok_or_else(|| {
                SpecgramError::Configuration(format!("padding {nfft} samples {m} times overflows"))
            })?),
            None => None,
        };
        let plan = WindowPlan {
            nfft,
            noverlap,
            pad_to,
        };
        plan.check_bins(npts)?;

        debug!(
            "plan: nfft {} noverlap {} pad_to {:?} segments {} rows {}",
            plan.nfft,
            plan.noverlap,
            plan.pad_to,
            plan.segments(npts),
            plan.freq_rows()
        );
        Ok(plan)
    }

    /// Build a plan from explicit parts, bypassing size selection.  The estimator still checks it
    /// against the signal length.
    pub fn from_parts(
        nfft: usize,
        noverlap: usize,
        pad_to: Option<usize>,
    ) -> Result<Self, SpecgramError> {
        if nfft == 0 {
            return Err(SpecgramError::InvalidParameter("nfft must be positive".into()));
        }
        if noverlap >= nfft {
            return Err(SpecgramError::InvalidParameter(format!(
                "overlap of {noverlap} samples must be shorter than nfft {nfft}"
            )));
        }
        if let Some(p) = pad_to {
            if p < nfft {
                return Err(SpecgramError::InvalidParameter(format!(
                    "cannot pad {nfft} samples down to {p}"
                )));
            }
        }
        Ok(WindowPlan {
            nfft,
            noverlap,
            pad_to,
        })
    }

    /// Samples per segment before padding.
    pub fn nfft(&self) -> usize {
        self.nfft
    }

    /// Samples shared by neighboring segments.
    pub fn noverlap(&self) -> usize {
        self.noverlap
    }

    /// Zero padding target, if padding is enabled.
    pub fn pad_to(&self) -> Option<usize> {
        self.pad_to
    }

    /// Transform length after padding.
    pub fn fft_len(&self) -> usize {
        self.pad_to.unwrap_or(self.nfft)
    }

    /// Distance between consecutive segment starts.
    pub fn step(&self) -> usize {
        self.nfft - self.noverlap
    }

    /// Number of whole segments that fit in `npts` samples.
    pub fn segments(&self, npts: usize) -> usize {
        if npts < self.nfft {
            return 0;
        }
        (npts - self.nfft) / self.step() + 1
    }

    /// One-sided frequency rows including DC.
    pub fn freq_rows(&self) -> usize {
        self.fft_len() / 2 + 1
    }

    /// Reject plans whose output cannot carry a half-bin width on both axes.
    pub(crate) fn check_bins(&self, npts: usize) -> Result<(), SpecgramError> {
        let segments = self.segments(npts);
        if segments < 2 {
            return Err(SpecgramError::Configuration(format!(
                "{npts} samples give {segments} segment(s) of {} with overlap {}, need at least 2",
                self.nfft, self.noverlap
            )));
        }
        // Row zero is removed later, leaving freq_rows - 1.
        if self.freq_rows() < 3 {
            return Err(SpecgramError::Configuration(format!(
                "transform length {} leaves fewer than 2 frequency rows",
                self.fft_len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plan_defaults_at_100hz() {
        // wlen defaults to fs / 100 = 1 s, i.e. 100 samples, rounded to 128.
        let plan = WindowPlan::new(1000, 100.0, None, DEFAULT_OVERLAP, None).unwrap();
        assert_eq!(plan.nfft(), 128);
        assert_eq!(plan.noverlap(), 115);
        assert_eq!(plan.pad_to(), None);
        assert_eq!(plan.step(), 13);
        assert_eq!(plan.segments(1000), 68);
        assert_eq!(plan.freq_rows(), 65);
    }

    #[test]
    fn test_plan_padding() {
        let plan = WindowPlan::new(
            1000,
            100.0,
            None,
            DEFAULT_OVERLAP,
            Some(DEFAULT_PAD_MULTIPLIER),
        )
        .unwrap();
        assert_eq!(plan.pad_to(), Some(1024));
        assert_eq!(plan.fft_len(), 1024);
        assert_eq!(plan.freq_rows(), 513);

        // 5 rounds to 4.
        let plan = WindowPlan::new(1000, 100.0, None, 0.5, Some(5.0)).unwrap();
        assert_eq!(plan.pad_to(), Some(512));

        let plan = WindowPlan::new(1000, 100.0, None, 0.5, Some(MAX_PAD_MULTIPLIER)).unwrap();
        assert_eq!(plan.pad_to(), Some(128 * 1024));
    }

    #[test]
    fn test_plan_caps_long_window() {
        // A 10 s window at 100 Hz is 1024 samples, far longer than the signal.
        let plan = WindowPlan::new(100, 100.0, Some(10.0), 0.5, None).unwrap();
        assert_eq!(plan.nfft(), 16);
        assert!(plan.nfft() <= 100);

        for wlen in [1.5, 2.0, 7.3, 100.0] {
            let plan = WindowPlan::new(100, 100.0, Some(wlen), 0.5, None).unwrap();
            assert_eq!(plan.nfft(), 16, "wlen {wlen}");
        }
    }

    #[test]
    fn test_plan_overlap_floor() {
        let plan = WindowPlan::new(4096, 1000.0, Some(0.256), 0.33, None).unwrap();
        assert_eq!(plan.nfft(), 256);
        assert_eq!(plan.noverlap(), 84);
        let plan = WindowPlan::new(4096, 1000.0, Some(0.256), 0.0, None).unwrap();
        assert_eq!(plan.noverlap(), 0);
    }

    #[test]
    fn test_plan_invalid_parameters() {
        for (fs, wlen, lap, mult) in [
            (0.0, None, 0.5, None),
            (-1.0, None, 0.5, None),
            (f64::NAN, None, 0.5, None),
            (100.0, Some(0.0), 0.5, None),
            (100.0, Some(-1.0), 0.5, None),
            (100.0, None, 1.0, None),
            (100.0, None, -0.1, None),
            (100.0, None, 0.5, Some(0.0)),
            (100.0, None, 0.5, Some(0.2)),
            (100.0, None, 0.5, Some(2048.0)),
            (100.0, None, 0.5, Some(2f64.powi(40))),
            (100.0, None, 0.9, Some(1e20)),
            (100.0, None, 0.5, Some(f64::INFINITY)),
        ] {
            assert!(
                matches!(
                    WindowPlan::new(1000, fs, wlen, lap, mult),
                    Err(SpecgramError::InvalidParameter(_))
                ),
                "fs {fs} wlen {wlen:?} lap {lap} mult {mult:?}"
            );
        }
    }

    #[test]
    fn test_plan_signal_too_short() {
        assert!(matches!(
            WindowPlan::new(0, 100.0, None, 0.5, None),
            Err(SpecgramError::Configuration(_))
        ));
        // 4 / 8 rounds to half a sample.
        assert!(matches!(
            WindowPlan::new(4, 100.0, None, 0.5, None),
            Err(SpecgramError::Configuration(_))
        ));
        // 8 / 8 rounds to a single sample.
        assert!(matches!(
            WindowPlan::new(8, 100.0, None, 0.5, None),
            Err(SpecgramError::Configuration(_))
        ));
    }

    #[test]
    fn test_plan_single_segment_rejected() {
        // 256 samples, nfft 256: exactly one segment.
        assert!(matches!(
            WindowPlan::new(256, 1000.0, Some(0.256), 0.5, None),
            Err(SpecgramError::Configuration(_))
        ));
    }

    #[test]
    fn test_plan_from_parts() {
        let plan = WindowPlan::from_parts(64, 32, Some(256)).unwrap();
        assert_eq!(plan.fft_len(), 256);
        assert!(WindowPlan::from_parts(64, 64, None).is_err());
        assert!(WindowPlan::from_parts(0, 0, None).is_err());
        assert!(WindowPlan::from_parts(64, 0, Some(32)).is_err());
    }
}
