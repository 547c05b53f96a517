// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Axis Binning
//!
//! The estimator reports bin centers.  Renderers want something else, depending on how they draw:
//!
//! - A mesh with a logarithmic frequency axis needs bin *edges*, one more than there are bins on
//!   each axis, or the last row and column silently go missing.
//! - An image needs only the rectangle it covers, because its pixels are regularly spaced.  Image
//!   rows count downward, so the grid is flipped to put high frequencies on top.
//!
//! In both cases bins are centered on their reported positions by shifting half a bin.

use crate::dsp::scale::ScaledSpectrum;
use crate::grid::Grid;
use crate::SpecgramError;

/// Bounding rectangle of an image-style rendering, in seconds and Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub t_min: f64,
    pub t_max: f64,
    pub f_min: f64,
    pub f_max: f64,
}

/// Axis information for exactly one rendering style.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisDescriptor {
    /// Bin edges for a mesh, each one longer than the bin-center vector it came from.
    Edges {
        freq_edges: Vec<f64>,
        time_edges: Vec<f64>,
    },
    /// Bounding box for an image.
    Extent(Extent),
}

impl AxisDescriptor {
    pub fn is_log_frequency(&self) -> bool {
        matches!(self, Self::Edges { .. })
    }
}

/// Half the spacing of the first two bins of `axis`.
fn half_bin(axis: &[f64], name: &str) -> Result<f64, SpecgramError> {
    match axis {
        [a, b, ..] => Ok((b - a) / 2.0),
        _ => Err(SpecgramError::Configuration(format!(
            "{name} axis has {} bin(s), at least 2 are needed to size a bin; \
             the signal is too short for the window and overlap settings",
            axis.len()
        ))),
    }
}

/// `centers` with one extra bin appended and everything shifted down by half a bin.
fn edges(centers: &[f64], half: f64) -> Vec<f64> {
    let last = centers[centers.len() - 1] + 2.0 * half;
    centers
        .iter()
        .copied()
        .chain(std::iter::once(last))
        .map(|c| c - half)
        .collect()
}

/// Bin edges for a mesh on a logarithmic frequency axis.
pub fn log_edges(freq: &[f64], time: &[f64]) -> Result<AxisDescriptor, SpecgramError> {
    let halfbin_freq = half_bin(freq, "frequency")?;
    let halfbin_time = half_bin(time, "time")?;
    Ok(AxisDescriptor::Edges {
        freq_edges: edges(freq, halfbin_freq),
        time_edges: edges(time, halfbin_time),
    })
}

/// Bounding box for an image on a linear frequency axis.
pub fn linear_extent(freq: &[f64], time: &[f64]) -> Result<Extent, SpecgramError> {
    let halfbin_freq = half_bin(freq, "frequency")?;
    let halfbin_time = half_bin(time, "time")?;
    Ok(Extent {
        t_min: time[0] - halfbin_time,
        t_max: time[time.len() - 1] + halfbin_time,
        f_min: freq[0] - halfbin_freq,
        f_max: freq[freq.len() - 1] + halfbin_freq,
    })
}

/// Axis descriptor for `scaled`, plus the grid in the orientation that descriptor expects.
pub fn bin(
    scaled: &ScaledSpectrum,
    log_frequency: bool,
) -> Result<(AxisDescriptor, Grid), SpecgramError> {
    if log_frequency {
        let axis = log_edges(&scaled.freq, &scaled.time)?;
        Ok((axis, scaled.grid.clone()))
    } else {
        let extent = linear_extent(&scaled.freq, &scaled.time)?;
        Ok((AxisDescriptor::Extent(extent), scaled.grid.flip_rows()))
    }
}
