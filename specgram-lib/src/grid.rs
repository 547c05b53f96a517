// Copyright 2026 The Specgram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Grid
//!
//! Row-major storage for spectrogram amplitudes.  Rows are frequency bins and columns are time
//! segments, so `get(f, t)` reads the power of bin `f` during segment `t`.

use crate::SpecgramError;

/// Dense 2-D matrix of amplitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// A grid of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Grid {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap existing row-major data.  `data` must hold exactly `rows * cols` values.
    pub fn from_rows(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, SpecgramError> {
        if data.len() != rows * cols {
            return Err(SpecgramError::InvalidParameter(format!(
                "{} values cannot fill a {rows} x {cols} grid",
                data.len()
            )));
        }
        Ok(Grid { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// One frequency row across all time segments.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// A new grid without the first `n` rows.
    pub fn drop_rows(&self, n: usize) -> Grid {
        let n = n.min(self.rows);
        Grid {
            rows: self.rows - n,
            cols: self.cols,
            data: self.data[n * self.cols..].to_vec(),
        }
    }

    /// A new grid with `f` applied to every value.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| f(*v)).collect(),
        }
    }

    /// A new grid with the row order reversed.  Image coordinates put row zero at the top, so
    /// ascending frequency must become descending rows.
    pub fn flip_rows(&self) -> Grid {
        let data = self
            .data
            .chunks_exact(self.cols.max(1))
            .rev()
            .flat_map(|r| r.iter().copied())
            .collect();
        Grid {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Smallest and largest value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        let init = (f64::INFINITY, f64::NEG_INFINITY);
        Some(
            self.data
                .iter()
                .fold(init, |(lo, hi), v| (lo.min(*v), hi.max(*v))),
        )
    }

    /// Index of the row holding the largest total power.
    pub fn loudest_row(&self) -> Option<usize> {
        (0..self.rows)
            .map(|r| (r, self.row(r).iter().sum::<f64>()))
            .fold(None, |best: Option<(usize, f64)>, (r, sum)| match best {
                Some((_, best_sum)) if best_sum >= sum => best,
                _ => Some((r, sum)),
            })
            .map(|(r, _)| r)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn counting(rows: usize, cols: usize) -> Grid {
        Grid::from_rows(rows, cols, (0..rows * cols).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn test_grid_from_rows_shape_mismatch() {
        assert!(matches!(
            Grid::from_rows(2, 3, vec![0.0; 5]),
            Err(SpecgramError::InvalidParameter(_))
        ));
        assert_eq!(Grid::from_rows(0, 4, vec![]).unwrap().rows(), 0);
    }

    #[test]
    fn test_grid_drop_rows() {
        let g = counting(3, 2);
        let dropped = g.drop_rows(1);
        assert_eq!(dropped.rows(), 2);
        assert_eq!(dropped.row(0), &[2.0, 3.0]);
        assert_eq!(g.rows(), 3, "source grid is untouched");
    }

    #[test]
    fn test_grid_flip_rows() {
        let g = counting(3, 2).flip_rows();
        assert_eq!(g.row(0), &[4.0, 5.0]);
        assert_eq!(g.row(2), &[0.0, 1.0]);
    }

    #[test]
    fn test_grid_min_max_and_loudest() {
        let mut g = Grid::zeros(4, 3);
        g.set(2, 1, 7.5);
        g.set(0, 0, -1.0);
        assert_eq!(g.min_max(), Some((-1.0, 7.5)));
        assert_eq!(g.loudest_row(), Some(2));
        assert_eq!(Grid::zeros(0, 0).min_max(), None);
    }
}
