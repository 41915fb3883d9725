//! Uniform binning.

use pm_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a value falls relative to an [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinLocation {
    /// Below the lower edge of the first bin.
    Underflow,
    /// Inside bin `i` (`0..n_bins`).
    Bin(usize),
    /// At or above the upper edge of the last bin.
    Overflow,
}

/// `n_bins` equal-width bins over `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    n_bins: usize,
    min: f64,
    max: f64,
}

impl Axis {
    /// Create an axis; rejects zero bins, non-finite bounds and `min >= max`.
    pub fn new(n_bins: usize, min: f64, max: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Validation("axis requires at least one bin".into()));
        }
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(Error::Validation(format!(
                "invalid axis range: expected finite min < max, got ({min}, {max})"
            )));
        }
        Ok(Self { n_bins, min, max })
    }

    /// Number of bins (excluding under/overflow).
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Lower edge of the first bin.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the last bin.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Bin width.
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.n_bins as f64
    }

    /// Lower edge of bin `i`.
    pub fn lower_edge(&self, i: usize) -> f64 {
        self.min + i as f64 * self.width()
    }

    /// Upper edge of bin `i`. The last bin's upper edge is exactly `max`.
    pub fn upper_edge(&self, i: usize) -> f64 {
        if i + 1 >= self.n_bins { self.max } else { self.lower_edge(i + 1) }
    }

    /// Center of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.min + (i as f64 + 0.5) * self.width()
    }

    /// All bin edges (length `n_bins + 1`).
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins).map(|i| self.upper_edge_or_min(i)).collect()
    }

    /// All bin centers.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.n_bins).map(|i| self.center(i)).collect()
    }

    fn upper_edge_or_min(&self, i: usize) -> f64 {
        if i == 0 { self.min } else { self.upper_edge(i - 1) }
    }

    /// Locate `value`. Returns `None` for NaN.
    pub fn locate(&self, value: f64) -> Option<BinLocation> {
        if value.is_nan() {
            return None;
        }
        if value < self.min {
            return Some(BinLocation::Underflow);
        }
        if value >= self.max {
            return Some(BinLocation::Overflow);
        }
        let idx = ((value - self.min) / self.width()) as usize;
        Some(BinLocation::Bin(idx.min(self.n_bins - 1)))
    }
}
