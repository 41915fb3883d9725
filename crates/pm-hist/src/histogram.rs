//! Histogram accumulators.
//!
//! Both histogram kinds keep under/overflow separately from the in-range bins
//! and reject non-finite fill values (counted in `rejected`). Merging two
//! histograms with identical axes is a bin-wise sum, so partial histograms
//! filled on separate workers combine into the same result as a single pass.

use pm_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::axis::{Axis, BinLocation};

/// A 1D histogram over a uniform [`Axis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Histogram name.
    pub name: String,
    /// Histogram title (`title;x label;y label`).
    pub title: String,
    /// Binning.
    pub axis: Axis,
    /// Bin contents (sum of weights per bin).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Underflow sum of weights.
    pub underflow: f64,
    /// Overflow sum of weights.
    pub overflow: f64,
    /// Number of in-range fills.
    pub entries: u64,
    /// Number of fills rejected because the value or weight was not finite.
    pub rejected: u64,
}

impl Histogram1D {
    /// Create an empty histogram.
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: Axis) -> Self {
        let n = axis.n_bins();
        Self {
            name: name.into(),
            title: title.into(),
            axis,
            bin_content: vec![0.0; n],
            sumw2: vec![0.0; n],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            rejected: 0,
        }
    }

    /// Fill `value` with unit weight.
    #[inline]
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    /// Fill `value` with `weight`.
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        if !weight.is_finite() {
            self.rejected += 1;
            return;
        }
        match self.axis.locate(value) {
            None => self.rejected += 1,
            Some(BinLocation::Underflow) => self.underflow += weight,
            Some(BinLocation::Overflow) => self.overflow += weight,
            Some(BinLocation::Bin(b)) => {
                self.bin_content[b] += weight;
                self.sumw2[b] += weight * weight;
                self.entries += 1;
            }
        }
    }

    /// Fill every value with unit weight.
    pub fn fill_n(&mut self, values: &[f64]) {
        for &v in values {
            self.fill(v);
        }
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Multiply contents (and flows) by `factor`; `sumw2` scales by `factor²`.
    pub fn scale(&mut self, factor: f64) {
        let f2 = factor * factor;
        for v in &mut self.bin_content {
            *v *= factor;
        }
        for v in &mut self.sumw2 {
            *v *= f2;
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Copy scaled to unit in-range area. All-zero if the integral is not positive.
    pub fn normalised(&self) -> Histogram1D {
        let mut out = self.clone();
        let integral = self.integral();
        if integral > 0.0 {
            out.scale(1.0 / integral);
        } else {
            out.scale(0.0);
        }
        out
    }

    /// Add `other` bin by bin. Axes must match.
    pub fn merge(&mut self, other: &Histogram1D) -> Result<()> {
        if self.axis != other.axis {
            return Err(Error::Validation(format!(
                "cannot merge histogram '{}' into '{}': axes differ",
                other.name, self.name
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        self.rejected += other.rejected;
        Ok(())
    }
}

/// A 2D histogram over two uniform axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    /// Histogram name.
    pub name: String,
    /// Histogram title (`title;x label;y label`).
    pub title: String,
    /// x binning.
    pub x_axis: Axis,
    /// y binning.
    pub y_axis: Axis,
    /// Bin contents, x-major: `bin_content[ix * ny + iy]`.
    pub bin_content: Vec<f64>,
    /// Sum of weights outside the axis ranges (either coordinate).
    pub out_of_range: f64,
    /// Number of in-range fills.
    pub entries: u64,
    /// Number of fills rejected because a coordinate or weight was not finite.
    pub rejected: u64,
}

impl Histogram2D {
    /// Create an empty 2D histogram.
    pub fn new(name: impl Into<String>, title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_axis,
            bin_content: vec![0.0; x_axis.n_bins() * y_axis.n_bins()],
            out_of_range: 0.0,
            entries: 0,
            rejected: 0,
        }
    }

    /// Fill `(x, y)` with unit weight.
    pub fn fill(&mut self, x: f64, y: f64) {
        self.fill_weighted(x, y, 1.0);
    }

    /// Fill `(x, y)` with `weight`.
    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        if !weight.is_finite() {
            self.rejected += 1;
            return;
        }
        match (self.x_axis.locate(x), self.y_axis.locate(y)) {
            (Some(BinLocation::Bin(ix)), Some(BinLocation::Bin(iy))) => {
                let ny = self.y_axis.n_bins();
                self.bin_content[ix * ny + iy] += weight;
                self.entries += 1;
            }
            (Some(_), Some(_)) => self.out_of_range += weight,
            _ => self.rejected += 1,
        }
    }

    /// Content of bin `(ix, iy)`.
    pub fn bin(&self, ix: usize, iy: usize) -> f64 {
        self.bin_content[ix * self.y_axis.n_bins() + iy]
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Add `other` bin by bin. Both axes must match.
    pub fn merge(&mut self, other: &Histogram2D) -> Result<()> {
        if self.x_axis != other.x_axis || self.y_axis != other.y_axis {
            return Err(Error::Validation(format!(
                "cannot merge histogram '{}' into '{}': axes differ",
                other.name, self.name
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        self.out_of_range += other.out_of_range;
        self.entries += other.entries;
        self.rejected += other.rejected;
        Ok(())
    }
}
