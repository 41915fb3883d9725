//! Ordered `(x, y)` curves such as efficiency-vs-pT graphs.

use pm_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// An ordered sequence of points, stored as parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Curve name.
    pub name: String,
    /// Title (`title;x label;y label`).
    pub title: String,
    /// x coordinates.
    pub x: Vec<f64>,
    /// y coordinates (same length as `x`).
    pub y: Vec<f64>,
}

impl Curve {
    /// Create a curve; `x` and `y` must have equal length.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() {
            return Err(Error::Validation(format!(
                "curve '{name}': x has {} points, y has {}",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { name, title: title.into(), x, y })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(x, y)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}
