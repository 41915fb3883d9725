//! # pm-hist
//!
//! Fixed-binning accumulators used by pidmass: uniform axes, 1D/2D histograms
//! with under/overflow tracking and bin-wise merging, ordered curves, and the
//! [`DistributionSink`] contract through which finished distributions leave
//! the analysis.
//!
//! ```
//! use pm_hist::{Axis, Histogram1D};
//!
//! let axis = Axis::new(100, 250.0, 1000.0).unwrap();
//! let mut h = Histogram1D::new("mass_pipi", "#pi#pi mass", axis);
//! h.fill(497.6);
//! assert_eq!(h.entries, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod axis;
pub mod curve;
pub mod histogram;
pub mod sink;

pub use axis::{Axis, BinLocation};
pub use curve::Curve;
pub use histogram::{Histogram1D, Histogram2D};
pub use sink::{Artifact, DistributionSink, JsonArtifactSink, MemorySink, OwnedArtifact};
