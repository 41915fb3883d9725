//! # pm-core
//!
//! Core types for pidmass: the shared error type, particle species and charge
//! tags, PDG identifiers, rest masses and four-momentum kinematics.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kinematics;
pub mod types;

pub use error::{Error, Result};
pub use kinematics::{FourMomentum, energy_from_momentum, invariant_mass_squared};
pub use types::{Charge, SignedSpecies, Species, SpeciesSet};
