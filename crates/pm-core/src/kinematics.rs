//! Four-momentum arithmetic and invariant masses (natural units, MeV).

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Energy of a particle with momentum magnitude `p` and rest mass `mass`.
#[inline]
pub fn energy_from_momentum(p: f64, mass: f64) -> f64 {
    (p * p + mass * mass).sqrt()
}

/// Invariant mass squared of a two-particle system.
///
/// `(E1+E2)² − (px1+px2)² − (py1+py2)² − (pz1+pz2)²`. Unphysical inputs can
/// make this negative; callers decide what to do with such pairs.
#[inline]
pub fn invariant_mass_squared(a: &FourMomentum, b: &FourMomentum) -> f64 {
    (*a + *b).mass_squared()
}

/// A four-momentum `(E, px, py, pz)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Energy.
    pub e: f64,
    /// x momentum component.
    pub px: f64,
    /// y momentum component.
    pub py: f64,
    /// z momentum component.
    pub pz: f64,
}

impl FourMomentum {
    /// Create from energy and momentum components.
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Build from a measured momentum magnitude under a rest-mass hypothesis.
    pub fn from_momentum(p: f64, px: f64, py: f64, pz: f64, mass: f64) -> Self {
        Self { e: energy_from_momentum(p, mass), px, py, pz }
    }

    /// Squared three-momentum magnitude.
    #[inline]
    pub fn p_squared(&self) -> f64 {
        self.px * self.px + self.py * self.py + self.pz * self.pz
    }

    /// Minkowski norm `E² − |p|²`.
    #[inline]
    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.p_squared()
    }

    /// Invariant mass, or `None` when `E² − |p|²` is negative or not finite.
    pub fn invariant_mass(&self) -> Option<f64> {
        let m2 = self.mass_squared();
        if m2.is_finite() && m2 >= 0.0 { Some(m2.sqrt()) } else { None }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    #[inline]
    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Species;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn back_to_back_pair_mass_is_twice_the_energy() {
        let m = Species::Pion.rest_mass();
        let a = FourMomentum::from_momentum(400.0, 0.0, 0.0, 400.0, m);
        let b = FourMomentum::from_momentum(400.0, 0.0, 0.0, -400.0, m);
        let mass = (a + b).invariant_mass().unwrap();
        assert_relative_eq!(mass, 2.0 * a.e, max_relative = 1e-12);
    }

    #[test]
    fn single_particle_recovers_rest_mass() {
        let m = Species::Kaon.rest_mass();
        let k = FourMomentum::from_momentum(
            (300.0f64.powi(2) + 400.0f64.powi(2)).sqrt(),
            300.0,
            400.0,
            0.0,
            m,
        );
        assert_relative_eq!(k.invariant_mass().unwrap(), m, max_relative = 1e-9);
        assert_relative_eq!(k.pt(), 500.0);
    }

    #[test]
    fn negative_radicand_is_rejected() {
        // |p| > E: spacelike, unphysical.
        let a = FourMomentum::new(10.0, 100.0, 0.0, 0.0);
        let b = FourMomentum::new(10.0, 100.0, 0.0, 0.0);
        assert!(invariant_mass_squared(&a, &b) < 0.0);
        assert_eq!((a + b).invariant_mass(), None);
    }

    #[test]
    fn nan_components_are_rejected() {
        let a = FourMomentum::new(f64::NAN, 0.0, 0.0, 0.0);
        assert_eq!(a.invariant_mass(), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn prop_physical_pairs_have_mass_above_threshold(
            p1 in (-2000.0f64..2000.0, -2000.0f64..2000.0, -2000.0f64..2000.0),
            p2 in (-2000.0f64..2000.0, -2000.0f64..2000.0, -2000.0f64..2000.0),
        ) {
            let m = Species::Pion.rest_mass();
            let mag = |(x, y, z): (f64, f64, f64)| (x * x + y * y + z * z).sqrt();
            let a = FourMomentum::from_momentum(mag(p1), p1.0, p1.1, p1.2, m);
            let b = FourMomentum::from_momentum(mag(p2), p2.0, p2.1, p2.2, m);
            let ab = (a + b).invariant_mass();
            let ba = (b + a).invariant_mass();
            prop_assert_eq!(ab, ba);
            let mass = ab.unwrap();
            prop_assert!(mass >= 2.0 * m * (1.0 - 1e-9));
        }
    }
}
