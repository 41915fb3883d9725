//! Particle species, charge and PDG identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Charged hadron species handled by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Charged pion (PDG 211).
    Pion,
    /// Charged kaon (PDG 321).
    Kaon,
    /// Proton (PDG 2212).
    Proton,
}

impl Species {
    /// All species in classification priority order (π, K, p).
    pub const ALL: [Species; 3] = [Species::Pion, Species::Kaon, Species::Proton];

    /// Unsigned PDG Monte Carlo code.
    pub const fn pdg(self) -> i64 {
        match self {
            Species::Pion => 211,
            Species::Kaon => 321,
            Species::Proton => 2212,
        }
    }

    /// Rest mass in MeV.
    pub const fn rest_mass(self) -> f64 {
        match self {
            Species::Pion => 139.570_39,
            Species::Kaon => 493.677,
            Species::Proton => 938.272_088_16,
        }
    }

    /// Species whose PDG code equals `|id|`, if any.
    pub fn from_abs_pdg(id: i64) -> Option<Species> {
        match id.abs() {
            211 => Some(Species::Pion),
            321 => Some(Species::Kaon),
            2212 => Some(Species::Proton),
            _ => None,
        }
    }

    /// Position in [`Species::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Species::Pion => 0,
            Species::Kaon => 1,
            Species::Proton => 2,
        }
    }

    /// Short label used in artifact names (`pi`, `K`, `p`).
    pub const fn label(self) -> &'static str {
        match self {
            Species::Pion => "pi",
            Species::Kaon => "K",
            Species::Proton => "p",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Electric charge sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charge {
    /// Positive charge.
    Positive,
    /// Negative charge.
    Negative,
}

impl Charge {
    /// Charge from a signed identifier: zero counts as positive.
    pub const fn from_sign(id: i64) -> Charge {
        if id >= 0 { Charge::Positive } else { Charge::Negative }
    }
}

/// A species together with its charge, e.g. π− or p̄.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignedSpecies {
    /// Particle species.
    pub species: Species,
    /// Charge sign.
    pub charge: Charge,
}

impl SignedSpecies {
    /// Number of distinct signed species.
    pub const COUNT: usize = 6;

    /// π+
    pub const PI_PLUS: SignedSpecies = SignedSpecies::new(Species::Pion, Charge::Positive);
    /// π−
    pub const PI_MINUS: SignedSpecies = SignedSpecies::new(Species::Pion, Charge::Negative);
    /// K+
    pub const K_PLUS: SignedSpecies = SignedSpecies::new(Species::Kaon, Charge::Positive);
    /// K−
    pub const K_MINUS: SignedSpecies = SignedSpecies::new(Species::Kaon, Charge::Negative);
    /// p
    pub const P_PLUS: SignedSpecies = SignedSpecies::new(Species::Proton, Charge::Positive);
    /// p̄
    pub const P_MINUS: SignedSpecies = SignedSpecies::new(Species::Proton, Charge::Negative);

    /// All six signed species, ordered by [`SignedSpecies::index`].
    pub const ALL: [SignedSpecies; 6] = [
        SignedSpecies::PI_PLUS,
        SignedSpecies::PI_MINUS,
        SignedSpecies::K_PLUS,
        SignedSpecies::K_MINUS,
        SignedSpecies::P_PLUS,
        SignedSpecies::P_MINUS,
    ];

    /// Create a signed species.
    pub const fn new(species: Species, charge: Charge) -> Self {
        Self { species, charge }
    }

    /// Exact truth-level match: the sign of `id` gives the charge, `|id|` the species.
    ///
    /// `0` and codes other than 211/321/2212 give `None`.
    pub fn from_pdg(id: i64) -> Option<SignedSpecies> {
        let species = Species::from_abs_pdg(id)?;
        Some(SignedSpecies::new(species, Charge::from_sign(id)))
    }

    /// Signed PDG code.
    pub const fn pdg(self) -> i64 {
        match self.charge {
            Charge::Positive => self.species.pdg(),
            Charge::Negative => -self.species.pdg(),
        }
    }

    /// Dense index in `0..6`.
    pub const fn index(self) -> usize {
        let c = match self.charge {
            Charge::Positive => 0,
            Charge::Negative => 1,
        };
        self.species.index() * 2 + c
    }
}

impl fmt::Display for SignedSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.charge {
            Charge::Positive => '+',
            Charge::Negative => '-',
        };
        write!(f, "{}{}", self.species, sign)
    }
}

/// Set of signed species a single particle was classified into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpeciesSet(u8);

impl SpeciesSet {
    /// Empty set.
    pub const EMPTY: SpeciesSet = SpeciesSet(0);

    /// Set holding exactly `s`.
    pub const fn only(s: SignedSpecies) -> Self {
        SpeciesSet(1 << s.index())
    }

    /// Add a member.
    pub fn insert(&mut self, s: SignedSpecies) {
        self.0 |= 1 << s.index();
    }

    /// Membership test.
    pub const fn contains(self, s: SignedSpecies) -> bool {
        self.0 & (1 << s.index()) != 0
    }

    /// `true` if any charge of `species` is present.
    pub const fn contains_species(self, species: Species) -> bool {
        self.0 & (0b11 << (species.index() * 2)) != 0
    }

    /// `true` when no species matched.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of members.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in [`SignedSpecies::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = SignedSpecies> {
        SignedSpecies::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<SignedSpecies> for SpeciesSet {
    fn from_iter<I: IntoIterator<Item = SignedSpecies>>(iter: I) -> Self {
        let mut set = SpeciesSet::EMPTY;
        for s in iter {
            set.insert(s);
        }
        set
    }
}
