//! Species classification under the truth and reconstructed schemes.
//!
//! One [`Classifier`] covers both schemes. The truth scheme reads the signed
//! truth PDG id; the reconstructed scheme takes the charge from the sign of the
//! reconstructed id and the species from probability scores above a cutoff.
//! The result for every row is a [`SpeciesSet`].

use pm_core::{Charge, Result, SignedSpecies, Species, SpeciesSet};
use serde::{Deserialize, Serialize};

use crate::config::{ColumnNames, ProbabilityCuts};
use crate::table::ParticleTable;

/// Identification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Generator-level PDG id (simulated samples only).
    Truth,
    /// Reconstructed charge and probability cutoffs.
    Reconstructed,
}

/// How the reconstructed scheme treats rows passing several probability cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusivity {
    /// Each species is tested on its own; a row may carry several species.
    #[default]
    Independent,
    /// π, then K, then p: the first passing species wins.
    FirstMatch,
}

/// Truth-level classification of a signed PDG id.
pub fn classify_truth(id: i64) -> SpeciesSet {
    match SignedSpecies::from_pdg(id) {
        Some(s) => SpeciesSet::only(s),
        None => SpeciesSet::EMPTY,
    }
}

/// Reconstructed classification from the charge-proxy id and the π/K/p
/// probabilities (in [`Species::ALL`] order).
pub fn classify_reconstructed(
    charge_id: i64,
    probabilities: [f64; 3],
    cuts: &ProbabilityCuts,
    exclusivity: Exclusivity,
) -> SpeciesSet {
    let charge = Charge::from_sign(charge_id);
    let mut set = SpeciesSet::EMPTY;
    for species in Species::ALL {
        if probabilities[species.index()] > cuts.cutoff(species) {
            set.insert(SignedSpecies::new(species, charge));
            if exclusivity == Exclusivity::FirstMatch {
                break;
            }
        }
    }
    set
}

/// Classification strategy keyed by scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    scheme: Scheme,
    cuts: ProbabilityCuts,
    exclusivity: Exclusivity,
}

impl Classifier {
    /// Truth-scheme classifier.
    pub fn truth() -> Self {
        Self { scheme: Scheme::Truth, cuts: ProbabilityCuts::default(), exclusivity: Exclusivity::FirstMatch }
    }

    /// Reconstructed-scheme classifier.
    pub fn reconstructed(cuts: ProbabilityCuts, exclusivity: Exclusivity) -> Self {
        Self { scheme: Scheme::Reconstructed, cuts, exclusivity }
    }

    /// Scheme this classifier applies.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Classify every row of `table`.
    pub fn classify(&self, table: &ParticleTable, columns: &ColumnNames) -> Result<Vec<SpeciesSet>> {
        match self.scheme {
            Scheme::Truth => {
                let ids = table.require(&columns.true_id)?;
                Ok(ids.iter().map(|&v| classify_truth(ParticleTable::int_value(v))).collect())
            }
            Scheme::Reconstructed => {
                let ids = table.require(&columns.reco_id)?;
                let pi = table.require(columns.prob(Species::Pion))?;
                let k = table.require(columns.prob(Species::Kaon))?;
                let p = table.require(columns.prob(Species::Proton))?;
                Ok((0..table.n_rows())
                    .map(|i| {
                        classify_reconstructed(
                            ParticleTable::int_value(ids[i]),
                            [pi[i], k[i], p[i]],
                            &self.cuts,
                            self.exclusivity,
                        )
                    })
                    .collect())
            }
        }
    }
}
