//! Pairwise invariant-mass engine.
//!
//! Candidates are grouped per event and signed species ([`SpeciesBuckets`]),
//! then every opposite-charge channel takes the full cross product of its two
//! candidate slices in each event. Events are independent, so the pass can run
//! on the rayon pool with one partial [`MassSpectra`] per worker, merged
//! bin-wise afterwards.

use pm_core::{Error, FourMomentum, Result, SignedSpecies, Species, SpeciesSet};
use pm_hist::Histogram1D;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{AxisConfig, ColumnNames, MassSpectraConfig};
use crate::partition::EventPartition;
use crate::table::ParticleTable;

/// Where candidate four-momenta come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSource {
    /// Generator-level `(E, px, py, pz)`.
    Truth,
    /// Measured `(p, px, py, pz)`, energy from the assumed species' rest mass.
    Reconstructed,
}

/// Mass spectrum filled by one or more channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassSpectrum {
    /// π+π−
    PiPi,
    /// p π (both charge combinations)
    PPi,
    /// K+K−
    KK,
}

impl MassSpectrum {
    /// All spectra.
    pub const ALL: [MassSpectrum; 3] = [MassSpectrum::PiPi, MassSpectrum::PPi, MassSpectrum::KK];

    /// Short name used in histogram names and destinations.
    pub const fn label(self) -> &'static str {
        match self {
            MassSpectrum::PiPi => "pipi",
            MassSpectrum::PPi => "ppi",
            MassSpectrum::KK => "KK",
        }
    }

    fn title(self) -> &'static str {
        match self {
            MassSpectrum::PiPi => "#pi#pi mass;m_{#pi#pi} [MeV];events",
            MassSpectrum::PPi => "p#pi mass;m_{p#pi} [MeV];events",
            MassSpectrum::KK => "KK mass;m_{KK} [MeV];events",
        }
    }
}

/// Opposite-charge pairing channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// (π+, π−)
    PiPi,
    /// (K+, K−)
    KK,
    /// (p, π−)
    ProtonPiMinus,
    /// (π+, p̄)
    PiPlusAntiproton,
}

impl Channel {
    /// All channels.
    pub const ALL: [Channel; 4] =
        [Channel::PiPi, Channel::KK, Channel::ProtonPiMinus, Channel::PiPlusAntiproton];

    /// The two candidate lists paired by this channel.
    pub const fn sides(self) -> (SignedSpecies, SignedSpecies) {
        match self {
            Channel::PiPi => (SignedSpecies::PI_PLUS, SignedSpecies::PI_MINUS),
            Channel::KK => (SignedSpecies::K_PLUS, SignedSpecies::K_MINUS),
            Channel::ProtonPiMinus => (SignedSpecies::P_PLUS, SignedSpecies::PI_MINUS),
            Channel::PiPlusAntiproton => (SignedSpecies::PI_PLUS, SignedSpecies::P_MINUS),
        }
    }

    /// Spectrum this channel fills.
    pub const fn spectrum(self) -> MassSpectrum {
        match self {
            Channel::PiPi => MassSpectrum::PiPi,
            Channel::KK => MassSpectrum::KK,
            Channel::ProtonPiMinus | Channel::PiPlusAntiproton => MassSpectrum::PPi,
        }
    }

    /// Label for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Channel::PiPi => "pi+pi-",
            Channel::KK => "K+K-",
            Channel::ProtonPiMinus => "p pi-",
            Channel::PiPlusAntiproton => "pi+ pbar",
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate buckets
// ---------------------------------------------------------------------------

/// Momentum columns of one source, borrowed from a table.
#[derive(Debug, Clone, Copy)]
pub struct MomentumColumns<'a> {
    source: MomentumSource,
    e_or_p: &'a [f64],
    px: &'a [f64],
    py: &'a [f64],
    pz: &'a [f64],
}

impl<'a> MomentumColumns<'a> {
    /// Look up the columns `source` needs.
    pub fn from_table(
        table: &'a ParticleTable,
        columns: &ColumnNames,
        source: MomentumSource,
    ) -> Result<Self> {
        let (e_or_p, px, py, pz) = match source {
            MomentumSource::Truth => (&columns.true_e, &columns.true_px, &columns.true_py, &columns.true_pz),
            MomentumSource::Reconstructed => (&columns.p, &columns.px, &columns.py, &columns.pz),
        };
        Ok(Self {
            source,
            e_or_p: table.require(e_or_p)?,
            px: table.require(px)?,
            py: table.require(py)?,
            pz: table.require(pz)?,
        })
    }

    /// Four-momentum of `row` under the `species` hypothesis.
    #[inline]
    pub fn four_momentum(&self, row: usize, species: Species) -> FourMomentum {
        match self.source {
            MomentumSource::Truth => {
                FourMomentum::new(self.e_or_p[row], self.px[row], self.py[row], self.pz[row])
            }
            MomentumSource::Reconstructed => FourMomentum::from_momentum(
                self.e_or_p[row],
                self.px[row],
                self.py[row],
                self.pz[row],
                species.rest_mass(),
            ),
        }
    }
}

/// Per-event candidate lists, species-major.
///
/// For each signed species there is one flat list of four-momenta in row
/// order plus `n_events + 1` offsets; the candidates of event `i` are
/// `list[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesBuckets {
    n_events: usize,
    lists: [Vec<FourMomentum>; SignedSpecies::COUNT],
    offsets: [Vec<usize>; SignedSpecies::COUNT],
}

impl SpeciesBuckets {
    /// Build buckets from per-row classifications.
    pub fn build(
        partition: &EventPartition,
        classes: &[SpeciesSet],
        momenta: &MomentumColumns<'_>,
    ) -> Result<Self> {
        if classes.len() != partition.n_rows() {
            return Err(Error::Validation(format!(
                "classification has {} rows, partition covers {}",
                classes.len(),
                partition.n_rows()
            )));
        }
        if momenta.px.len() != partition.n_rows() {
            return Err(Error::Validation(format!(
                "momentum columns have {} rows, partition covers {}",
                momenta.px.len(),
                partition.n_rows()
            )));
        }

        let n_events = partition.n_events();
        let mut lists: [Vec<FourMomentum>; SignedSpecies::COUNT] = Default::default();
        let mut offsets: [Vec<usize>; SignedSpecies::COUNT] = Default::default();

        for s in SignedSpecies::ALL {
            let list = &mut lists[s.index()];
            let offs = &mut offsets[s.index()];
            offs.reserve(n_events + 1);
            offs.push(0);
            for (_, rows) in partition.iter() {
                for row in rows {
                    if classes[row].contains(s) {
                        list.push(momenta.four_momentum(row, s.species));
                    }
                }
                offs.push(list.len());
            }
        }

        Ok(Self { n_events, lists, offsets })
    }

    /// Number of events.
    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Candidates of signed species `s` in event `event`.
    #[inline]
    pub fn candidates(&self, s: SignedSpecies, event: usize) -> &[FourMomentum] {
        let offs = &self.offsets[s.index()];
        &self.lists[s.index()][offs[event]..offs[event + 1]]
    }

    /// Candidates of `species` (both charges) in `event`.
    pub fn multiplicity(&self, species: Species, event: usize) -> usize {
        SignedSpecies::ALL
            .iter()
            .filter(|s| s.species == species)
            .map(|&s| self.candidates(s, event).len())
            .sum()
    }

    /// Candidates of `s` over all events.
    pub fn total(&self, s: SignedSpecies) -> usize {
        self.lists[s.index()].len()
    }
}

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

/// Mass spectra, multiplicity distributions and pair accounting of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MassSpectra {
    /// Tag appended to histogram names (`reco`, `true`).
    pub tag: String,
    spectra: [Histogram1D; 3],
    multiplicity: [Histogram1D; 3],
    /// Valid pairs filled per channel, in [`Channel::ALL`] order.
    pub pairs: [u64; 4],
    /// Pairs dropped per channel because `E² − |p|²` was negative or not finite.
    pub invalid_pairs: [u64; 4],
    /// Candidates per signed species, indexed by [`SignedSpecies::index`].
    pub candidates: [u64; SignedSpecies::COUNT],
    /// Events processed.
    pub events: u64,
}

impl MassSpectra {
    /// Empty accumulators with the configured binning.
    pub fn new(config: &MassSpectraConfig, tag: &str) -> Result<Self> {
        let spectrum = |s: MassSpectrum, axis: &AxisConfig| -> Result<Histogram1D> {
            Ok(Histogram1D::new(format!("mass_{}_{tag}", s.label()), s.title(), axis.to_axis()?))
        };
        let multiplicity = |sp: Species| -> Result<Histogram1D> {
            let label = match sp {
                Species::Pion => "#pi",
                Species::Kaon => "K",
                Species::Proton => "p",
            };
            Ok(Histogram1D::new(
                format!("count_{}_{tag}", sp.label()),
                format!("{label} multiplicity;{label} multiplicity;events"),
                config.multiplicity(sp).to_axis()?,
            ))
        };
        Ok(Self {
            tag: tag.to_string(),
            spectra: [
                spectrum(MassSpectrum::PiPi, &config.pipi)?,
                spectrum(MassSpectrum::PPi, &config.ppi)?,
                spectrum(MassSpectrum::KK, &config.kk)?,
            ],
            multiplicity: [
                multiplicity(Species::Pion)?,
                multiplicity(Species::Kaon)?,
                multiplicity(Species::Proton)?,
            ],
            pairs: [0; 4],
            invalid_pairs: [0; 4],
            candidates: [0; SignedSpecies::COUNT],
            events: 0,
        })
    }

    /// Histogram of `spectrum`.
    pub fn spectrum(&self, spectrum: MassSpectrum) -> &Histogram1D {
        &self.spectra[spectrum as usize]
    }

    /// Multiplicity distribution of `species`.
    pub fn multiplicity(&self, species: Species) -> &Histogram1D {
        &self.multiplicity[species.index()]
    }

    /// Valid pairs filled by `channel`.
    pub fn pair_count(&self, channel: Channel) -> u64 {
        self.pairs[channel as usize]
    }

    /// Pairs of `channel` dropped for a negative radicand.
    pub fn invalid_pair_count(&self, channel: Channel) -> u64 {
        self.invalid_pairs[channel as usize]
    }

    /// Accumulate one event.
    pub fn fill_event(&mut self, buckets: &SpeciesBuckets, event: usize) {
        for (c, channel) in Channel::ALL.into_iter().enumerate() {
            let (a, b) = channel.sides();
            let left = buckets.candidates(a, event);
            let right = buckets.candidates(b, event);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let hist = &mut self.spectra[channel.spectrum() as usize];
            for p1 in left {
                for p2 in right {
                    match (*p1 + *p2).invariant_mass() {
                        Some(m) => {
                            hist.fill(m);
                            self.pairs[c] += 1;
                        }
                        None => self.invalid_pairs[c] += 1,
                    }
                }
            }
        }

        for species in Species::ALL {
            let n = buckets.multiplicity(species, event);
            self.multiplicity[species.index()].fill(n as f64);
        }
        for s in SignedSpecies::ALL {
            self.candidates[s.index()] += buckets.candidates(s, event).len() as u64;
        }
        self.events += 1;
    }

    /// Bin-wise sum of another partial result with identical binning.
    pub fn merge(&mut self, other: &MassSpectra) -> Result<()> {
        for (a, b) in self.spectra.iter_mut().zip(&other.spectra) {
            a.merge(b)?;
        }
        for (a, b) in self.multiplicity.iter_mut().zip(&other.multiplicity) {
            a.merge(b)?;
        }
        for (a, b) in self.pairs.iter_mut().zip(other.pairs) {
            *a += b;
        }
        for (a, b) in self.invalid_pairs.iter_mut().zip(other.invalid_pairs) {
            *a += b;
        }
        for (a, b) in self.candidates.iter_mut().zip(other.candidates) {
            *a += b;
        }
        self.events += other.events;
        Ok(())
    }

    /// All mass spectra, in [`MassSpectrum::ALL`] order.
    pub fn spectra(&self) -> impl Iterator<Item = (MassSpectrum, &Histogram1D)> {
        MassSpectrum::ALL.into_iter().zip(self.spectra.iter())
    }

    /// All multiplicity distributions, in [`Species::ALL`] order.
    pub fn multiplicities(&self) -> impl Iterator<Item = (Species, &Histogram1D)> {
        Species::ALL.into_iter().zip(self.multiplicity.iter())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs the pairing pass over all events.
#[derive(Debug, Clone)]
pub struct MassEngine {
    config: MassSpectraConfig,
    parallel: bool,
}

impl MassEngine {
    /// Engine with the given binning.
    pub fn new(config: MassSpectraConfig) -> Self {
        Self { config, parallel: false }
    }

    /// Process events on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fill fresh accumulators from `buckets`.
    pub fn run(&self, buckets: &SpeciesBuckets, tag: &str) -> Result<MassSpectra> {
        let template = MassSpectra::new(&self.config, tag)?;
        let n_events = buckets.n_events();

        let spectra = if self.parallel {
            (0..n_events)
                .into_par_iter()
                .fold(
                    || template.clone(),
                    |mut acc, event| {
                        acc.fill_event(buckets, event);
                        acc
                    },
                )
                .map(Ok::<_, Error>)
                .try_reduce(
                    || template.clone(),
                    |mut a, b| {
                        a.merge(&b)?;
                        Ok(a)
                    },
                )?
        } else {
            let mut acc = template;
            for event in 0..n_events {
                acc.fill_event(buckets, event);
            }
            acc
        };

        let invalid: u64 = spectra.invalid_pairs.iter().sum();
        if invalid > 0 {
            tracing::warn!(
                tag,
                invalid,
                pipi = spectra.invalid_pair_count(Channel::PiPi),
                kk = spectra.invalid_pair_count(Channel::KK),
                p_pim = spectra.invalid_pair_count(Channel::ProtonPiMinus),
                pip_pbar = spectra.invalid_pair_count(Channel::PiPlusAntiproton),
                "pairs with negative invariant mass squared were dropped"
            );
        }
        tracing::debug!(
            tag,
            events = spectra.events,
            parallel = self.parallel,
            pipi = spectra.pair_count(Channel::PiPi),
            kk = spectra.pair_count(Channel::KK),
            p_pim = spectra.pair_count(Channel::ProtonPiMinus),
            pip_pbar = spectra.pair_count(Channel::PiPlusAntiproton),
            "mass pass done"
        );
        Ok(spectra)
    }
}
