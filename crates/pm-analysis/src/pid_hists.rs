//! Declarative suite of PID-variable histograms for simulated samples.
//!
//! Each entry names its cut variables, its filled variables, a truth filter and
//! the histogram kind whose cutoffs and binning come from [`PidHistConfig`].
//! A row is filled when every cut variable is strictly above its cutoff and the
//! truth filter accepts the row's truth id.

use pm_core::{Result, Species};
use pm_hist::{Histogram1D, Histogram2D};

use crate::config::{ColumnNames, Hist1DConfig, Hist2DConfig, PidHistConfig};
use crate::table::ParticleTable;

/// A per-row quantity the suite cuts on or fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Legacy K likelihood.
    PidK,
    /// Legacy p likelihood.
    PidP,
    /// Probability score of a species.
    Prob(Species),
    /// Truth transverse momentum.
    TruePt,
    /// Pseudorapidity.
    Eta,
}

impl Quantity {
    fn column(self, columns: &ColumnNames) -> &str {
        match self {
            Quantity::PidK => &columns.pid_k,
            Quantity::PidP => &columns.pid_p,
            Quantity::Prob(s) => columns.prob(s),
            Quantity::TruePt => &columns.true_pt,
            Quantity::Eta => &columns.eta,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Quantity::PidK => "PIDK",
            Quantity::PidP => "PIDp",
            Quantity::Prob(Species::Pion) => "ProbNNpi",
            Quantity::Prob(Species::Kaon) => "ProbNNK",
            Quantity::Prob(Species::Proton) => "ProbNNp",
            Quantity::TruePt => "P_{t} [MeV]",
            Quantity::Eta => "#eta",
        }
    }

    fn dll(species: Species) -> Quantity {
        if species == Species::Kaon { Quantity::PidK } else { Quantity::PidP }
    }
}

/// Truth-id condition of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruthFilter {
    /// Every row.
    Any,
    /// Rows whose `|truth id|` is the species' PDG code.
    Is(Species),
    /// Rows whose `|truth id|` is anything else.
    IsNot(Species),
}

impl TruthFilter {
    /// `true` if a row with `true_id` passes.
    pub fn accepts(self, true_id: i64) -> bool {
        match self {
            TruthFilter::Any => true,
            TruthFilter::Is(s) => true_id.abs() == s.pdg(),
            TruthFilter::IsNot(s) => true_id.abs() != s.pdg(),
        }
    }

    fn title(self) -> String {
        match self {
            TruthFilter::Any => String::new(),
            TruthFilter::Is(s) => format!(" if particle is {s}"),
            TruthFilter::IsNot(s) => format!(" if particle is not {s}"),
        }
    }
}

/// 1D histogram kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind1D {
    /// Legacy likelihood.
    Pid,
    /// Probability score.
    ProbNN,
}

impl Kind1D {
    fn config(self, c: &PidHistConfig) -> Hist1DConfig {
        match self {
            Kind1D::Pid => c.pid,
            Kind1D::ProbNN => c.probnn,
        }
    }

    fn group(self) -> &'static str {
        match self {
            Kind1D::Pid => "pid",
            Kind1D::ProbNN => "probnn",
        }
    }
}

/// 2D histogram kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind2D {
    /// Likelihood vs. same-species probability.
    PidProbNN,
    /// Likelihood vs. π probability.
    PidProbNNpi,
    /// Truth pT vs. probability.
    ProbNNPt,
    /// Pseudorapidity vs. probability.
    ProbNNEta,
}

impl Kind2D {
    fn config(self, c: &PidHistConfig) -> Hist2DConfig {
        match self {
            Kind2D::PidProbNN => c.pid_probnn,
            Kind2D::PidProbNNpi => c.pid_probnnpi,
            Kind2D::ProbNNPt => c.probnn_pt,
            Kind2D::ProbNNEta => c.probnn_eta,
        }
    }

    fn group(self) -> &'static str {
        match self {
            Kind2D::PidProbNN => "pid_probnn",
            Kind2D::PidProbNNpi => "pid_probnnpi",
            Kind2D::ProbNNPt => "probnn_pt",
            Kind2D::ProbNNEta => "probnn_eta",
        }
    }
}

/// One 1D entry of the suite.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist1DSpec {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Cutoff and binning source.
    pub kind: Kind1D,
    /// Variable the cutoff applies to.
    pub cut: Quantity,
    /// Variable filled.
    pub fill: Quantity,
    /// Truth condition.
    pub truth: TruthFilter,
}

/// One 2D entry of the suite.
#[derive(Debug, Clone, PartialEq)]
pub struct Hist2DSpec {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Cutoff and binning source.
    pub kind: Kind2D,
    /// Variables the two cutoffs apply to.
    pub cut: [Quantity; 2],
    /// Variables filled as `(x, y)`.
    pub fill: [Quantity; 2],
    /// Truth condition.
    pub truth: TruthFilter,
}

impl Hist1DSpec {
    /// Destination name, e.g. `pid/probnn/probnn_pi_not`.
    pub fn destination(&self) -> String {
        format!("pid/{}/{}", self.kind.group(), self.name)
    }
}

impl Hist2DSpec {
    /// Destination name, e.g. `pid/probnn_eta/probnn_eta_K_true`.
    pub fn destination(&self) -> String {
        format!("pid/{}/{}", self.kind.group(), self.name)
    }
}

/// Filled histograms of a suite, keyed by destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PidHistograms {
    /// 1D histograms in suite order.
    pub one_d: Vec<(String, Histogram1D)>,
    /// 2D histograms in suite order.
    pub two_d: Vec<(String, Histogram2D)>,
}

impl PidHistograms {
    /// 1D histogram at `destination`.
    pub fn get_1d(&self, destination: &str) -> Option<&Histogram1D> {
        self.one_d.iter().find(|(d, _)| d == destination).map(|(_, h)| h)
    }

    /// 2D histogram at `destination`.
    pub fn get_2d(&self, destination: &str) -> Option<&Histogram2D> {
        self.two_d.iter().find(|(d, _)| d == destination).map(|(_, h)| h)
    }
}

fn suffix(truth: TruthFilter, species: Species) -> &'static str {
    match truth {
        TruthFilter::Any => "",
        TruthFilter::Is(s) if s == species => "_true",
        TruthFilter::Is(_) => "_pi",
        TruthFilter::IsNot(_) => "_not",
    }
}

/// Truth filters of a species' histograms: all rows, the species itself, and
/// its main background (pions, or non-pions for the pion histograms).
fn filters(species: Species) -> [TruthFilter; 3] {
    match species {
        Species::Pion => [TruthFilter::Any, TruthFilter::Is(Species::Pion), TruthFilter::IsNot(Species::Pion)],
        s => [TruthFilter::Any, TruthFilter::Is(s), TruthFilter::Is(Species::Pion)],
    }
}

/// The declarative histogram list.
#[derive(Debug, Clone, PartialEq)]
pub struct PidHistSuite {
    /// 1D entries.
    pub one_d: Vec<Hist1DSpec>,
    /// 2D entries.
    pub two_d: Vec<Hist2DSpec>,
}

impl PidHistSuite {
    /// Likelihood and probability histograms for K and p (with the usual truth
    /// splits) plus probability histograms for π.
    pub fn standard() -> Self {
        let mut one_d = Vec::new();
        let mut two_d = Vec::new();

        let mut push_1d = |kind: Kind1D, q: Quantity, species: Species| {
            for truth in filters(species) {
                let prefix = kind.group();
                one_d.push(Hist1DSpec {
                    name: format!("{prefix}_{}{}", species.label(), suffix(truth, species)),
                    title: format!("{}{};{};events", q.title(), truth.title(), q.title()),
                    kind,
                    cut: q,
                    fill: q,
                    truth,
                });
            }
        };
        for species in [Species::Kaon, Species::Proton] {
            push_1d(Kind1D::Pid, Quantity::dll(species), species);
        }
        for species in [Species::Kaon, Species::Proton, Species::Pion] {
            push_1d(Kind1D::ProbNN, Quantity::Prob(species), species);
        }

        let mut push_2d = |kind: Kind2D, name: String, cut: [Quantity; 2], fill: [Quantity; 2], species: Species| {
            for truth in filters(species) {
                let [x, y] = fill;
                two_d.push(Hist2DSpec {
                    name: format!("{name}{}", suffix(truth, species)),
                    title: format!("{}/{}{};{};{}", y.title(), x.title(), truth.title(), x.title(), y.title()),
                    kind,
                    cut,
                    fill,
                    truth,
                });
            }
        };
        for species in [Species::Kaon, Species::Proton] {
            let l = species.label();
            let cut = [Quantity::dll(species), Quantity::Prob(species)];
            push_2d(Kind2D::PidProbNN, format!("hist_{l}"), cut, cut, species);
            push_2d(
                Kind2D::PidProbNNpi,
                format!("hist_{l}pi"),
                cut,
                [Quantity::dll(species), Quantity::Prob(Species::Pion)],
                species,
            );
        }
        for species in [Species::Kaon, Species::Proton, Species::Pion] {
            let l = species.label();
            let pt = [Quantity::TruePt, Quantity::Prob(species)];
            let eta = [Quantity::Eta, Quantity::Prob(species)];
            push_2d(Kind2D::ProbNNPt, format!("probnn_pt_{l}"), pt, pt, species);
            push_2d(Kind2D::ProbNNEta, format!("probnn_eta_{l}"), eta, eta, species);
        }

        Self { one_d, two_d }
    }

    /// Fill every entry from `table`.
    pub fn fill(
        &self,
        table: &ParticleTable,
        columns: &ColumnNames,
        config: &PidHistConfig,
    ) -> Result<PidHistograms> {
        let true_id: Vec<i64> =
            table.require(&columns.true_id)?.iter().map(|&v| ParticleTable::int_value(v)).collect();
        let mut out = PidHistograms::default();

        for spec in &self.one_d {
            let cfg = spec.kind.config(config);
            let cut = table.require(spec.cut.column(columns))?;
            let fill = table.require(spec.fill.column(columns))?;
            let mut h = Histogram1D::new(&spec.name, &spec.title, cfg.axis.to_axis()?);
            for i in 0..table.n_rows() {
                if cut[i] > cfg.cutoff && spec.truth.accepts(true_id[i]) {
                    h.fill(fill[i]);
                }
            }
            out.one_d.push((spec.destination(), h));
        }

        for spec in &self.two_d {
            let cfg = spec.kind.config(config);
            let cut_x = table.require(spec.cut[0].column(columns))?;
            let cut_y = table.require(spec.cut[1].column(columns))?;
            let fill_x = table.require(spec.fill[0].column(columns))?;
            let fill_y = table.require(spec.fill[1].column(columns))?;
            let mut h = Histogram2D::new(&spec.name, &spec.title, cfg.x.to_axis()?, cfg.y.to_axis()?);
            for i in 0..table.n_rows() {
                if cut_x[i] > cfg.cutoff_x && cut_y[i] > cfg.cutoff_y && spec.truth.accepts(true_id[i]) {
                    h.fill(fill_x[i], fill_y[i]);
                }
            }
            out.two_d.push((spec.destination(), h));
        }

        tracing::debug!(one_d = out.one_d.len(), two_d = out.two_d.len(), "PID histograms filled");
        Ok(out)
    }
}
