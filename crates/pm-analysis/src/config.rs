//! Typed analysis configuration.
//!
//! Every record carries serde defaults, so a partial JSON document only needs
//! to name the values it changes. [`AnalysisConfig::from_json_str`] and
//! [`AnalysisConfig::from_json_file`] validate after parsing.

use std::path::Path;

use pm_core::{Error, Result, Species};
use pm_hist::Axis;
use serde::{Deserialize, Serialize};

use crate::classify::Exclusivity;

fn check_finite(what: &str, v: f64) -> Result<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Error::Validation(format!("{what} must be finite, got {v}")))
    }
}

fn check_not_nan(what: &str, v: f64) -> Result<()> {
    if v.is_nan() { Err(Error::Validation(format!("{what} must not be NaN"))) } else { Ok(()) }
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Uniform binning `(bins, min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Number of bins.
    pub bins: usize,
    /// Lower edge.
    pub min: f64,
    /// Upper edge.
    pub max: f64,
}

impl AxisConfig {
    /// Create a binning record (validated by [`AxisConfig::to_axis`]).
    pub const fn new(bins: usize, min: f64, max: f64) -> Self {
        Self { bins, min, max }
    }

    /// Validated axis.
    pub fn to_axis(&self) -> Result<Axis> {
        Axis::new(self.bins, self.min, self.max)
    }

    fn validate(&self, what: &str) -> Result<()> {
        self.to_axis()
            .map(|_| ())
            .map_err(|e| Error::Validation(format!("{what}: {e}")))
    }
}

/// One-dimensional PID histogram kind: a cutoff on the cut variable and the binning
/// of the filled variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hist1DConfig {
    /// Rows are filled when the cut variable is strictly above this value.
    pub cutoff: f64,
    /// Binning of the filled variable.
    pub axis: AxisConfig,
}

/// Two-dimensional PID histogram kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hist2DConfig {
    /// Cutoff on the first cut variable.
    pub cutoff_x: f64,
    /// Cutoff on the second cut variable.
    pub cutoff_y: f64,
    /// Binning of the first filled variable.
    pub x: AxisConfig,
    /// Binning of the second filled variable.
    pub y: AxisConfig,
}

impl Hist1DConfig {
    fn validate(&self, what: &str) -> Result<()> {
        check_finite(&format!("{what}.cutoff"), self.cutoff)?;
        self.axis.validate(what)
    }
}

impl Hist2DConfig {
    fn validate(&self, what: &str) -> Result<()> {
        check_finite(&format!("{what}.cutoff_x"), self.cutoff_x)?;
        check_finite(&format!("{what}.cutoff_y"), self.cutoff_y)?;
        self.x.validate(&format!("{what}.x"))?;
        self.y.validate(&format!("{what}.y"))
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Track-quality preselection thresholds (MeV for momenta).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreselectionCuts {
    /// Rows with momentum above this are dropped.
    pub max_p: f64,
    /// Rows with transverse momentum below this are dropped.
    pub min_pt: f64,
    /// Rows with ghost probability above this are dropped.
    pub max_ghost_prob: f64,
    /// Rows with track χ²/ndof above this are dropped.
    pub max_track_chi2ndof: f64,
    /// Rows with impact-parameter χ² above this are dropped.
    pub max_ip_chi2: f64,
}

impl Default for PreselectionCuts {
    fn default() -> Self {
        Self {
            max_p: 100_000.0,
            min_pt: 100.0,
            max_ghost_prob: 0.3,
            max_track_chi2ndof: 3.0,
            max_ip_chi2: 3.0,
        }
    }
}

impl PreselectionCuts {
    /// Reject NaN thresholds (infinite thresholds disable a cut).
    pub fn validate(&self) -> Result<()> {
        check_not_nan("preselection.max_p", self.max_p)?;
        check_not_nan("preselection.min_pt", self.min_pt)?;
        check_not_nan("preselection.max_ghost_prob", self.max_ghost_prob)?;
        check_not_nan("preselection.max_track_chi2ndof", self.max_track_chi2ndof)?;
        check_not_nan("preselection.max_ip_chi2", self.max_ip_chi2)
    }
}

/// Probability cutoffs of the reconstructed identification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityCuts {
    /// π probability cutoff.
    pub pion: f64,
    /// K probability cutoff.
    pub kaon: f64,
    /// p probability cutoff.
    pub proton: f64,
}

impl Default for ProbabilityCuts {
    fn default() -> Self {
        Self { pion: 0.9, kaon: 0.9, proton: 0.9 }
    }
}

impl ProbabilityCuts {
    /// Same cutoff for every species.
    pub const fn uniform(cutoff: f64) -> Self {
        Self { pion: cutoff, kaon: cutoff, proton: cutoff }
    }

    /// Cutoff for `species`.
    pub const fn cutoff(&self, species: Species) -> f64 {
        match species {
            Species::Pion => self.pion,
            Species::Kaon => self.kaon,
            Species::Proton => self.proton,
        }
    }

    /// Cutoffs must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for s in Species::ALL {
            let c = self.cutoff(s);
            if !(0.0..=1.0).contains(&c) {
                return Err(Error::Validation(format!(
                    "probability cutoff for {s} must be in [0, 1], got {c}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Names of the input columns, by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Event number.
    pub event: String,
    /// Signed truth PDG id.
    pub true_id: String,
    /// Signed reconstructed PDG id (charge proxy).
    pub reco_id: String,
    /// π probability score.
    pub prob_pi: String,
    /// K probability score.
    pub prob_k: String,
    /// p probability score.
    pub prob_p: String,
    /// Legacy K likelihood variable.
    pub pid_k: String,
    /// Legacy p likelihood variable.
    pub pid_p: String,
    /// Truth energy.
    pub true_e: String,
    /// Truth momentum x.
    pub true_px: String,
    /// Truth momentum y.
    pub true_py: String,
    /// Truth momentum z.
    pub true_pz: String,
    /// Truth transverse momentum.
    pub true_pt: String,
    /// Reconstructed momentum magnitude.
    pub p: String,
    /// Reconstructed momentum x.
    pub px: String,
    /// Reconstructed momentum y.
    pub py: String,
    /// Reconstructed momentum z.
    pub pz: String,
    /// Reconstructed transverse momentum.
    pub pt: String,
    /// Pseudorapidity.
    pub eta: String,
    /// Track ghost probability.
    pub ghost_prob: String,
    /// Track fit χ²/ndof.
    pub track_chi2ndof: String,
    /// Impact-parameter χ².
    pub ip_chi2: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        let s = |v: &str| v.to_string();
        Self {
            event: s("event_number"),
            true_id: s("true_id"),
            reco_id: s("reco_id"),
            prob_pi: s("prob_pi"),
            prob_k: s("prob_k"),
            prob_p: s("prob_p"),
            pid_k: s("pid_k"),
            pid_p: s("pid_p"),
            true_e: s("true_e"),
            true_px: s("true_px"),
            true_py: s("true_py"),
            true_pz: s("true_pz"),
            true_pt: s("true_pt"),
            p: s("p"),
            px: s("px"),
            py: s("py"),
            pz: s("pz"),
            pt: s("pt"),
            eta: s("eta"),
            ghost_prob: s("ghost_prob"),
            track_chi2ndof: s("track_chi2ndof"),
            ip_chi2: s("ip_chi2"),
        }
    }
}

impl ColumnNames {
    /// Probability column of `species`.
    pub fn prob(&self, species: Species) -> &str {
        match species {
            Species::Pion => &self.prob_pi,
            Species::Kaon => &self.prob_k,
            Species::Proton => &self.prob_p,
        }
    }

    fn validate(&self) -> Result<()> {
        let named = [
            ("event", &self.event),
            ("true_id", &self.true_id),
            ("reco_id", &self.reco_id),
            ("prob_pi", &self.prob_pi),
            ("prob_k", &self.prob_k),
            ("prob_p", &self.prob_p),
            ("p", &self.p),
            ("pt", &self.pt),
            ("eta", &self.eta),
        ];
        if let Some((role, _)) = named.iter().find(|(_, n)| n.trim().is_empty()) {
            return Err(Error::Validation(format!("column name for '{role}' must not be empty")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Binning of the mass spectra and multiplicity distributions (MeV / counts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassSpectraConfig {
    /// ππ mass.
    pub pipi: AxisConfig,
    /// pπ mass.
    pub ppi: AxisConfig,
    /// KK mass.
    pub kk: AxisConfig,
    /// π multiplicity per event.
    pub multiplicity_pi: AxisConfig,
    /// K multiplicity per event.
    pub multiplicity_k: AxisConfig,
    /// p multiplicity per event.
    pub multiplicity_p: AxisConfig,
}

impl Default for MassSpectraConfig {
    fn default() -> Self {
        Self {
            pipi: AxisConfig::new(100, 250.0, 1000.0),
            ppi: AxisConfig::new(100, 1000.0, 2500.0),
            kk: AxisConfig::new(100, 950.0, 1500.0),
            multiplicity_pi: AxisConfig::new(50, 0.0, 50.0),
            multiplicity_k: AxisConfig::new(20, 0.0, 20.0),
            multiplicity_p: AxisConfig::new(20, 0.0, 20.0),
        }
    }
}

impl MassSpectraConfig {
    /// Multiplicity binning of `species`.
    pub const fn multiplicity(&self, species: Species) -> AxisConfig {
        match species {
            Species::Pion => self.multiplicity_pi,
            Species::Kaon => self.multiplicity_k,
            Species::Proton => self.multiplicity_p,
        }
    }

    fn validate(&self) -> Result<()> {
        self.pipi.validate("mass.pipi")?;
        self.ppi.validate("mass.ppi")?;
        self.kk.validate("mass.kk")?;
        self.multiplicity_pi.validate("mass.multiplicity_pi")?;
        self.multiplicity_k.validate("mass.multiplicity_k")?;
        self.multiplicity_p.validate("mass.multiplicity_p")
    }
}

/// Binning of the efficiency/purity curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Transverse-momentum binning (MeV).
    pub pt: AxisConfig,
    /// Pseudorapidity binning.
    pub eta: AxisConfig,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self { pt: AxisConfig::new(50, 0.0, 2000.0), eta: AxisConfig::new(25, 2.0, 5.0) }
    }
}

/// Axis and cutoff records of the PID histogram suite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidHistConfig {
    /// Legacy likelihood variable.
    pub pid: Hist1DConfig,
    /// Probability score.
    pub probnn: Hist1DConfig,
    /// Likelihood vs. same-species probability.
    pub pid_probnn: Hist2DConfig,
    /// Likelihood vs. π probability.
    pub pid_probnnpi: Hist2DConfig,
    /// Truth pT vs. probability.
    pub probnn_pt: Hist2DConfig,
    /// Pseudorapidity vs. probability.
    pub probnn_eta: Hist2DConfig,
}

impl Default for PidHistConfig {
    fn default() -> Self {
        let pid_axis = AxisConfig::new(50, 0.0, 100.0);
        let probnn_axis = AxisConfig::new(50, 0.9, 1.0);
        Self {
            pid: Hist1DConfig { cutoff: 0.1, axis: pid_axis },
            probnn: Hist1DConfig { cutoff: 0.9, axis: probnn_axis },
            pid_probnn: Hist2DConfig { cutoff_x: 0.1, cutoff_y: 0.9, x: pid_axis, y: probnn_axis },
            pid_probnnpi: Hist2DConfig {
                cutoff_x: 0.1,
                cutoff_y: 0.9,
                x: pid_axis,
                y: AxisConfig::new(50, 0.0, 1.0),
            },
            probnn_pt: Hist2DConfig {
                cutoff_x: 0.0,
                cutoff_y: 0.9,
                x: AxisConfig::new(50, 0.0, 2000.0),
                y: probnn_axis,
            },
            probnn_eta: Hist2DConfig {
                cutoff_x: 0.0,
                cutoff_y: 0.9,
                x: AxisConfig::new(50, 2.0, 5.0),
                y: probnn_axis,
            },
        }
    }
}

impl PidHistConfig {
    fn validate(&self) -> Result<()> {
        self.pid.validate("pid_histograms.pid")?;
        self.probnn.validate("pid_histograms.probnn")?;
        self.pid_probnn.validate("pid_histograms.pid_probnn")?;
        self.pid_probnnpi.validate("pid_histograms.pid_probnnpi")?;
        self.probnn_pt.validate("pid_histograms.probnn_pt")?;
        self.probnn_eta.validate("pid_histograms.probnn_eta")
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Complete configuration of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input column names.
    pub columns: ColumnNames,
    /// Preselection thresholds.
    pub preselection: PreselectionCuts,
    /// Reconstructed-scheme probability cutoffs.
    pub probability: ProbabilityCuts,
    /// Species exclusivity used by the mass engine's reconstructed pass.
    pub mass_exclusivity: Exclusivity,
    /// Mass and multiplicity binning.
    pub mass: MassSpectraConfig,
    /// Efficiency/purity binning.
    pub efficiency: EfficiencyConfig,
    /// PID histogram suite.
    pub pid_histograms: PidHistConfig,
    /// Process events on the rayon thread pool.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            preselection: PreselectionCuts::default(),
            probability: ProbabilityCuts::default(),
            mass_exclusivity: Exclusivity::Independent,
            mass: MassSpectraConfig::default(),
            efficiency: EfficiencyConfig::default(),
            pid_histograms: PidHistConfig::default(),
            parallel: false,
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: AnalysisConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&s)
    }

    /// Check every nested record.
    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;
        self.preselection.validate()?;
        self.probability.validate()?;
        self.mass.validate()?;
        self.efficiency.pt.validate("efficiency.pt")?;
        self.efficiency.eta.validate("efficiency.eta")?;
        self.pid_histograms.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AnalysisConfig::from_json_str(
            r#"{ "probability": { "kaon": 0.8 }, "mass": { "kk": { "bins": 55, "min": 950.0, "max": 1500.0 } }, "parallel": true }"#,
        )
        .unwrap();
        assert_eq!(cfg.probability.kaon, 0.8);
        assert_eq!(cfg.probability.pion, 0.9);
        assert_eq!(cfg.mass.kk.bins, 55);
        assert_eq!(cfg.mass.pipi, AxisConfig::new(100, 250.0, 1000.0));
        assert_eq!(cfg.columns.event, "event_number");
        assert_eq!(cfg.mass_exclusivity, Exclusivity::Independent);
        assert!(cfg.parallel);
    }

    #[test]
    fn zero_bins_rejected() {
        let err = AnalysisConfig::from_json_str(
            r#"{ "efficiency": { "pt": { "bins": 0, "min": 0.0, "max": 2000.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("efficiency.pt")));
    }

    #[test]
    fn inverted_range_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.pid_histograms.probnn.axis = AxisConfig::new(50, 1.0, 0.9);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn cutoff_outside_unit_interval_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.probability.proton = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("probability cutoff for p"));
    }

    #[test]
    fn nan_preselection_threshold_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.preselection.min_pt = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(AnalysisConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }

    #[test]
    fn roundtrip_through_json() {
        let cfg = AnalysisConfig { mass_exclusivity: Exclusivity::FirstMatch, ..Default::default() };
        let s = serde_json::to_string(&cfg).unwrap();
        assert_eq!(AnalysisConfig::from_json_str(&s).unwrap(), cfg);
    }
}
