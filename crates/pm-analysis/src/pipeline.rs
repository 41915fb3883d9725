//! End-to-end analysis of one sample.
//!
//! Load → preselect → sort by event → partition → classify → pair, then (for
//! simulated samples) efficiency curves, PID statistics and the PID histogram
//! suite. The partition is computed once per run and handed to each pass.

use std::path::Path;

use pm_core::{Result, Species};
use pm_hist::{Artifact, DistributionSink};
use serde::{Deserialize, Serialize};

use crate::classify::Classifier;
use crate::compare::compare_spectra;
use crate::config::AnalysisConfig;
use crate::efficiency::{EfficiencyCurves, EfficiencyEstimator};
use crate::pairing::{MassEngine, MassSpectra, MomentumColumns, MomentumSource, SpeciesBuckets};
use crate::partition::EventPartition;
use crate::pid_hists::{PidHistSuite, PidHistograms};
use crate::preselection::{PreselectionReport, preselect};
use crate::statistics::{PidStatistics, pid_statistics, write_statistics_csv_file};
use crate::table::{DatasetProvider, ParticleTable};

/// Kind of input sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    /// Monte Carlo: truth columns available.
    Simulated,
    /// Detector data: reconstructed columns only.
    Recorded,
}

impl SampleKind {
    /// `true` for simulated samples.
    pub const fn has_truth(self) -> bool {
        matches!(self, SampleKind::Simulated)
    }

    fn destination_prefix(self) -> &'static str {
        match self {
            SampleKind::Simulated => "",
            SampleKind::Recorded => "recorded/",
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    /// Sample kind.
    pub kind: SampleKind,
    /// Preselection accounting.
    pub preselection: PreselectionReport,
    /// Events after preselection.
    pub n_events: usize,
    /// Reconstructed-scheme spectra.
    pub reco: MassSpectra,
    /// Truth-scheme spectra (simulated only).
    pub truth: Option<MassSpectra>,
    /// Purity/efficiency curves (simulated only).
    pub efficiency: Vec<EfficiencyCurves>,
    /// PID confusion counts (simulated only).
    pub statistics: Vec<PidStatistics>,
    /// PID histogram suite (simulated only).
    pub pid_histograms: Option<PidHistograms>,
}

impl AnalysisRun {
    /// Hand every distribution to `sink`. Returns the number of artifacts.
    pub fn emit(&self, sink: &mut dyn DistributionSink) -> Result<usize> {
        let prefix = self.kind.destination_prefix();
        let mut n = 0usize;

        for spectra in std::iter::once(&self.reco).chain(self.truth.as_ref()) {
            for (spectrum, h) in spectra.spectra() {
                sink.accept(
                    &format!("{prefix}mass/{}_{}", spectrum.label(), spectra.tag),
                    Artifact::Histogram1D(h),
                )?;
                n += 1;
            }
            for (species, h) in spectra.multiplicities() {
                sink.accept(
                    &format!("{prefix}multiplicity/{}_{}", species.label(), spectra.tag),
                    Artifact::Histogram1D(h),
                )?;
                n += 1;
            }
        }

        for curves in &self.efficiency {
            for (species, curve) in &curves.curves {
                sink.accept(&format!("{prefix}{}", curves.destination(*species)), Artifact::Curve(curve))?;
                n += 1;
            }
        }

        if let Some(pid) = &self.pid_histograms {
            for (dest, h) in &pid.one_d {
                sink.accept(&format!("{prefix}{dest}"), Artifact::Histogram1D(h))?;
                n += 1;
            }
            for (dest, h) in &pid.two_d {
                sink.accept(&format!("{prefix}{dest}"), Artifact::Histogram2D(h))?;
                n += 1;
            }
        }

        tracing::info!(artifacts = n, kind = ?self.kind, "run emitted");
        Ok(n)
    }

    /// Write the PID statistics table (empty for recorded samples).
    pub fn write_statistics_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_statistics_csv_file(&self.statistics, path)
    }
}

/// Normalised reco-vs-reference spectra under `combined/`.
pub fn emit_comparison(
    primary: &AnalysisRun,
    reference: &AnalysisRun,
    sink: &mut dyn DistributionSink,
) -> Result<()> {
    for cmp in compare_spectra(&primary.reco, &reference.reco)? {
        let (a, b) = cmp.destinations();
        sink.accept(&a, Artifact::Histogram1D(&cmp.primary))?;
        sink.accept(&b, Artifact::Histogram1D(&cmp.reference))?;
    }
    Ok(())
}

/// A configured analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Validate `config` and wrap it.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the sample from `provider` and run it.
    pub fn run(&self, provider: &dyn DatasetProvider, kind: SampleKind) -> Result<AnalysisRun> {
        let table = provider.load()?;
        self.run_table(&table, kind)
    }

    /// Run on an in-memory table.
    pub fn run_table(&self, table: &ParticleTable, kind: SampleKind) -> Result<AnalysisRun> {
        let cfg = &self.config;
        let columns = &cfg.columns;
        tracing::info!(rows = table.n_rows(), kind = ?kind, "analysis start");

        let (selected, preselection) = preselect(table, columns, &cfg.preselection, kind.has_truth())?;
        let sorted = selected.sorted_by(&columns.event)?;
        let partition = EventPartition::from_table(&sorted, &columns.event)?;
        tracing::info!(events = partition.n_events(), rows = sorted.n_rows(), "events partitioned");

        let engine = MassEngine::new(cfg.mass).with_parallel(cfg.parallel);

        let reco_classes = Classifier::reconstructed(cfg.probability, cfg.mass_exclusivity)
            .classify(&sorted, columns)?;
        let reco_momenta = MomentumColumns::from_table(&sorted, columns, MomentumSource::Reconstructed)?;
        let reco_buckets = SpeciesBuckets::build(&partition, &reco_classes, &reco_momenta)?;
        let reco = engine.run(&reco_buckets, "reco")?;

        let mut run = AnalysisRun {
            kind,
            preselection,
            n_events: partition.n_events(),
            reco,
            truth: None,
            efficiency: Vec::new(),
            statistics: Vec::new(),
            pid_histograms: None,
        };

        if kind.has_truth() {
            let truth_classes = Classifier::truth().classify(&sorted, columns)?;
            let truth_momenta = MomentumColumns::from_table(&sorted, columns, MomentumSource::Truth)?;
            let truth_buckets = SpeciesBuckets::build(&partition, &truth_classes, &truth_momenta)?;
            run.truth = Some(engine.run(&truth_buckets, "true")?);

            run.efficiency = EfficiencyEstimator::new(columns, cfg.probability, cfg.efficiency)
                .estimate_all(&sorted)?;
            run.statistics = pid_statistics(&sorted, columns, &cfg.pid_histograms)?;
            run.pid_histograms =
                Some(PidHistSuite::standard().fill(&sorted, columns, &cfg.pid_histograms)?);
        }

        tracing::info!(
            events = run.n_events,
            pi_candidates = species_total(&run.reco, Species::Pion),
            k_candidates = species_total(&run.reco, Species::Kaon),
            p_candidates = species_total(&run.reco, Species::Proton),
            "analysis done"
        );
        Ok(run)
    }
}

fn species_total(spectra: &MassSpectra, species: Species) -> u64 {
    pm_core::SignedSpecies::ALL
        .iter()
        .filter(|s| s.species == species)
        .map(|s| spectra.candidates[s.index()])
        .sum()
}
