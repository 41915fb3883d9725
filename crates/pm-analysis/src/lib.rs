//! # pm-analysis
//!
//! Per-event pairing analysis of charged hadrons: preselection, event
//! partitioning, species classification under truth and reconstructed
//! schemes, opposite-charge invariant-mass spectra, multiplicities and
//! PID performance (purity/efficiency curves, confusion counts, PID
//! histograms).
//!
//! ```
//! use pm_analysis::{Analysis, AnalysisConfig, InMemoryProvider, ParticleTable, SampleKind};
//! use pm_hist::MemorySink;
//!
//! let c = pm_analysis::ColumnNames::default();
//! let table = ParticleTable::from_columns([
//!     (c.event.clone(), vec![1.0, 1.0]),
//!     (c.reco_id.clone(), vec![211.0, -211.0]),
//!     (c.prob_pi.clone(), vec![0.95, 0.97]),
//!     (c.prob_k.clone(), vec![0.0, 0.0]),
//!     (c.prob_p.clone(), vec![0.0, 0.0]),
//!     (c.p.clone(), vec![400.0, 400.0]),
//!     (c.px.clone(), vec![0.0, 0.0]),
//!     (c.py.clone(), vec![0.0, 0.0]),
//!     (c.pz.clone(), vec![400.0, -400.0]),
//!     (c.pt.clone(), vec![150.0, 150.0]),
//!     (c.ghost_prob.clone(), vec![0.0, 0.0]),
//!     (c.track_chi2ndof.clone(), vec![1.0, 1.0]),
//!     (c.ip_chi2.clone(), vec![1.0, 1.0]),
//! ])
//! .unwrap();
//!
//! let analysis = Analysis::new(AnalysisConfig::default()).unwrap();
//! let run = analysis.run(&InMemoryProvider::new(table), SampleKind::Recorded).unwrap();
//! assert_eq!(run.reco.pair_count(pm_analysis::Channel::PiPi), 1);
//!
//! let mut sink = MemorySink::new();
//! run.emit(&mut sink).unwrap();
//! assert!(sink.get("recorded/mass/pipi_reco").is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod compare;
pub mod config;
pub mod efficiency;
pub mod pairing;
pub mod partition;
pub mod pid_hists;
pub mod pipeline;
pub mod preselection;
pub mod statistics;
pub mod table;

pub use classify::{Classifier, Exclusivity, Scheme, classify_reconstructed, classify_truth};
pub use compare::{SpectrumComparison, compare_spectra};
pub use config::{
    AnalysisConfig, AxisConfig, ColumnNames, EfficiencyConfig, Hist1DConfig, Hist2DConfig,
    MassSpectraConfig, PidHistConfig, PreselectionCuts, ProbabilityCuts,
};
pub use efficiency::{
    BinningVariable, EfficiencyCurves, EfficiencyEstimator, RatioKind, ordered_bin_ratio,
};
pub use pairing::{
    Channel, MassEngine, MassSpectra, MassSpectrum, MomentumColumns, MomentumSource,
    SpeciesBuckets,
};
pub use partition::EventPartition;
pub use pid_hists::{PidHistSuite, PidHistograms, TruthFilter};
pub use pipeline::{Analysis, AnalysisRun, SampleKind, emit_comparison};
pub use preselection::{PreselectionCut, PreselectionReport, preselect};
pub use statistics::{PidStatistics, PidVariable, pid_statistics, write_statistics_csv};
pub use table::{DatasetProvider, InMemoryProvider, ParticleTable};
