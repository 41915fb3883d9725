mod common;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use approx::assert_relative_eq;
use pm_analysis::{
    Analysis, AnalysisConfig, Channel, InMemoryProvider, MassSpectrum, SampleKind, emit_comparison,
};
use pm_core::Species;
use pm_hist::{DistributionSink, JsonArtifactSink, MemorySink, OwnedArtifact};

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("pidmass_it_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn analysis() -> Analysis {
    Analysis::new(AnalysisConfig::default()).unwrap()
}

#[test]
fn rerun_is_bit_identical() {
    let provider = InMemoryProvider::new(common::simulated_table(300, 7));
    let a = analysis().run(&provider, SampleKind::Simulated).unwrap();
    let b = analysis().run(&provider, SampleKind::Simulated).unwrap();
    assert_eq!(a, b);

    for ((_, ha), (_, hb)) in a.reco.spectra().zip(b.reco.spectra()) {
        let bits_a: Vec<u64> = ha.bin_content.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = hb.bin_content.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }
}

#[test]
fn parallel_run_matches_sequential() {
    let table = common::simulated_table(500, 11);
    let sequential = analysis().run_table(&table, SampleKind::Simulated).unwrap();
    let config = AnalysisConfig { parallel: true, ..Default::default() };
    let parallel = Analysis::new(config).unwrap().run_table(&table, SampleKind::Simulated).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn simulated_run_fills_everything() {
    let run = analysis().run_table(&common::simulated_table(400, 3), SampleKind::Simulated).unwrap();

    assert!(run.preselection.surviving_rows > 0);
    assert!(run.preselection.total_rejected() > 0);
    assert_eq!(
        run.preselection.input_rows,
        run.preselection.surviving_rows + run.preselection.total_rejected()
    );
    assert!(run.n_events > 0);

    let truth = run.truth.as_ref().unwrap();
    assert_eq!(truth.events as usize, run.n_events);
    assert_eq!(run.reco.events as usize, run.n_events);
    assert!(truth.pair_count(Channel::PiPi) > 0);
    assert_eq!(truth.invalid_pairs, [0; 4]);

    // One multiplicity fill per event and species.
    for species in Species::ALL {
        assert_eq!(run.reco.multiplicity(species).entries as usize, run.n_events);
    }

    assert_eq!(run.efficiency.len(), 4);
    assert_eq!(run.statistics.len(), 4);
    let pid = run.pid_histograms.as_ref().unwrap();
    assert_eq!(pid.one_d.len(), 15);
    assert_eq!(pid.two_d.len(), 30);

    for curves in &run.efficiency {
        for (_, curve) in &curves.curves {
            assert!(curve.y.iter().all(|y| (0.0..=1.0).contains(y)));
        }
    }
}

#[test]
fn emit_to_memory_sink() {
    let run = analysis().run_table(&common::simulated_table(100, 5), SampleKind::Simulated).unwrap();
    let mut sink = MemorySink::new();
    let n = run.emit(&mut sink).unwrap();

    assert_eq!(n, 6 + 6 + 12 + 45);
    assert_eq!(sink.entries().len(), n);
    for dest in [
        "mass/pipi_reco",
        "mass/pipi_true",
        "mass/ppi_true",
        "mass/KK_reco",
        "multiplicity/pi_reco",
        "multiplicity/p_true",
        "efficiency/purity_pt_pi",
        "efficiency/efficiency_eta_K",
        "pid/probnn/probnn_pi_not",
        "pid/pid_probnnpi/hist_Kpi_true",
    ] {
        assert!(sink.get(dest).is_some(), "missing {dest}");
    }
    match sink.get("efficiency/purity_pt_pi") {
        Some(OwnedArtifact::Curve(c)) => assert_eq!(c.len(), 50),
        other => panic!("unexpected artifact: {other:?}"),
    }
}

#[test]
fn recorded_sample_needs_no_truth() {
    let recorded = common::without_truth(&common::simulated_table(200, 9));
    let run = analysis().run_table(&recorded, SampleKind::Recorded).unwrap();
    assert!(run.truth.is_none());
    assert!(run.efficiency.is_empty());
    assert!(run.pid_histograms.is_none());

    let mut sink = MemorySink::new();
    assert_eq!(run.emit(&mut sink).unwrap(), 6);
    assert!(sink.destinations().all(|d| d.starts_with("recorded/")));
}

#[test]
fn simulated_run_requires_truth_columns() {
    let recorded = common::without_truth(&common::simulated_table(20, 9));
    let err = analysis().run_table(&recorded, SampleKind::Simulated).unwrap_err();
    assert!(err.to_string().contains("true_id"));
}

#[test]
fn comparison_is_unit_area() {
    let table = common::simulated_table(400, 21);
    let sim = analysis().run_table(&table, SampleKind::Simulated).unwrap();
    let rec = analysis().run_table(&common::without_truth(&table), SampleKind::Recorded).unwrap();

    let mut sink = MemorySink::new();
    emit_comparison(&sim, &rec, &mut sink).unwrap();
    assert_eq!(sink.entries().len(), 6);

    let pipi = sim.reco.spectrum(MassSpectrum::PiPi);
    assert!(pipi.integral() > 0.0);
    match sink.get("combined/pipi_reco") {
        Some(OwnedArtifact::Histogram1D(h)) => {
            assert_relative_eq!(h.integral(), 1.0, max_relative = 1e-9);
            assert!(h.title.ends_with("normalized events"));
        }
        other => panic!("unexpected artifact: {other:?}"),
    }
}

#[test]
fn json_sink_and_statistics_csv() {
    let root = tmp_dir("export");
    let run = analysis().run_table(&common::simulated_table(80, 13), SampleKind::Simulated).unwrap();

    let mut sink = JsonArtifactSink::new(&root).pretty(true);
    let n = run.emit(&mut sink).unwrap();
    assert_eq!(n, 69);

    let doc: serde_json::Value =
        serde_json::from_slice(&std::fs::read(root.join("mass/KK_true.json")).unwrap()).unwrap();
    assert_eq!(doc["kind"], "histogram_1d");
    assert_eq!(doc["destination"], "mass/KK_true");
    assert_eq!(doc["bin_edges"].as_array().unwrap().len(), 101);

    let doc: serde_json::Value = serde_json::from_slice(
        &std::fs::read(root.join("pid/probnn_eta/probnn_eta_pi.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(doc["kind"], "histogram_2d");

    let csv_path = root.join("statistics/statistics.csv");
    run.write_statistics_csv(&csv_path).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 5);
    assert!(text.starts_with("variable,species,total,"));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn config_file_drives_the_run() {
    let dir = tmp_dir("config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("analysis.json");
    std::fs::write(
        &path,
        r#"{
            "mass": { "pipi": { "bins": 30, "min": 250.0, "max": 1000.0 } },
            "mass_exclusivity": "first_match",
            "parallel": true
        }"#,
    )
    .unwrap();

    let config = AnalysisConfig::from_json_file(&path).unwrap();
    let run = Analysis::new(config)
        .unwrap()
        .run_table(&common::simulated_table(50, 2), SampleKind::Simulated)
        .unwrap();
    assert_eq!(run.reco.spectrum(MassSpectrum::PiPi).bin_content.len(), 30);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn sink_errors_propagate() {
    struct Failing;
    impl DistributionSink for Failing {
        fn accept(&mut self, destination: &str, _: pm_hist::Artifact<'_>) -> pm_core::Result<()> {
            Err(pm_core::Error::Computation(format!("refused {destination}")))
        }
    }
    let run = analysis().run_table(&common::simulated_table(10, 1), SampleKind::Simulated).unwrap();
    let err = run.emit(&mut Failing).unwrap_err();
    assert!(err.to_string().contains("refused mass/pipi_reco"));
}
