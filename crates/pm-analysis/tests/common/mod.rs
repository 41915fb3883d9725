//! Synthetic simulated samples for integration tests.

use pm_analysis::{ColumnNames, ParticleTable};
use pm_core::Species;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A simulated sample with `n_events` events, generated in descending event
/// order so the pipeline has to sort it.
pub fn simulated_table(n_events: usize, seed: u64) -> ParticleTable {
    let c = ColumnNames::default();
    let mut rng = StdRng::seed_from_u64(seed);

    let names = [
        &c.event, &c.true_id, &c.reco_id, &c.prob_pi, &c.prob_k, &c.prob_p, &c.pid_k, &c.pid_p,
        &c.true_e, &c.true_px, &c.true_py, &c.true_pz, &c.true_pt, &c.p, &c.px, &c.py, &c.pz,
        &c.pt, &c.eta, &c.ghost_prob, &c.track_chi2ndof, &c.ip_chi2,
    ];
    let mut cols: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for event in (0..n_events).rev() {
        let n_particles = rng.random_range(1..8);
        for _ in 0..n_particles {
            let roll: f64 = rng.random();
            let species = if roll < 0.70 {
                Some(Species::Pion)
            } else if roll < 0.85 {
                Some(Species::Kaon)
            } else if roll < 0.95 {
                Some(Species::Proton)
            } else {
                None
            };
            let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
            let true_id = match species {
                Some(s) => sign * s.pdg() as f64,
                None if rng.random::<bool>() => 0.0,
                None => sign * 13.0,
            };
            let mass = species.map_or(105.66, Species::rest_mass);

            let px: f64 = rng.random_range(-800.0..800.0);
            let py: f64 = rng.random_range(-800.0..800.0);
            let pz: f64 = rng.random_range(500.0..20_000.0);
            let p = (px * px + py * py + pz * pz).sqrt();
            let pt = px.hypot(py);
            let smear = 1.0 + rng.random_range(-0.01..0.01);

            let mut probs = [0.0f64; 3];
            for s in Species::ALL {
                probs[s.index()] = if Some(s) == species {
                    rng.random_range(0.8..1.0)
                } else {
                    rng.random_range(0.0..0.3)
                };
            }
            let best = Species::ALL
                .into_iter()
                .max_by(|a, b| probs[a.index()].total_cmp(&probs[b.index()]))
                .unwrap_or(Species::Pion);

            let row = [
                event as f64,
                true_id,
                sign * best.pdg() as f64,
                probs[0],
                probs[1],
                probs[2],
                rng.random_range(0.0..60.0),
                rng.random_range(0.0..60.0),
                (p * p + mass * mass).sqrt(),
                px,
                py,
                pz,
                pt,
                p * smear,
                px * smear,
                py * smear,
                pz * smear,
                pt * smear,
                (pz / pt).asinh(),
                rng.random_range(0.0..0.4),
                rng.random_range(0.0..4.0),
                rng.random_range(0.0..4.0),
            ];
            for (col, v) in cols.iter_mut().zip(row) {
                col.push(v);
            }
        }
    }

    ParticleTable::from_columns(names.into_iter().cloned().zip(cols)).unwrap()
}

/// Copy of `table` without the truth columns.
pub fn without_truth(table: &ParticleTable) -> ParticleTable {
    let c = ColumnNames::default();
    let truth = [&c.true_id, &c.true_e, &c.true_px, &c.true_py, &c.true_pz, &c.true_pt];
    ParticleTable::from_columns(
        table
            .column_names()
            .iter()
            .filter(|n| !truth.contains(n))
            .map(|n| (n.clone(), table.column(n).unwrap().to_vec())),
    )
    .unwrap()
}
