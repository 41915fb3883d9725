//! Track-quality preselection.

use pm_core::Result;
use serde::Serialize;

use crate::config::{ColumnNames, PreselectionCuts};
use crate::table::ParticleTable;

/// Which cut dropped a row. Cuts are applied in declaration order and a
/// dropped row is attributed to the first cut that rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreselectionCut {
    /// Truth id is 0 (simulated samples only).
    TruthId,
    /// Momentum above the maximum.
    Momentum,
    /// Transverse momentum below the minimum.
    TransverseMomentum,
    /// Ghost probability above the maximum.
    GhostProbability,
    /// Track χ²/ndof above the maximum.
    TrackChi2,
    /// Impact-parameter χ² above the maximum.
    ImpactParameterChi2,
}

impl PreselectionCut {
    /// All cuts in application order.
    pub const ALL: [PreselectionCut; 6] = [
        PreselectionCut::TruthId,
        PreselectionCut::Momentum,
        PreselectionCut::TransverseMomentum,
        PreselectionCut::GhostProbability,
        PreselectionCut::TrackChi2,
        PreselectionCut::ImpactParameterChi2,
    ];
}

/// Row accounting of one preselection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreselectionReport {
    /// Rows in.
    pub input_rows: usize,
    /// Rows out.
    pub surviving_rows: usize,
    /// Rows dropped per cut, in [`PreselectionCut::ALL`] order.
    pub rejected: [usize; 6],
}

impl PreselectionReport {
    /// Rows dropped by `cut`.
    pub fn rejected_by(&self, cut: PreselectionCut) -> usize {
        self.rejected[cut as usize]
    }

    /// Rows dropped in total.
    pub fn total_rejected(&self) -> usize {
        self.rejected.iter().sum()
    }
}

/// Drop rows failing any quality cut. The truth-id cut only applies when
/// `truth_available`. Comparisons involving NaN never reject.
pub fn preselect(
    table: &ParticleTable,
    columns: &ColumnNames,
    cuts: &PreselectionCuts,
    truth_available: bool,
) -> Result<(ParticleTable, PreselectionReport)> {
    let true_id = if truth_available { Some(table.require(&columns.true_id)?) } else { None };
    let p = table.require(&columns.p)?;
    let pt = table.require(&columns.pt)?;
    let ghost = table.require(&columns.ghost_prob)?;
    let chi2 = table.require(&columns.track_chi2ndof)?;
    let ip = table.require(&columns.ip_chi2)?;

    let mut report = PreselectionReport { input_rows: table.n_rows(), ..Default::default() };
    let mut keep = vec![false; table.n_rows()];

    for (i, k) in keep.iter_mut().enumerate() {
        let failed = if true_id.is_some_and(|ids| ParticleTable::int_value(ids[i]) == 0) {
            Some(PreselectionCut::TruthId)
        } else if p[i] > cuts.max_p {
            Some(PreselectionCut::Momentum)
        } else if pt[i] < cuts.min_pt {
            Some(PreselectionCut::TransverseMomentum)
        } else if ghost[i] > cuts.max_ghost_prob {
            Some(PreselectionCut::GhostProbability)
        } else if chi2[i] > cuts.max_track_chi2ndof {
            Some(PreselectionCut::TrackChi2)
        } else if ip[i] > cuts.max_ip_chi2 {
            Some(PreselectionCut::ImpactParameterChi2)
        } else {
            None
        };
        match failed {
            Some(cut) => report.rejected[cut as usize] += 1,
            None => *k = true,
        }
    }

    let out = table.filter(&keep)?;
    report.surviving_rows = out.n_rows();
    tracing::info!(
        input = report.input_rows,
        surviving = report.surviving_rows,
        truth_id = report.rejected_by(PreselectionCut::TruthId),
        momentum = report.rejected_by(PreselectionCut::Momentum),
        pt = report.rejected_by(PreselectionCut::TransverseMomentum),
        ghost_prob = report.rejected_by(PreselectionCut::GhostProbability),
        track_chi2 = report.rejected_by(PreselectionCut::TrackChi2),
        ip_chi2 = report.rejected_by(PreselectionCut::ImpactParameterChi2),
        "preselection done"
    );
    Ok((out, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[f64; 6]]) -> ParticleTable {
        let c = ColumnNames::default();
        let col = |j: usize| rows.iter().map(|r| r[j]).collect::<Vec<_>>();
        ParticleTable::from_columns([
            (c.true_id.clone(), col(0)),
            (c.p.clone(), col(1)),
            (c.pt.clone(), col(2)),
            (c.ghost_prob.clone(), col(3)),
            (c.track_chi2ndof.clone(), col(4)),
            (c.ip_chi2.clone(), col(5)),
        ])
        .unwrap()
    }

    const GOOD: [f64; 6] = [211.0, 5000.0, 500.0, 0.1, 1.0, 1.0];

    #[test]
    fn each_cut_rejects() {
        let mut rows = vec![GOOD; 7];
        rows[1][0] = 0.0;
        rows[2][1] = 100_001.0;
        rows[3][2] = 99.0;
        rows[4][3] = 0.31;
        rows[5][4] = 3.5;
        rows[6][5] = 4.0;

        let (out, report) =
            preselect(&table(&rows), &ColumnNames::default(), &PreselectionCuts::default(), true)
                .unwrap();
        assert_eq!(out.n_rows(), 1);
        assert_eq!(report.input_rows, 7);
        assert_eq!(report.surviving_rows, 1);
        assert_eq!(report.rejected, [1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let rows = [[211.0, 100_000.0, 100.0, 0.3, 3.0, 3.0]];
        let (out, _) =
            preselect(&table(&rows), &ColumnNames::default(), &PreselectionCuts::default(), true)
                .unwrap();
        assert_eq!(out.n_rows(), 1);
    }

    #[test]
    fn truth_cut_skipped_for_recorded_data() {
        let mut row = GOOD;
        row[0] = 0.0;
        let (out, report) =
            preselect(&table(&[row]), &ColumnNames::default(), &PreselectionCuts::default(), false)
                .unwrap();
        assert_eq!(out.n_rows(), 1);
        assert_eq!(report.total_rejected(), 0);
    }

    #[test]
    fn first_failing_cut_is_attributed() {
        let row = [0.0, 200_000.0, 10.0, 0.9, 9.0, 9.0];
        let (out, report) =
            preselect(&table(&[row]), &ColumnNames::default(), &PreselectionCuts::default(), true)
                .unwrap();
        assert!(out.is_empty());
        assert_eq!(report.rejected_by(PreselectionCut::TruthId), 1);
        assert_eq!(report.total_rejected(), 1);
    }

    #[test]
    fn empty_output_is_valid() {
        let (out, report) =
            preselect(&table(&[]), &ColumnNames::default(), &PreselectionCuts::default(), true).unwrap();
        assert!(out.is_empty());
        assert_eq!(report.surviving_rows, 0);
    }

    #[test]
    fn missing_quality_column_fails_fast() {
        let c = ColumnNames::default();
        let t = ParticleTable::from_columns([(c.p.clone(), vec![1.0])]).unwrap();
        let err = preselect(&t, &c, &PreselectionCuts::default(), false).unwrap_err();
        assert!(err.to_string().contains("'pt'"));
    }
}
