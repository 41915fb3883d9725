//! Binned purity and efficiency of the probability-cut identification.
//!
//! Particles are sorted by the binning variable and merged against the bin
//! edges in one ordered pass. A value equal to a bin's upper edge stays in that
//! bin; values outside `[min, max]` are not counted. Empty denominators give a
//! ratio of exactly 0.

use pm_core::{Result, Species};
use pm_hist::{Axis, Curve};
use serde::{Deserialize, Serialize};

use crate::classify::{Exclusivity, classify_reconstructed};
use crate::config::{AxisConfig, ColumnNames, EfficiencyConfig, ProbabilityCuts};
use crate::table::ParticleTable;

/// Which ratio is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    /// Truth members passing their own probability cutoff, over truth members.
    Purity,
    /// Identified rows that are truly that species, over identified rows
    /// (first-match identification).
    Efficiency,
}

impl RatioKind {
    /// Both kinds.
    pub const ALL: [RatioKind; 2] = [RatioKind::Purity, RatioKind::Efficiency];

    /// Name used in destinations.
    pub const fn label(self) -> &'static str {
        match self {
            RatioKind::Purity => "purity",
            RatioKind::Efficiency => "efficiency",
        }
    }
}

/// Binning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinningVariable {
    /// Transverse momentum.
    Pt,
    /// Pseudorapidity.
    Eta,
}

impl BinningVariable {
    /// Both variables.
    pub const ALL: [BinningVariable; 2] = [BinningVariable::Pt, BinningVariable::Eta];

    /// Name used in destinations.
    pub const fn label(self) -> &'static str {
        match self {
            BinningVariable::Pt => "pt",
            BinningVariable::Eta => "eta",
        }
    }

    fn axis_title(self) -> &'static str {
        match self {
            BinningVariable::Pt => "P_{t} [MeV]",
            BinningVariable::Eta => "#eta",
        }
    }

    fn column(self, columns: &ColumnNames) -> &str {
        match self {
            BinningVariable::Pt => &columns.pt,
            BinningVariable::Eta => &columns.eta,
        }
    }

    fn axis(self, config: &EfficiencyConfig) -> AxisConfig {
        match self {
            BinningVariable::Pt => config.pt,
            BinningVariable::Eta => config.eta,
        }
    }
}

/// One ratio kind over one variable: a curve per species.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyCurves {
    /// Ratio kind.
    pub kind: RatioKind,
    /// Binning variable.
    pub variable: BinningVariable,
    /// Curves in [`Species::ALL`] order.
    pub curves: Vec<(Species, Curve)>,
}

impl EfficiencyCurves {
    /// Destination name of `species`' curve, e.g. `efficiency/purity_pt_pi`.
    pub fn destination(&self, species: Species) -> String {
        format!("efficiency/{}_{}_{}", self.kind.label(), self.variable.label(), species.label())
    }
}

/// Per-bin ratio from rows sorted ascending by `values`.
///
/// `flags[i]` is `(in numerator, in denominator)`; numerator rows outside the
/// denominator are ignored.
pub fn ordered_bin_ratio(axis: &Axis, values: &[f64], flags: &[(bool, bool)]) -> Vec<f64> {
    let n = axis.n_bins();
    let mut numerator = vec![0u64; n];
    let mut denominator = vec![0u64; n];
    let mut bin = 0usize;

    for (&v, &(num, den)) in values.iter().zip(flags) {
        if v.is_nan() || v < axis.min() {
            continue;
        }
        while bin < n && v > axis.upper_edge(bin) {
            bin += 1;
        }
        if bin == n {
            break;
        }
        if den {
            denominator[bin] += 1;
            if num {
                numerator[bin] += 1;
            }
        }
    }

    numerator
        .iter()
        .zip(&denominator)
        .map(|(&k, &d)| if d == 0 { 0.0 } else { k as f64 / d as f64 })
        .collect()
}

/// Computes purity and efficiency curves on a simulated table.
#[derive(Debug, Clone)]
pub struct EfficiencyEstimator<'a> {
    columns: &'a ColumnNames,
    cuts: ProbabilityCuts,
    config: EfficiencyConfig,
}

impl<'a> EfficiencyEstimator<'a> {
    /// Estimator with the given columns, cutoffs and binning.
    pub fn new(columns: &'a ColumnNames, cuts: ProbabilityCuts, config: EfficiencyConfig) -> Self {
        Self { columns, cuts, config }
    }

    /// One ratio kind over one variable, for every species.
    pub fn estimate(
        &self,
        table: &ParticleTable,
        kind: RatioKind,
        variable: BinningVariable,
    ) -> Result<EfficiencyCurves> {
        let axis = variable.axis(&self.config).to_axis()?;
        let var = table.require(variable.column(self.columns))?;
        let true_id = table.require(&self.columns.true_id)?;
        let probs = [
            table.require(self.columns.prob(Species::Pion))?,
            table.require(self.columns.prob(Species::Kaon))?,
            table.require(self.columns.prob(Species::Proton))?,
        ];
        let reco_id = match kind {
            RatioKind::Efficiency => Some(table.require(&self.columns.reco_id)?),
            RatioKind::Purity => None,
        };

        let mut order: Vec<usize> = (0..table.n_rows()).collect();
        order.sort_by(|&a, &b| var[a].total_cmp(&var[b]));
        let sorted: Vec<f64> = order.iter().map(|&i| var[i]).collect();

        let mut curves = Vec::with_capacity(Species::ALL.len());
        for species in Species::ALL {
            let is_true = |i: usize| {
                Species::from_abs_pdg(ParticleTable::int_value(true_id[i])) == Some(species)
            };
            let flags: Vec<(bool, bool)> = order
                .iter()
                .map(|&i| match reco_id {
                    None => {
                        let passes = probs[species.index()][i] > self.cuts.cutoff(species);
                        (is_true(i) && passes, is_true(i))
                    }
                    Some(reco) => {
                        let identified = classify_reconstructed(
                            ParticleTable::int_value(reco[i]),
                            [probs[0][i], probs[1][i], probs[2][i]],
                            &self.cuts,
                            Exclusivity::FirstMatch,
                        )
                        .contains_species(species);
                        (identified && is_true(i), identified)
                    }
                })
                .collect();

            let ratio = ordered_bin_ratio(&axis, &sorted, &flags);
            let name = format!("{}_{}_{}", kind.label(), variable.label(), species.label());
            let title = format!(
                "{} {} vs {};{};{}",
                species.label(),
                kind.label(),
                variable.label(),
                variable.axis_title(),
                kind.label()
            );
            curves.push((species, Curve::new(name, title, axis.centers(), ratio)?));
        }

        tracing::debug!(
            kind = kind.label(),
            variable = variable.label(),
            rows = table.n_rows(),
            bins = axis.n_bins(),
            "efficiency curves computed"
        );
        Ok(EfficiencyCurves { kind, variable, curves })
    }

    /// All four `{purity, efficiency} × {pT, η}` variants.
    pub fn estimate_all(&self, table: &ParticleTable) -> Result<Vec<EfficiencyCurves>> {
        let mut out = Vec::with_capacity(4);
        for kind in RatioKind::ALL {
            for variable in BinningVariable::ALL {
                out.push(self.estimate(table, kind, variable)?);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn axis(n: usize, lo: f64, hi: f64) -> Axis {
        Axis::new(n, lo, hi).unwrap()
    }

    #[test]
    fn single_bin_ratio_is_global_fraction() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5];
        let flags = [(true, true), (false, true), (true, true), (false, false), (false, true)];
        let r = ordered_bin_ratio(&axis(1, 0.0, 1.0), &values, &flags);
        assert_relative_eq!(r[0], 2.0 / 4.0);
    }

    #[test]
    fn empty_denominator_is_zero() {
        let r = ordered_bin_ratio(&axis(3, 0.0, 3.0), &[0.5, 2.5], &[(true, true), (false, true)]);
        assert_eq!(r, vec![1.0, 0.0, 0.0]);
        assert!(r.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn skips_several_empty_bins() {
        let values = [0.5, 3.5, 3.6, 4.5];
        let flags = [(true, true), (true, true), (false, true), (false, true)];
        let r = ordered_bin_ratio(&axis(5, 0.0, 5.0), &values, &flags);
        assert_eq!(r, vec![1.0, 0.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let values = [-1.0, 0.5, 1.0, 2.0, 7.0];
        let flags = [(false, true), (true, true), (false, true), (true, true), (false, true)];
        let r = ordered_bin_ratio(&axis(2, 0.0, 2.0), &values, &flags);
        // 1.0 sits on the first bin's upper edge, 2.0 on the axis maximum.
        assert_eq!(r, vec![0.5, 1.0]);
    }

    #[test]
    fn no_rows_gives_all_zero() {
        let r = ordered_bin_ratio(&axis(4, 0.0, 1.0), &[], &[]);
        assert_eq!(r, vec![0.0; 4]);
    }

    fn sample() -> ParticleTable {
        let c = ColumnNames::default();
        // rows: (true_id, reco_id, prob_pi, prob_k, prob_p, pt, eta)
        let rows: [[f64; 7]; 6] = [
            [211.0, 211.0, 0.95, 0.10, 0.00, 150.0, 2.5],
            [211.0, 211.0, 0.50, 0.10, 0.00, 170.0, 2.6],
            [-211.0, -211.0, 0.99, 0.95, 0.00, 1500.0, 3.5],
            [321.0, 321.0, 0.10, 0.95, 0.00, 160.0, 2.7],
            [-321.0, -321.0, 0.95, 0.95, 0.00, 1600.0, 4.5],
            [2212.0, 2212.0, 0.00, 0.00, 0.80, 900.0, 3.0],
        ];
        let col = |j: usize| rows.iter().map(|r| r[j]).collect::<Vec<_>>();
        ParticleTable::from_columns([
            (c.true_id.clone(), col(0)),
            (c.reco_id.clone(), col(1)),
            (c.prob_pi.clone(), col(2)),
            (c.prob_k.clone(), col(3)),
            (c.prob_p.clone(), col(4)),
            (c.pt.clone(), col(5)),
            (c.eta.clone(), col(6)),
        ])
        .unwrap()
    }

    fn one_bin_config() -> EfficiencyConfig {
        EfficiencyConfig { pt: AxisConfig::new(1, 0.0, 2000.0), eta: AxisConfig::new(1, 2.0, 5.0) }
    }

    #[test]
    fn purity_over_single_bin() {
        let c = ColumnNames::default();
        let est = EfficiencyEstimator::new(&c, ProbabilityCuts::default(), one_bin_config());
        let curves = est.estimate(&sample(), RatioKind::Purity, BinningVariable::Pt).unwrap();

        let y = |s: Species| curves.curves[s.index()].1.y[0];
        assert_relative_eq!(y(Species::Pion), 2.0 / 3.0);
        assert_relative_eq!(y(Species::Kaon), 1.0);
        assert_eq!(y(Species::Proton), 0.0);
        assert_eq!(curves.destination(Species::Kaon), "efficiency/purity_pt_K");
    }

    #[test]
    fn efficiency_uses_first_match() {
        let c = ColumnNames::default();
        let est = EfficiencyEstimator::new(&c, ProbabilityCuts::default(), one_bin_config());
        let curves = est.estimate(&sample(), RatioKind::Efficiency, BinningVariable::Eta).unwrap();

        let y = |s: Species| curves.curves[s.index()].1.y[0];
        // identified as pi: rows 0, 2, 4 (row 4 passes pi first); truly pi: 0, 2.
        assert_relative_eq!(y(Species::Pion), 2.0 / 3.0);
        // identified as K: row 3 only.
        assert_relative_eq!(y(Species::Kaon), 1.0);
        // nothing identified as p.
        assert_eq!(y(Species::Proton), 0.0);
        assert_eq!(curves.curves[0].1.x, vec![3.5]);
    }

    #[test]
    fn estimate_all_covers_four_variants() {
        let c = ColumnNames::default();
        let est = EfficiencyEstimator::new(&c, ProbabilityCuts::default(), EfficiencyConfig::default());
        let all = est.estimate_all(&sample()).unwrap();
        assert_eq!(all.len(), 4);
        for curves in &all {
            assert_eq!(curves.curves.len(), 3);
        }
        assert_eq!(all[0].curves[0].1.len(), 50);
        assert_eq!(all[1].curves[0].1.len(), 25);
    }
}
