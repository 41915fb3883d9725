//! Confusion counts of the K and p identification variables.

use std::io::Write;
use std::path::Path;

use pm_core::{Result, Species};
use serde::Serialize;

use crate::config::{ColumnNames, PidHistConfig};
use crate::table::ParticleTable;

/// Identification variable family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PidVariable {
    /// Legacy likelihood difference (`pid_k`, `pid_p`).
    #[serde(rename = "PID")]
    Dll,
    /// Probability score (`prob_k`, `prob_p`).
    #[serde(rename = "ProbNN")]
    ProbNN,
}

impl PidVariable {
    /// Both families.
    pub const ALL: [PidVariable; 2] = [PidVariable::Dll, PidVariable::ProbNN];

    fn column<'c>(self, columns: &'c ColumnNames, species: Species) -> &'c str {
        match (self, species) {
            (PidVariable::Dll, Species::Kaon) => &columns.pid_k,
            (PidVariable::Dll, _) => &columns.pid_p,
            (PidVariable::ProbNN, s) => columns.prob(s),
        }
    }
}

/// Counts among rows whose identification variable passes the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidStatistics {
    /// Variable family.
    pub variable: PidVariable,
    /// Species under test.
    pub species: Species,
    /// Rows passing the cut.
    pub total: u64,
    /// Truly `species`, reconstructed as `species`.
    pub true_positive: u64,
    /// Not `species`, reconstructed as `species`.
    pub false_positive: u64,
    /// Not `species`, not reconstructed as `species`.
    pub true_negative: u64,
    /// Truly `species`, not reconstructed as `species`.
    pub false_negative: u64,
}

/// Statistics for K and p under both variable families. The cutoffs are the
/// `pid` and `probnn` cutoffs of the histogram configuration.
pub fn pid_statistics(
    table: &ParticleTable,
    columns: &ColumnNames,
    config: &PidHistConfig,
) -> Result<Vec<PidStatistics>> {
    let true_id = table.require(&columns.true_id)?;
    let reco_id = table.require(&columns.reco_id)?;

    let mut out = Vec::with_capacity(4);
    for variable in PidVariable::ALL {
        let cutoff = match variable {
            PidVariable::Dll => config.pid.cutoff,
            PidVariable::ProbNN => config.probnn.cutoff,
        };
        for species in [Species::Kaon, Species::Proton] {
            let values = table.require(variable.column(columns, species))?;
            let pdg = species.pdg();
            let mut row = PidStatistics {
                variable,
                species,
                total: 0,
                true_positive: 0,
                false_positive: 0,
                true_negative: 0,
                false_negative: 0,
            };
            for i in (0..table.n_rows()).filter(|&i| values[i] > cutoff) {
                row.total += 1;
                let truly = ParticleTable::int_value(true_id[i]).abs() == pdg;
                let reco = ParticleTable::int_value(reco_id[i]).abs() == pdg;
                match (truly, reco) {
                    (true, true) => row.true_positive += 1,
                    (false, true) => row.false_positive += 1,
                    (false, false) => row.true_negative += 1,
                    (true, false) => row.false_negative += 1,
                }
            }
            out.push(row);
        }
    }
    Ok(out)
}

/// Write statistics as CSV with a header row.
pub fn write_statistics_csv<W: Write>(rows: &[PidStatistics], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write statistics to a CSV file, creating parent directories.
pub fn write_statistics_csv_file(rows: &[PidStatistics], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_statistics_csv(rows, std::fs::File::create(path)?)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "PID statistics written");
    Ok(())
}
