//! Event partitioning of a table sorted by event id.

use std::ops::Range;

use pm_core::{Error, Result};

use crate::table::ParticleTable;

/// Per-event row ranges of a sorted table.
///
/// `boundaries[i]` is the first row of event `i` and the last boundary is the
/// row count, so event `i` spans `boundaries[i]..boundaries[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPartition {
    ids: Vec<i64>,
    boundaries: Vec<usize>,
}

impl EventPartition {
    /// Partition a column of event ids sorted ascending.
    ///
    /// Unsorted or non-finite ids are a [`Error::Precondition`] naming the
    /// first offending row.
    pub fn from_sorted_ids(event_ids: &[f64]) -> Result<Self> {
        let mut ids = Vec::new();
        let mut boundaries = vec![0];
        let mut prev: Option<i64> = None;

        for (i, &raw) in event_ids.iter().enumerate() {
            if !raw.is_finite() {
                return Err(Error::Precondition(format!("event id at row {i} is not finite ({raw})")));
            }
            let id = ParticleTable::int_value(raw);
            match prev {
                Some(p) if id < p => {
                    return Err(Error::Precondition(format!(
                        "event ids must be sorted ascending: row {i} has {id} after {p}"
                    )));
                }
                Some(p) if id == p => continue,
                Some(_) => boundaries.push(i),
                None => {}
            }
            ids.push(id);
            prev = Some(id);
        }
        if !event_ids.is_empty() {
            boundaries.push(event_ids.len());
        }

        Ok(Self { ids, boundaries })
    }

    /// Partition `table` on its event column.
    pub fn from_table(table: &ParticleTable, event_column: &str) -> Result<Self> {
        Self::from_sorted_ids(table.require(event_column)?)
    }

    /// Number of events.
    pub fn n_events(&self) -> usize {
        self.ids.len()
    }

    /// Unique event ids in ascending order.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Event boundaries (`n_events + 1` entries; `[0]` when empty).
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Row range of event `i`.
    pub fn range(&self, i: usize) -> Range<usize> {
        self.boundaries[i]..self.boundaries[i + 1]
    }

    /// `(event id, row range)` for every event, in order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Range<usize>)> + '_ {
        self.ids.iter().enumerate().map(|(i, &id)| (id, self.range(i)))
    }

    /// Total number of partitioned rows.
    pub fn n_rows(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }
}
