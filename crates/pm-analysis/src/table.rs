//! Columnar particle storage.

use std::collections::{BTreeMap, HashMap};

use pm_core::{Error, Result};

/// Column-wise particle table (structure of arrays).
///
/// Every column is `f64` and all columns have the same length. Integer-valued
/// quantities (event numbers, PDG codes) are stored as `f64` and read back with
/// [`ParticleTable::int_value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleTable {
    n_rows: usize,
    column_names: Vec<String>,
    columns: Vec<Vec<f64>>,
    name_to_index: HashMap<String, usize>,
}

impl ParticleTable {
    /// Build a table from named columns. Column order follows the names' sort order.
    pub fn from_columns(columns: impl IntoIterator<Item = (String, Vec<f64>)>) -> Result<Self> {
        let by_name: BTreeMap<String, Vec<f64>> = columns.into_iter().collect();

        let mut n_rows: Option<usize> = None;
        for (name, col) in &by_name {
            match n_rows {
                Some(n) if n != col.len() => {
                    return Err(Error::Validation(format!(
                        "column length mismatch for '{name}': expected {n}, got {}",
                        col.len()
                    )));
                }
                Some(_) => {}
                None => n_rows = Some(col.len()),
            }
        }

        let (column_names, columns): (Vec<String>, Vec<Vec<f64>>) = by_name.into_iter().unzip();
        let name_to_index =
            column_names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect::<HashMap<_, _>>();

        Ok(Self { n_rows: n_rows.unwrap_or(0), column_names, columns, name_to_index })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Names of stored columns (sorted).
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// `true` if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let idx = self.name_to_index.get(name).copied()?;
        self.columns.get(idx).map(|c| c.as_slice())
    }

    /// Get a column by name, failing with [`Error::MissingColumn`] if absent.
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.column(name).ok_or_else(|| Error::missing_column(name))
    }

    /// Integer reading of a stored value (PDG codes, event numbers).
    #[inline]
    pub fn int_value(v: f64) -> i64 {
        v.round() as i64
    }

    /// New table holding the rows where `keep[i]` is `true`, in original order.
    pub fn filter(&self, keep: &[bool]) -> Result<ParticleTable> {
        if keep.len() != self.n_rows {
            return Err(Error::Validation(format!(
                "row mask length {} does not match table length {}",
                keep.len(),
                self.n_rows
            )));
        }
        let rows: Vec<usize> = keep.iter().enumerate().filter_map(|(i, &k)| k.then_some(i)).collect();
        self.take(&rows)
    }

    /// New table holding `rows` in the given order.
    pub fn take(&self, rows: &[usize]) -> Result<ParticleTable> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows) {
            return Err(Error::Validation(format!(
                "row index {bad} out of range for table of {} rows",
                self.n_rows
            )));
        }
        let columns =
            self.columns.iter().map(|c| rows.iter().map(|&r| c[r]).collect()).collect();
        Ok(ParticleTable {
            n_rows: rows.len(),
            column_names: self.column_names.clone(),
            columns,
            name_to_index: self.name_to_index.clone(),
        })
    }

    /// Stable sort of all rows by ascending value of `column`. NaN sorts last.
    pub fn sorted_by(&self, column: &str) -> Result<ParticleTable> {
        let key = self.require(column)?;
        let mut order: Vec<usize> = (0..self.n_rows).collect();
        order.sort_by(|&a, &b| key[a].total_cmp(&key[b]));
        self.take(&order)
    }
}

/// Source of particle tables (file readers, generators, in-memory fixtures).
pub trait DatasetProvider {
    /// Produce the table for one sample.
    fn load(&self) -> Result<ParticleTable>;
}

/// Provider that hands out clones of a table it owns.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    table: ParticleTable,
}

impl InMemoryProvider {
    /// Wrap an existing table.
    pub fn new(table: ParticleTable) -> Self {
        Self { table }
    }
}

impl DatasetProvider for InMemoryProvider {
    fn load(&self) -> Result<ParticleTable> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ParticleTable {
        ParticleTable::from_columns([
            ("event".to_string(), vec![7.0, 5.0, 9.0, 5.0]),
            ("x".to_string(), vec![0.0, 1.0, 2.0, 3.0]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = ParticleTable::from_columns([
            ("a".to_string(), vec![1.0, 2.0]),
            ("b".to_string(), vec![1.0]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn empty_table_is_valid() {
        let t = ParticleTable::from_columns([("a".to_string(), vec![])]).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.column("a"), Some(&[][..]));
    }

    #[test]
    fn require_reports_missing_column() {
        let err = table().require("prob_k").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref name } if name == "prob_k"));
    }

    #[test]
    fn sort_is_stable() {
        let sorted = table().sorted_by("event").unwrap();
        assert_eq!(sorted.column("event").unwrap(), &[5.0, 5.0, 7.0, 9.0]);
        assert_eq!(sorted.column("x").unwrap(), &[1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn filter_keeps_order() {
        let t = table().filter(&[true, false, true, false]).unwrap();
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.column("x").unwrap(), &[0.0, 2.0]);
        assert!(table().filter(&[true]).is_err());
    }

    #[test]
    fn provider_hands_out_table() {
        let provider = InMemoryProvider::new(table());
        assert_eq!(provider.load().unwrap(), table());
    }
}
