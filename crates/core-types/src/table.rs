use crate::cell::CellValue;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// The rows of one sheet, tagged with the city the sheet describes.
///
/// `index` carries each row's position in the originally ingested table, so a filtered
/// subset still points back at its source rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTable {
    pub city: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub index: Vec<usize>,
}

/// A filtered subset of a `CityTable`. Same shape, already passed through the query layer.
pub type RowSet = CityTable;

impl CityTable {
    /// Builds a table, numbering rows `0..n`.
    pub fn new(
        city: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, CoreError> {
        let index = (0..rows.len()).collect();
        Self::with_index(city, columns, rows, index)
    }

    pub fn with_index(
        city: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        index: Vec<usize>,
    ) -> Result<Self, CoreError> {
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(CoreError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }
        if index.len() != rows.len() {
            return Err(CoreError::InvalidInput(
                "index".to_string(),
                format!("{} labels for {} rows", index.len(), rows.len()),
            ));
        }
        Ok(Self {
            city: city.into(),
            columns,
            rows,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `required` that this table does not have.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Iterates over one column's cells in row order. Yields nothing if the column is absent.
    pub fn column_cells<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> + use<'a> {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |cells| idx.and_then(|i| cells.get(i)))
    }

    /// Keeps the rows for which `keep` returns true, preserving their index labels.
    pub fn retain_rows<F>(&self, mut keep: F) -> RowSet
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let (rows, index) = self
            .rows
            .iter()
            .zip(&self.index)
            .filter(|(cells, _)| keep(cells))
            .map(|(cells, idx)| (cells.clone(), *idx))
            .unzip();
        Self {
            city: self.city.clone(),
            columns: self.columns.clone(),
            rows,
            index,
        }
    }

    /// Writes `value` into `name` on every row, appending the column if needed.
    pub fn set_constant_column(&mut self, name: &str, value: CellValue) {
        match self.column_index(name) {
            Some(idx) => {
                for cells in &mut self.rows {
                    cells[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for cells in &mut self.rows {
                    cells.push(value.clone());
                }
            }
        }
    }

    /// Rewrites every cell of a column in place.
    pub fn map_column<F>(&mut self, column: usize, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        for cells in &mut self.rows {
            if let Some(cell) = cells.get_mut(column) {
                *cell = f(cell);
            }
        }
    }
}
