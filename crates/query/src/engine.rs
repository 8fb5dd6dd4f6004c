use crate::error::QueryError;
use crate::selection::{PeriodRange, Selection};
use core_types::{CellValue, CityTable, Dataset, RowSet, columns};
use periods::PeriodResolver;
use std::collections::BTreeSet;

/// Origin substrings that mark a subtotal or grand-total row. Matched lower-cased.
pub const AGGREGATE_MARKERS: [&str; 3] = ["total", "geral", "consolidado"];

/// Whether an origin cell names an aggregate row rather than a real channel.
pub fn is_aggregate_origin(origin: &CellValue) -> bool {
    origin.label().is_some_and(|label| {
        let label = label.trim().to_lowercase();
        AGGREGATE_MARKERS.iter().any(|marker| label.contains(marker))
    })
}

/// Filters city tables down to the rows an analysis should see.
///
/// Every output has aggregate rows removed, whatever else the selection asks for. Queries are
/// pure: the same dataset and selection always yield the same row set.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    resolver: PeriodResolver,
}

impl QueryEngine {
    pub fn new(resolver: PeriodResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    /// Selects rows for one city.
    ///
    /// The period filter compares resolved periods inclusively and applies only when the table
    /// has a `periodo` column. Rows whose period falls back to the sentinel are compared like
    /// any other, so a realistic range never includes them.
    pub fn select(&self, dataset: &Dataset, selection: &Selection) -> Result<RowSet, QueryError> {
        let table = self.table(dataset, &selection.city)?;
        let origin_col = table.column_index(columns::ORIGIN);
        let period_col = table.column_index(columns::PERIOD);
        let whitelist = selection.origin_whitelist();

        let rows = table.retain_rows(|row| {
            let origin = origin_col.map(|idx| &row[idx]);
            if origin.is_some_and(is_aggregate_origin) {
                return false;
            }
            if let (Some(range), Some(idx)) = (selection.range, period_col) {
                if !range.contains(self.resolver.resolve_cell(&row[idx])) {
                    return false;
                }
            }
            match whitelist {
                Some(allowed) => origin
                    .and_then(CellValue::label)
                    .is_some_and(|label| allowed.contains(&label)),
                None => true,
            }
        });

        tracing::debug!(
            city = %selection.city,
            total = table.len(),
            selected = rows.len(),
            "Selection applied."
        );
        Ok(rows)
    }

    /// The distinct origins available for a city within `range`, sorted. Aggregate rows and
    /// blank origins never appear.
    pub fn origins(
        &self,
        dataset: &Dataset,
        city: &str,
        range: Option<PeriodRange>,
    ) -> Result<Vec<String>, QueryError> {
        let mut selection = Selection::city(city);
        selection.range = range;
        let rows = self.select(dataset, &selection)?;

        let origins: BTreeSet<String> = rows
            .column_cells(columns::ORIGIN)
            .filter(|cell| !cell.is_empty())
            .filter_map(CellValue::label)
            .collect();
        Ok(origins.into_iter().collect())
    }

    /// The widest range the period selector offers: first through last known period.
    pub fn default_range(&self, dataset: &Dataset) -> Option<PeriodRange> {
        let first = dataset.periods().first()?;
        let last = dataset.periods().last()?;
        Some(PeriodRange::new(first.period, last.period))
    }

    fn table<'a>(&self, dataset: &'a Dataset, city: &str) -> Result<&'a CityTable, QueryError> {
        dataset.table(city).ok_or_else(|| {
            tracing::warn!(city, "Unknown city requested.");
            QueryError::UnknownCity(city.to_string())
        })
    }
}
