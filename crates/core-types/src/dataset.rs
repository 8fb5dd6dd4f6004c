use crate::period::PeriodOption;
use crate::table::CityTable;

/// Every city table from one workbook plus the period options observed across them.
///
/// A dataset is immutable once built. A new upload produces a new dataset; nothing patches
/// an existing one in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    tables: Vec<CityTable>,
    periods: Vec<PeriodOption>,
}

impl Dataset {
    /// Tables keep the given order. A later table with a repeated city name replaces the
    /// earlier one.
    pub fn new(tables: Vec<CityTable>, periods: Vec<PeriodOption>) -> Self {
        let mut deduped: Vec<CityTable> = Vec::with_capacity(tables.len());
        for table in tables {
            match deduped.iter_mut().find(|t| t.city == table.city) {
                Some(existing) => *existing = table,
                None => deduped.push(table),
            }
        }
        Self {
            tables: deduped,
            periods,
        }
    }

    pub fn table(&self, city: &str) -> Option<&CityTable> {
        self.tables.iter().find(|t| t.city == city)
    }

    pub fn tables(&self) -> &[CityTable] {
        &self.tables
    }

    /// City names in workbook order. Never contains a synthetic "all cities" entry.
    pub fn cities(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.city.as_str()).collect()
    }

    /// Period options sorted chronologically.
    pub fn periods(&self) -> &[PeriodOption] {
        &self.periods
    }

    /// The raw labels of `periods()`, in the same order.
    pub fn period_labels(&self) -> Vec<&str> {
        self.periods.iter().map(|p| p.value.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
