use crate::cells::from_calamine;
use crate::error::{IngestError, SheetError};
use crate::normalizer::normalize_sheet;
use calamine::{Reader, open_workbook_auto_from_rs};
use configuration::IngestSettings;
use core_types::{CellValue, CityTable, Dataset};
use periods::{PeriodResolver, period_index};
use std::io::Cursor;
use std::path::Path;

/// The outcome of a successful ingestion.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub dataset: Dataset,
    /// Sheets that were candidates but failed normalization.
    pub skipped: Vec<SheetError>,
}

/// A raw sheet: its name and either its cell grid (header first) or the reason it could not
/// be read.
pub type RawSheet = (String, Result<Vec<Vec<CellValue>>, String>);

/// Reads every sheet of a workbook into a `Dataset`.
///
/// Failures are isolated per sheet: a sheet that cannot be read or normalized is logged and
/// skipped while the rest of the workbook is still ingested.
#[derive(Debug, Clone, Default)]
pub struct WorkbookIngestor {
    settings: IngestSettings,
    resolver: PeriodResolver,
}

impl WorkbookIngestor {
    pub fn new(settings: IngestSettings) -> Self {
        Self {
            settings,
            resolver: PeriodResolver::new(),
        }
    }

    /// Uses `resolver` when building the period index.
    pub fn with_resolver(mut self, resolver: PeriodResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn ingest_path<P: AsRef<Path>>(&self, path: P) -> Result<Ingestion, IngestError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Reading workbook.");
        let bytes = std::fs::read(path)?;
        self.ingest(&bytes)
    }

    /// Ingests an in-memory workbook. The container format is detected from the bytes.
    pub fn ingest(&self, bytes: &[u8]) -> Result<Ingestion, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let mut sheets: Vec<RawSheet> = Vec::new();
        for name in workbook.sheet_names() {
            if self.settings.is_excluded(&name) {
                tracing::debug!(sheet = %name, "Skipping excluded sheet.");
                continue;
            }
            let grid = workbook
                .worksheet_range(&name)
                .map(|range| {
                    range
                        .rows()
                        .map(|row| row.iter().map(from_calamine).collect())
                        .collect()
                })
                .map_err(|e| e.to_string());
            sheets.push((name, grid));
        }

        self.ingest_sheets(sheets)
    }

    /// Normalizes already-extracted sheets and builds the dataset.
    ///
    /// Excluded sheet names are skipped here too, so callers may pass a whole workbook.
    pub fn ingest_sheets<I>(&self, sheets: I) -> Result<Ingestion, IngestError>
    where
        I: IntoIterator<Item = RawSheet>,
    {
        let mut tables: Vec<CityTable> = Vec::new();
        let mut skipped: Vec<SheetError> = Vec::new();

        for (name, grid) in sheets {
            if self.settings.is_excluded(&name) {
                continue;
            }
            let table = grid.and_then(|mut grid| {
                if grid.is_empty() {
                    return Err("the sheet has no header row".to_string());
                }
                let rows = grid.split_off(1);
                normalize_sheet(&name, &grid[0], rows).map_err(|e| e.to_string())
            });
            match table {
                Ok(table) => {
                    tracing::debug!(sheet = %name, rows = table.len(), "Sheet normalized.");
                    tables.push(table);
                }
                Err(reason) => {
                    let error = SheetError {
                        sheet: name,
                        reason,
                    };
                    tracing::warn!(%error, "Skipping sheet.");
                    skipped.push(error);
                }
            }
        }

        if tables.is_empty() {
            return Err(IngestError::NoUsableSheets { skipped });
        }

        let periods = period_index(&self.resolver, &tables);
        let dataset = Dataset::new(tables, periods);
        tracing::info!(
            cities = dataset.cities().len(),
            periods = dataset.periods().len(),
            skipped = skipped.len(),
            "Workbook ingested."
        );

        Ok(Ingestion { dataset, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|r| r.iter().map(|c| CellValue::text(*c)).collect())
            .collect()
    }

    fn ingestor() -> WorkbookIngestor {
        WorkbookIngestor::new(IngestSettings::default())
            .with_resolver(PeriodResolver::with_reference_year(2025))
    }

    #[test]
    fn test_bad_sheet_isolated() {
        let sheets = vec![
            (
                "Recife".to_string(),
                Ok(grid(&[&["Período", "Origem"], &["jan/25", "Google"]])),
            ),
            ("Quebrada".to_string(), Err("corrupt xml".to_string())),
            ("Vazia".to_string(), Ok(vec![])),
        ];
        let ingestion = ingestor().ingest_sheets(sheets).unwrap();
        assert_eq!(ingestion.dataset.cities(), vec!["Recife"]);
        let skipped: Vec<&str> = ingestion.skipped.iter().map(|s| s.sheet.as_str()).collect();
        assert_eq!(skipped, vec!["Quebrada", "Vazia"]);
    }

    #[test]
    fn test_excluded_sheets_never_ingested() {
        let sheets = vec![
            ("Planilha1".to_string(), Ok(grid(&[&["Origem"], &["Total"]]))),
            ("Natal".to_string(), Ok(grid(&[&["Origem"], &["Google"]]))),
        ];
        let ingestion = ingestor().ingest_sheets(sheets).unwrap();
        assert_eq!(ingestion.dataset.cities(), vec!["Natal"]);
        assert!(ingestion.skipped.is_empty());
    }

    #[test]
    fn test_nothing_usable_is_an_error() {
        let sheets = vec![
            ("Planilha1".to_string(), Ok(grid(&[&["Origem"]]))),
            ("Quebrada".to_string(), Err("corrupt".to_string())),
        ];
        match ingestor().ingest_sheets(sheets) {
            Err(IngestError::NoUsableSheets { skipped }) => assert_eq!(skipped.len(), 1),
            other => panic!("expected NoUsableSheets, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_sheet_is_legitimately_empty() {
        let sheets = vec![("Recife".to_string(), Ok(grid(&[&["Origem", "Contatos"]])))];
        let ingestion = ingestor().ingest_sheets(sheets).unwrap();
        let table = ingestion.dataset.table("Recife").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["origem", "contatos", "cidade"]);
    }

    #[test]
    fn test_blank_sheet_is_skipped_not_kept_as_city() {
        let sheets = vec![
            ("Recife".to_string(), Ok(grid(&[&["Origem"], &["Google"]]))),
            ("Rascunho".to_string(), Ok(vec![])),
            ("Branca".to_string(), Ok(grid(&[&["", ""], &["", ""]]))),
        ];
        let ingestion = ingestor().ingest_sheets(sheets).unwrap();
        assert_eq!(ingestion.dataset.cities(), vec!["Recife"]);
        let skipped: Vec<&str> = ingestion.skipped.iter().map(|s| s.sheet.as_str()).collect();
        assert_eq!(skipped, vec!["Rascunho", "Branca"]);

        // A workbook of blank sheets has nothing to offer.
        let blank_only = vec![("Rascunho".to_string(), Ok(vec![]))];
        assert!(matches!(
            ingestor().ingest_sheets(blank_only),
            Err(IngestError::NoUsableSheets { .. })
        ));
    }

    #[test]
    fn test_unreadable_bytes() {
        let err = ingestor().ingest(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, IngestError::Unreadable(_)));
    }
}
