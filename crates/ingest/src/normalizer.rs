//! Turns one raw sheet into a canonical `CityTable`.

use crate::error::NormalizeError;
use core_types::{CellValue, CityTable, columns};
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Both accepted spellings of the period header.
const PERIOD_TOKENS: [&str; 2] = ["período", "periodo"];

/// Canonical form of a header: lower-cased and trimmed, with any header mentioning the period
/// mapped to `periodo`, and everything else reduced to word characters and underscores.
pub fn normalize_column_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase();
    if PERIOD_TOKENS.iter().any(|t| name.contains(t)) {
        return columns::PERIOD.to_string();
    }
    let name = NON_WORD.replace_all(&name, "_");
    WHITESPACE_RUN.replace_all(&name, "_").into_owned()
}

/// Percentage columns are recognized by name. The `%` marker is checked on the raw header
/// because normalization rewrites it to `_`.
fn is_percentage_column(raw_header: &str, normalized: &str) -> bool {
    normalized.contains(columns::CONVERSION) || raw_header.contains('%')
}

/// Re-parses a text-typed percentage column as fractions, e.g. `"12,5%"` becomes `0.125`.
///
/// Columns that hold no text are already numeric and are left alone, as are columns where
/// no cell parses at all.
fn convert_percentages(cells: &[CellValue]) -> Option<Vec<CellValue>> {
    if !cells.iter().any(CellValue::is_text) {
        return None;
    }
    let mut converted_any = false;
    let converted: Vec<CellValue> = cells
        .iter()
        .map(|cell| {
            let parsed = cell.label().and_then(|label| {
                label
                    .replace('%', "")
                    .replace(',', ".")
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
            });
            match parsed {
                Some(value) => {
                    converted_any = true;
                    CellValue::Number(value / 100.0)
                }
                None => CellValue::Empty,
            }
        })
        .collect();
    converted_any.then_some(converted)
}

/// Normalizes one sheet.
///
/// `header` is the sheet's first row, `rows` the remaining ones. Every row is tagged with
/// `city` in the `cidade` column.
pub fn normalize_sheet(
    city: &str,
    header: &[CellValue],
    rows: Vec<Vec<CellValue>>,
) -> Result<CityTable, NormalizeError> {
    if header.iter().all(CellValue::is_empty) {
        return Err(NormalizeError::MissingHeader);
    }

    let raw_headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.label() {
            Some(label) if !label.trim().is_empty() => label,
            _ => format!("unnamed_{i}"),
        })
        .collect();
    let names: Vec<String> = raw_headers
        .iter()
        .map(|h| normalize_column_name(h))
        .collect();
    tracing::debug!(city, columns = ?names, "Normalized sheet header.");

    let width = names.len();
    let rows: Vec<Vec<CellValue>> = rows
        .into_iter()
        .filter(|cells| !cells.iter().all(CellValue::is_empty))
        .map(|mut cells| {
            cells.resize(width, CellValue::Empty);
            cells
        })
        .collect();

    let mut table = CityTable::new(city, names, rows)?;

    for (idx, name) in table.columns.clone().iter().enumerate() {
        if columns::is_count_column(name) {
            table.map_column(idx, CellValue::to_count);
        }
        if is_percentage_column(&raw_headers[idx], name) {
            let cells: Vec<CellValue> = table.rows.iter().map(|r| r[idx].clone()).collect();
            if let Some(converted) = convert_percentages(&cells) {
                let mut values = converted.into_iter();
                table.map_column(idx, |_| values.next().unwrap_or_default());
            }
        }
    }

    table.set_constant_column(columns::CITY, CellValue::text(city));
    Ok(table)
}
