use crate::error::StoreError;
use crate::serialized::{SerializedDataset, SerializedTable};
use core_types::{CityTable, Dataset, columns};
use periods::{PeriodResolver, period_index};

/// Converts datasets to and from their boundary shape.
///
/// Decoding is the inverse of encoding up to count coercion: count columns are re-coerced on
/// the way in, so hand-edited or foreign payloads still obey the "number or no data" rule.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    resolver: PeriodResolver,
}

impl DatasetStore {
    pub fn new(resolver: PeriodResolver) -> Self {
        Self { resolver }
    }

    pub fn encode(&self, dataset: &Dataset) -> SerializedDataset {
        let tables = dataset
            .tables()
            .iter()
            .map(|table| {
                (
                    table.city.clone(),
                    SerializedTable {
                        columns: table.columns.clone(),
                        rows: table.rows.clone(),
                        index: Some(table.index.clone()),
                    },
                )
            })
            .collect();
        SerializedDataset { tables }
    }

    /// Rebuilds a dataset, including its period index.
    pub fn decode(&self, serialized: SerializedDataset) -> Result<Dataset, StoreError> {
        let mut tables = Vec::with_capacity(serialized.tables.len());
        for (city, table) in serialized.tables {
            tables.push(decode_table(city, table)?);
        }
        let periods = period_index(&self.resolver, &tables);
        tracing::debug!(
            cities = tables.len(),
            periods = periods.len(),
            "Decoded serialized dataset."
        );
        Ok(Dataset::new(tables, periods))
    }

    pub fn to_json(&self, dataset: &Dataset) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.encode(dataset))?)
    }

    pub fn to_json_pretty(&self, dataset: &Dataset) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.encode(dataset))?)
    }

    pub fn from_json(&self, json: &str) -> Result<Dataset, StoreError> {
        let serialized: SerializedDataset = serde_json::from_str(json)?;
        self.decode(serialized)
    }
}

fn decode_table(city: String, table: SerializedTable) -> Result<CityTable, StoreError> {
    let SerializedTable {
        columns,
        rows,
        index,
    } = table;

    if let Some((row, cells)) = rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != columns.len())
    {
        return Err(StoreError::RaggedRow {
            city,
            row,
            expected: columns.len(),
            found: cells.len(),
        });
    }

    let index = index.unwrap_or_else(|| (0..rows.len()).collect());
    if index.len() != rows.len() {
        return Err(StoreError::IndexMismatch {
            city,
            rows: rows.len(),
            index: index.len(),
        });
    }

    let mut table = CityTable::with_index(city, columns, rows, index)?;
    let count_columns: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| columns::is_count_column(name))
        .map(|(idx, _)| idx)
        .collect();
    for idx in count_columns {
        table.map_column(idx, |cell| cell.to_count());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CellValue;

    fn store() -> DatasetStore {
        DatasetStore::new(PeriodResolver::with_reference_year(2025))
    }

    fn recife() -> CityTable {
        CityTable::with_index(
            "Recife",
            vec!["periodo".into(), "origem".into(), "contatos".into(), "cidade".into()],
            vec![
                vec![
                    CellValue::text("fev/25"),
                    CellValue::text("Google"),
                    CellValue::Number(250.0),
                    CellValue::text("Recife"),
                ],
                vec![
                    CellValue::text("jan/25"),
                    CellValue::text("Meta"),
                    CellValue::Empty,
                    CellValue::text("Recife"),
                ],
            ],
            vec![3, 7],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_table_and_periods() {
        let store = store();
        let tables = vec![recife()];
        let periods = period_index(&PeriodResolver::with_reference_year(2025), &tables);
        let dataset = Dataset::new(tables, periods);

        let json = store.to_json(&dataset).unwrap();
        let decoded = store.from_json(&json).unwrap();
        assert_eq!(decoded, dataset);
        assert_eq!(decoded.period_labels(), vec!["jan/25", "fev/25"]);
    }

    #[test]
    fn test_fractional_values_survive_exactly() {
        let store = store();
        let table = CityTable::new(
            "Natal",
            vec!["taxa_conversao".into()],
            vec![vec![CellValue::Number(0.1 + 0.2)]],
        )
        .unwrap();
        let dataset = Dataset::new(vec![table], vec![]);
        let decoded = store.from_json(&store.to_json(&dataset).unwrap()).unwrap();
        assert_eq!(
            *decoded.table("Natal").unwrap().cell(0, 0),
            CellValue::Number(0.1 + 0.2)
        );
    }

    #[test]
    fn test_counts_recoerced_on_decode() {
        let json = r#"{"Recife": {"columns": ["origem", "vendas"],
            "data": [["Google", "30"], ["Meta", "-"], ["Site", -2]]}}"#;
        let dataset = store().from_json(json).unwrap();
        let table = dataset.table("Recife").unwrap();
        assert_eq!(*table.cell(0, 1), CellValue::Number(30.0));
        assert_eq!(*table.cell(1, 1), CellValue::Empty);
        assert_eq!(*table.cell(2, 1), CellValue::Empty);
        assert_eq!(table.index, vec![0, 1, 2]);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let json = r#"{"Recife": {"columns": ["origem", "vendas"], "rows": [["Google"]]}}"#;
        let err = store().from_json(json).unwrap_err();
        assert!(matches!(err, StoreError::RaggedRow { row: 0, expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_index_mismatch_rejected() {
        let json = r#"{"Recife": {"columns": ["origem"], "rows": [["Google"]], "index": [0, 1]}}"#;
        let err = store().from_json(json).unwrap_err();
        assert!(matches!(err, StoreError::IndexMismatch { rows: 1, index: 2, .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            store().from_json("[1, 2, 3]"),
            Err(StoreError::Json(_))
        ));
    }
}
