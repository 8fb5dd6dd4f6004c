//! The boundary shape of a dataset: `{ city: { columns, rows, index }, ... }`.

use core_types::CellValue;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One city table as a (column names, row-major values, row index) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedTable {
    pub columns: Vec<String>,
    #[serde(alias = "data")]
    pub rows: Vec<Vec<CellValue>>,
    /// Absent on input means `0..rows.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<usize>>,
}

/// Every city table, keyed by city name.
///
/// Serializes as a JSON object whose keys keep insertion order in both directions, so the
/// city list survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerializedDataset {
    pub tables: Vec<(String, SerializedTable)>,
}

impl SerializedDataset {
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(city, _)| city.as_str())
    }

    pub fn get(&self, city: &str) -> Option<&SerializedTable> {
        self.tables
            .iter()
            .find(|(name, _)| name == city)
            .map(|(_, table)| table)
    }
}

impl Serialize for SerializedDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (city, table) in &self.tables {
            map.serialize_entry(city, table)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = SerializedDataset;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of city names to tables")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut tables = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((city, table)) = access.next_entry::<String, SerializedTable>()? {
            tables.push((city, table));
        }
        Ok(SerializedDataset { tables })
    }
}

impl<'de> Deserialize<'de> for SerializedDataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}
