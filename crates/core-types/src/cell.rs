use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell after it has been lifted out of the workbook.
///
/// The serialized form is a plain JSON scalar for everything except datetimes, which are
/// wrapped as `{"datetime": "..."}` so they survive a round trip without turning into text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime { datetime: NaiveDateTime },
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn datetime(datetime: NaiveDateTime) -> Self {
        CellValue::DateTime { datetime }
    }

    /// An empty cell, or a text cell holding only whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text a spreadsheet user would read in this cell. `None` for empty cells.
    pub fn label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::DateTime { datetime } => {
                Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }

    /// Coerces the cell into a funnel count.
    ///
    /// Anything that is not a finite, non-negative number after parsing is "no data" and
    /// comes back as `Empty`, never as zero.
    pub fn to_count(&self) -> CellValue {
        let parsed = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Empty | CellValue::DateTime { .. } => None,
        };
        match parsed {
            Some(n) if n.is_finite() && n >= 0.0 => CellValue::Number(n),
            _ => CellValue::Empty,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().unwrap_or_default())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Whole numbers print without a trailing `.0`, matching what the sheet shows.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
