use serde::{Deserialize, Serialize};

/// A month-granularity point in time. Ordered by `(year, month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// The fallback for labels that cannot be resolved.
    pub const SENTINEL: Period = Period {
        year: 1900,
        month: 1,
    };

    /// Returns `None` unless `month` is in `1..=12` and the year fits a calendar date.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (1..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Periods from resolved input always land after 2000; anything older is a parse miss.
    pub fn is_plausible(&self) -> bool {
        self.year > 2000
    }
}

/// One entry of the period selector: the operator's original label plus its resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodOption {
    /// The raw label as it appeared in the first sheet that mentioned this month.
    pub value: String,
    /// Display form, `mon/yy`.
    pub label: String,
    pub period: Period,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let dec = Period::new(2024, 12).unwrap();
        let jan = Period::new(2025, 1).unwrap();
        assert!(dec < jan);
        assert!(Period::SENTINEL < dec);
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(Period::new(2024, 13), None);
        assert_eq!(Period::new(2024, 0), None);
        assert_eq!(Period::new(10_000, 1), None);
        assert!(!Period::SENTINEL.is_plausible());
        assert!(Period::new(2001, 1).unwrap().is_plausible());
    }
}
