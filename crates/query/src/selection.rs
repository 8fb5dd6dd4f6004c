use core_types::Period;
use periods::PeriodResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An inclusive range of resolved periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: Period,
    pub end: Period,
}

impl PeriodRange {
    pub fn new(start: Period, end: Period) -> Self {
        Self { start, end }
    }

    /// Resolves both bounds from raw labels, the way the period selector supplies them.
    pub fn from_labels(resolver: &PeriodResolver, start: &str, end: &str) -> Self {
        Self::new(resolver.resolve(start), resolver.resolve(end))
    }

    pub fn contains(&self, period: Period) -> bool {
        self.start <= period && period <= self.end
    }
}

/// What to select from a dataset: one city, optionally bounded in time and restricted to a
/// set of origins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub city: String,
    #[serde(default)]
    pub range: Option<PeriodRange>,
    /// `None` or an empty set selects every origin.
    #[serde(default)]
    pub origins: Option<BTreeSet<String>>,
}

impl Selection {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            range: None,
            origins: None,
        }
    }

    pub fn with_range(mut self, range: PeriodRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    /// The whitelist to enforce, if any.
    pub(crate) fn origin_whitelist(&self) -> Option<&BTreeSet<String>> {
        self.origins.as_ref().filter(|set| !set.is_empty())
    }
}
