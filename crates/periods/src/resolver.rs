use crate::months;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use core_types::{CellValue, Period};
use regex::Regex;
use std::sync::LazyLock;

/// A leading run of non-digits (the month token) followed somewhere by a 2-4 digit year.
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\D{3,}).*?(\d{2,4})").expect("month-year pattern is valid")
});

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// How a textual format carries its date.
#[derive(Debug, Clone, Copy)]
enum Layout {
    Date(&'static str),
    DateTime(&'static str),
    /// No day component; parsed as the first of the month.
    MonthYear(&'static str),
}

/// Tried in order, first full match wins.
const FORMATS: [Layout; 12] = [
    Layout::Date("%Y-%m-%d"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S"),
    Layout::MonthYear("%Y-%m"),
    Layout::MonthYear("%b-%y"),
    Layout::MonthYear("%b %y"),
    Layout::MonthYear("%B %Y"),
    Layout::Date("%m/%d/%Y"),
    Layout::DateTime("%Y-%m-%dT%H:%M:%S"),
    Layout::Date("%d/%m/%Y"),
    Layout::Date("%d-%m-%Y"),
    Layout::Date("%d %b %Y"),
    Layout::Date("%d %B %Y"),
];

impl Layout {
    fn parse(self, s: &str) -> Option<NaiveDate> {
        match self {
            Layout::Date(fmt) => NaiveDate::parse_from_str(s, fmt).ok(),
            Layout::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.date()),
            Layout::MonthYear(fmt) => {
                NaiveDate::parse_from_str(&format!("01 {s}"), &format!("%d {fmt}")).ok()
            }
        }
    }
}

/// Turns the period labels operators type into spreadsheets into `Period`s.
///
/// Resolution is total: every input yields a period, and inputs no rule recognizes yield
/// `Period::SENTINEL`. Callers that care about input quality filter on
/// `Period::is_plausible`.
#[derive(Debug, Clone, Copy)]
pub struct PeriodResolver {
    /// Year assumed for labels that only name a month.
    reference_year: i32,
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodResolver {
    /// A resolver that assumes the current year for bare month names.
    pub fn new() -> Self {
        Self::with_reference_year(Local::now().year())
    }

    pub fn with_reference_year(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Resolves a cell, using typed datetimes directly and everything else through its label.
    pub fn resolve_cell(&self, cell: &CellValue) -> Period {
        match cell {
            CellValue::DateTime { datetime } => {
                Period::new(datetime.year(), datetime.month()).unwrap_or(Period::SENTINEL)
            }
            other => match other.label() {
                Some(label) => self.resolve(&label),
                None => Period::SENTINEL,
            },
        }
    }

    pub fn resolve(&self, raw: &str) -> Period {
        let s = raw.trim();

        if let Some(date) = FORMATS.iter().find_map(|layout| layout.parse(s)) {
            return Period::new(date.year(), date.month()).unwrap_or(Period::SENTINEL);
        }

        let lower = s.to_lowercase();
        if let Some(month) = months::from_full_name(&lower) {
            return Period::new(self.reference_year, month).unwrap_or(Period::SENTINEL);
        }

        if let Some(caps) = MONTH_YEAR.captures(s) {
            let token = caps[1].to_lowercase();
            let month = months::from_full_name(&token).or_else(|| {
                let abbr: String = token.chars().take(3).collect();
                months::from_abbreviation(&abbr)
            });
            return match month {
                Some(month) => year_from_token(&caps[2])
                    .and_then(|year| Period::new(year, month))
                    .unwrap_or(Period::SENTINEL),
                None => Period::SENTINEL,
            };
        }

        let parts: Vec<&str> = DIGIT_RUN.find_iter(s).map(|m| m.as_str()).collect();
        if let [month, year, ..] = parts.as_slice() {
            let month = month.parse::<u32>().ok();
            let year = year_from_token(year);
            if let (Some(month), Some(year)) = (month, year) {
                return Period::new(year, month).unwrap_or(Period::SENTINEL);
            }
        }

        tracing::debug!(label = raw, "Period label did not match any rule.");
        Period::SENTINEL
    }
}

/// Four-digit tokens are taken as-is; any other length is a year in the 2000s.
fn year_from_token(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    if token.len() == 4 {
        Some(value)
    } else {
        value.checked_add(2000)
    }
}

/// Renders a period as `mon/yy`, e.g. `jan/25`.
pub fn format(period: Period) -> String {
    let abbr = months::abbreviation(period.month).unwrap_or("jan");
    format!("{}/{:02}", abbr, period.year.rem_euclid(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PeriodResolver {
        PeriodResolver::with_reference_year(2025)
    }

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn test_explicit_formats() {
        let r = resolver();
        assert_eq!(r.resolve("2025-01-15"), p(2025, 1));
        assert_eq!(r.resolve("2025-02-01 00:00:00"), p(2025, 2));
        assert_eq!(r.resolve("2024-11"), p(2024, 11));
        assert_eq!(r.resolve("Mar-24"), p(2024, 3));
        assert_eq!(r.resolve("Apr 23"), p(2023, 4));
        assert_eq!(r.resolve("January 2025"), p(2025, 1));
        assert_eq!(r.resolve("12/31/2024"), p(2024, 12));
        assert_eq!(r.resolve("2024-06-01T08:30:00"), p(2024, 6));
        assert_eq!(r.resolve("25/12/2024"), p(2024, 12));
        assert_eq!(r.resolve("05-07-2024"), p(2024, 7));
        assert_eq!(r.resolve("3 Sep 2024"), p(2024, 9));
    }

    #[test]
    fn test_month_before_day_wins_when_ambiguous() {
        // `%m/%d/%Y` is tried before `%d/%m/%Y`.
        assert_eq!(resolver().resolve("02/03/2025"), p(2025, 2));
    }

    #[test]
    fn test_bare_month_uses_reference_year() {
        let r = resolver();
        assert_eq!(r.resolve("Março"), p(2025, 3));
        assert_eq!(r.resolve("  dezembro "), p(2025, 12));
        assert_eq!(
            PeriodResolver::with_reference_year(2031).resolve("julho"),
            p(2031, 7)
        );
    }

    #[test]
    fn test_portuguese_month_tokens() {
        let r = resolver();
        assert_eq!(r.resolve("jan/25"), p(2025, 1));
        assert_eq!(r.resolve("fev/25"), p(2025, 2));
        assert_eq!(r.resolve("Janeiro 2025"), p(2025, 1));
        assert_eq!(r.resolve("março2024"), p(2024, 3));
        assert_eq!(r.resolve("OUT-23"), p(2023, 10));
        assert_eq!(r.resolve("set / 2024"), p(2024, 9));
    }

    #[test]
    fn test_unknown_month_token_is_sentinel() {
        assert_eq!(resolver().resolve("Trimestre 2025"), Period::SENTINEL);
        assert_eq!(resolver().resolve("Semana 12"), Period::SENTINEL);
    }

    #[test]
    fn test_digit_fallback() {
        let r = resolver();
        assert_eq!(r.resolve("01/2025"), p(2025, 1));
        assert_eq!(r.resolve("7.24"), p(2024, 7));
        assert_eq!(r.resolve("15/13/2024"), Period::SENTINEL);
        assert_eq!(r.resolve("13/2024"), Period::SENTINEL);
    }

    #[test]
    fn test_unrecognizable_is_sentinel() {
        let r = resolver();
        for raw in ["", "   ", "total", "n/a", "2025", "abc", "12345678901234567890/1"] {
            assert_eq!(r.resolve(raw), Period::SENTINEL, "{raw:?}");
        }
    }

    #[test]
    fn test_resolve_cell() {
        let r = resolver();
        let dt = NaiveDate::from_ymd_opt(2024, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(r.resolve_cell(&CellValue::datetime(dt)), p(2024, 8));
        assert_eq!(r.resolve_cell(&CellValue::text("fev/25")), p(2025, 2));
        assert_eq!(r.resolve_cell(&CellValue::Empty), Period::SENTINEL);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(p(2024, 3)), "mar/24");
        assert_eq!(format(p(2025, 1)), "jan/25");
        assert_eq!(format(p(2030, 12)), "dez/30");
        assert_eq!(format(Period::SENTINEL), "jan/00");
    }

    #[test]
    fn test_round_trip_through_format() {
        let r = resolver();
        for raw in ["2025-01-15", "Mar-24", "fev/25", "Janeiro 2025", "01/2025", "julho"] {
            let period = r.resolve(raw);
            assert!(period.is_plausible(), "{raw:?}");
            assert_eq!(r.resolve(&format(period)), period, "{raw:?}");
        }
    }
}
