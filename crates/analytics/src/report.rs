use core_types::{Period, RowSet};
use serde::{Deserialize, Serialize};

/// `numerator / denominator`, undefined when either side is missing or the denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Summed funnel counts. A count is `None` when every contributing cell was "no data".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FunnelTotals {
    pub contacts: Option<f64>,
    pub qualified: Option<f64>,
    pub sales: Option<f64>,
}

impl FunnelTotals {
    /// sales / contacts
    pub fn conversion(&self) -> Option<f64> {
        ratio(self.sales, self.contacts)
    }

    /// sales / qualified
    pub fn qualified_conversion(&self) -> Option<f64> {
        ratio(self.sales, self.qualified)
    }

    /// qualified / contacts
    pub fn qualified_share(&self) -> Option<f64> {
        ratio(self.qualified, self.contacts)
    }

    /// contacts / sales
    pub fn contacts_per_sale(&self) -> Option<f64> {
        ratio(self.contacts, self.sales)
    }
}

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSummary {
    pub totals: FunnelTotals,
    pub conversion: Option<f64>,
    pub qualified_conversion: Option<f64>,
    pub qualified_share: Option<f64>,
    pub contacts_per_sale: Option<f64>,
}

impl From<FunnelTotals> for FunnelSummary {
    fn from(totals: FunnelTotals) -> Self {
        Self {
            conversion: totals.conversion(),
            qualified_conversion: totals.qualified_conversion(),
            qualified_share: totals.qualified_share(),
            contacts_per_sale: totals.contacts_per_sale(),
            totals,
        }
    }
}

/// One origin's totals and derived ratios. This is also the row shape of the export table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginMetrics {
    pub origin: String,
    pub contacts: Option<f64>,
    pub qualified: Option<f64>,
    pub sales: Option<f64>,
    pub qualified_share: Option<f64>,
    pub conversion: Option<f64>,
    pub qualified_conversion: Option<f64>,
    pub contacts_per_sale: Option<f64>,
}

impl OriginMetrics {
    pub fn new(origin: String, totals: FunnelTotals) -> Self {
        Self {
            origin,
            contacts: totals.contacts,
            qualified: totals.qualified,
            sales: totals.sales,
            qualified_share: totals.qualified_share(),
            conversion: totals.conversion(),
            qualified_conversion: totals.qualified_conversion(),
            contacts_per_sale: totals.contacts_per_sale(),
        }
    }
}

/// One slice of the contact-share breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSlice {
    pub label: String,
    pub contacts: f64,
    pub share: Option<f64>,
}

/// The two "top channels" rankings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopChannels {
    pub by_conversion: Vec<OriginMetrics>,
    pub by_qualified_conversion: Vec<OriginMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRow {
    pub origin: String,
    pub contacts: f64,
    pub sales: f64,
    /// Sales per hundred contacts.
    pub efficiency: f64,
}

/// Totals for one resolved period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub period: Period,
    pub label: String,
    pub contacts: Option<f64>,
    pub qualified: Option<f64>,
    pub sales: Option<f64>,
    pub conversion: Option<f64>,
    pub qualified_conversion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRow {
    pub origin: String,
    pub coefficient: f64,
    /// Number of periods that contributed to the coefficient.
    pub periods: usize,
}

/// Contacts-to-sales correlations, ranked by coefficient from strongest to weakest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrelationTable {
    rows: Vec<CorrelationRow>,
}

impl CorrelationTable {
    pub fn new(mut rows: Vec<CorrelationRow>) -> Self {
        rows.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));
        Self { rows }
    }

    pub fn descending(&self) -> &[CorrelationRow] {
        &self.rows
    }

    pub fn ascending(&self) -> Vec<CorrelationRow> {
        self.rows.iter().rev().cloned().collect()
    }

    /// The `n` highest coefficients, highest first.
    pub fn best(&self, n: usize) -> Vec<CorrelationRow> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// The `n` lowest coefficients, lowest first.
    pub fn worst(&self, n: usize) -> Vec<CorrelationRow> {
        self.rows.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Per-origin totals for the scatter charts, with their trendlines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScatterReport {
    pub points: Vec<OriginMetrics>,
    pub sales_on_contacts: Option<LinearFit>,
    pub sales_on_qualified: Option<LinearFit>,
}

/// The output of one dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "kebab-case")]
pub enum ViewReport {
    Summary {
        summary: FunnelSummary,
        distribution: Vec<ShareSlice>,
        top_conversion: Vec<OriginMetrics>,
    },
    OriginPerformance(Vec<OriginMetrics>),
    ConversionByChannel(Vec<OriginMetrics>),
    MonthlyTrend(Vec<PeriodMetrics>),
    TopChannels(TopChannels),
    SalesEfficiency(Vec<EfficiencyRow>),
    Correlation {
        best: Vec<CorrelationRow>,
        worst: Vec<CorrelationRow>,
    },
    Scatter(ScatterReport),
    Details(RowSet),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_undefined_on_missing_or_zero() {
        assert_eq!(ratio(Some(1.0), Some(4.0)), Some(0.25));
        assert_eq!(ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(ratio(Some(1.0), None), None);
        assert_eq!(ratio(None, Some(4.0)), None);
    }

    #[test]
    fn test_correlation_table_slices() {
        let row = |origin: &str, coefficient: f64| CorrelationRow {
            origin: origin.into(),
            coefficient,
            periods: 3,
        };
        let table = CorrelationTable::new(vec![
            row("Meta", 0.2),
            row("Google", 0.9),
            row("Site", -0.4),
        ]);
        let names = |rows: &[CorrelationRow]| -> Vec<String> {
            rows.iter().map(|r| r.origin.clone()).collect()
        };
        assert_eq!(names(table.descending()), vec!["Google", "Meta", "Site"]);
        assert_eq!(names(&table.ascending()), vec!["Site", "Meta", "Google"]);
        assert_eq!(names(&table.best(2)), vec!["Google", "Meta"]);
        assert_eq!(names(&table.worst(1)), vec!["Site"]);
        assert_eq!(table.best(10).len(), 3);
    }
}
