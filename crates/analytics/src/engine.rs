use crate::report::{
    CorrelationRow, CorrelationTable, EfficiencyRow, FunnelSummary, FunnelTotals, OriginMetrics,
    PeriodMetrics, ScatterReport, ShareSlice, TopChannels, ratio,
};
use crate::stats::{linear_fit, pearson};
use configuration::AnalysisSettings;
use core_types::{CellValue, Period, RowSet, columns};
use periods::{PeriodResolver, format};
use std::collections::BTreeMap;

/// Label of the remainder slice in the contact-share breakdown.
pub const OTHERS_LABEL: &str = "Outros";

/// Positions of the count columns in a row set.
#[derive(Debug, Clone, Copy)]
struct CountColumns {
    contacts: Option<usize>,
    qualified: Option<usize>,
    sales: Option<usize>,
}

impl CountColumns {
    fn locate(rows: &RowSet) -> Self {
        Self {
            contacts: rows.column_index(columns::CONTACTS),
            qualified: rows.column_index(columns::QUALIFIED),
            sales: rows.column_index(columns::SALES),
        }
    }

    fn read(column: Option<usize>, row: &[CellValue]) -> Option<f64> {
        column.and_then(|idx| row[idx].as_number())
    }
}

fn accumulate(slot: &mut Option<f64>, value: Option<f64>) {
    if let Some(value) = value {
        *slot = Some(slot.unwrap_or(0.0) + value);
    }
}

impl FunnelTotals {
    fn add_row(&mut self, cols: CountColumns, row: &[CellValue]) {
        accumulate(&mut self.contacts, CountColumns::read(cols.contacts, row));
        accumulate(&mut self.qualified, CountColumns::read(cols.qualified, row));
        accumulate(&mut self.sales, CountColumns::read(cols.sales, row));
    }
}

/// Stable descending ranking on a defined key. Entries without a key are dropped.
fn top_by<T, F>(items: impl IntoIterator<Item = T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut keyed: Vec<(f64, T)> = items
        .into_iter()
        .filter_map(|item| key(&item).map(|k| (k, item)))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().take(n).map(|(_, item)| item).collect()
}

/// A stateless calculator for funnel metrics over an already-filtered row set.
///
/// Row sets are expected to come out of the query layer, so aggregate rows are already gone.
/// Missing cells are skipped in sums and a ratio with a missing or zero denominator is `None`.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    settings: AnalysisSettings,
    resolver: PeriodResolver,
}

impl MetricsEngine {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            settings,
            resolver: PeriodResolver::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: PeriodResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn totals(&self, rows: &RowSet) -> FunnelTotals {
        let cols = CountColumns::locate(rows);
        let mut totals = FunnelTotals::default();
        for row in &rows.rows {
            totals.add_row(cols, row);
        }
        totals
    }

    pub fn funnel_summary(&self, rows: &RowSet) -> FunnelSummary {
        FunnelSummary::from(self.totals(rows))
    }

    /// Per-origin totals and ratios, ordered by origin name. Rows without an origin are
    /// left out.
    pub fn origin_totals(&self, rows: &RowSet) -> Vec<OriginMetrics> {
        let Some(origin_col) = rows.column_index(columns::ORIGIN) else {
            return Vec::new();
        };
        let cols = CountColumns::locate(rows);
        let mut groups: BTreeMap<String, FunnelTotals> = BTreeMap::new();
        for row in &rows.rows {
            let origin = &row[origin_col];
            if origin.is_empty() {
                continue;
            }
            if let Some(label) = origin.label() {
                groups.entry(label).or_default().add_row(cols, row);
            }
        }
        groups
            .into_iter()
            .map(|(origin, totals)| OriginMetrics::new(origin, totals))
            .collect()
    }

    /// The export table: per-origin metrics ordered by sales, highest first.
    pub fn origin_performance(&self, rows: &RowSet) -> Vec<OriginMetrics> {
        let mut metrics = self.origin_totals(rows);
        metrics.sort_by(|a, b| {
            b.sales
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&a.sales.unwrap_or(f64::NEG_INFINITY))
        });
        metrics
    }

    /// Contact share of the largest origins, with everything else folded into "Outros".
    pub fn origin_distribution(&self, rows: &RowSet) -> Vec<ShareSlice> {
        let counts: Vec<(String, f64)> = self
            .origin_totals(rows)
            .into_iter()
            .filter_map(|m| m.contacts.map(|c| (m.origin, c)))
            .collect();
        let total: f64 = counts.iter().map(|(_, c)| c).sum();
        let n = self.settings.distribution_count;

        let slices = if counts.len() > n {
            let mut top = top_by(counts, n, |(_, c)| Some(*c));
            let others = total - top.iter().map(|(_, c)| c).sum::<f64>();
            if others > 0.0 {
                top.push((OTHERS_LABEL.to_string(), others));
            }
            top
        } else {
            counts
        };

        slices
            .into_iter()
            .map(|(label, contacts)| ShareSlice {
                label,
                contacts,
                share: ratio(Some(contacts), Some(total)),
            })
            .collect()
    }

    /// Best converting origins among those with enough volume to be meaningful.
    ///
    /// The conversion ranking is gated on contacts and the qualified-conversion ranking on
    /// qualified leads, so the two lists may hold different origins.
    pub fn top_channels(&self, rows: &RowSet) -> TopChannels {
        let min_contacts = self.settings.top_channels_min_contacts;
        let min_qualified = self.settings.top_channels_min_qualified;
        let n = self.settings.top_channels_count;
        let totals = self.origin_totals(rows);
        let by_conversion = top_by(
            totals
                .iter()
                .filter(|m| m.contacts.is_some_and(|c| c >= min_contacts))
                .cloned(),
            n,
            |m| m.conversion,
        );
        let by_qualified_conversion = top_by(
            totals
                .into_iter()
                .filter(|m| m.qualified.is_some_and(|q| q >= min_qualified)),
            n,
            |m| m.qualified_conversion,
        );
        TopChannels {
            by_conversion,
            by_qualified_conversion,
        }
    }

    /// Conversion for every origin above the volume threshold, highest first.
    pub fn conversion_by_channel(&self, rows: &RowSet) -> Vec<OriginMetrics> {
        let min = self.settings.conversion_min_contacts;
        let eligible = self
            .origin_totals(rows)
            .into_iter()
            .filter(|m| m.contacts.is_some_and(|c| c >= min));
        top_by(eligible, usize::MAX, |m| m.conversion)
    }

    /// Sales per hundred contacts for origins that closed enough sales.
    pub fn sales_efficiency(&self, rows: &RowSet) -> Vec<EfficiencyRow> {
        let min = self.settings.efficiency_min_sales;
        let candidates = self.origin_totals(rows).into_iter().filter_map(|m| {
            let sales = m.sales.filter(|s| *s > 0.0 && *s >= min)?;
            let contacts = m.contacts?;
            let efficiency = ratio(Some(sales), Some(contacts))? * 100.0;
            Some(EfficiencyRow {
                origin: m.origin,
                contacts,
                sales,
                efficiency,
            })
        });
        top_by(candidates, self.settings.efficiency_count, |r| Some(r.efficiency))
    }

    /// Totals per resolved period in chronological order.
    ///
    /// Rows whose period does not resolve past 2000 are not attributed to any period.
    pub fn period_totals(&self, rows: &RowSet) -> Vec<PeriodMetrics> {
        let Some(period_col) = rows.column_index(columns::PERIOD) else {
            return Vec::new();
        };
        let cols = CountColumns::locate(rows);
        let mut groups: BTreeMap<Period, FunnelTotals> = BTreeMap::new();
        for row in &rows.rows {
            let period = self.resolver.resolve_cell(&row[period_col]);
            if !period.is_plausible() {
                tracing::debug!(cell = %row[period_col], "Row left out of period totals.");
                continue;
            }
            groups.entry(period).or_default().add_row(cols, row);
        }
        groups
            .into_iter()
            .map(|(period, totals)| PeriodMetrics {
                period,
                label: format(period),
                contacts: totals.contacts,
                qualified: totals.qualified,
                sales: totals.sales,
                conversion: totals.conversion(),
                qualified_conversion: totals.qualified_conversion(),
            })
            .collect()
    }

    /// Pearson correlation between contacts and sales, per origin, over its rows.
    ///
    /// Only rows with positive contacts and positive sales count. Origins left with fewer
    /// than `correlation_min_periods` rows, or with a constant series, are omitted.
    pub fn correlations(&self, rows: &RowSet) -> CorrelationTable {
        let (Some(origin_col), Some(contacts_col), Some(sales_col)) = (
            rows.column_index(columns::ORIGIN),
            rows.column_index(columns::CONTACTS),
            rows.column_index(columns::SALES),
        ) else {
            return CorrelationTable::default();
        };

        let mut samples: BTreeMap<String, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for row in &rows.rows {
            let (Some(origin), Some(contacts), Some(sales)) = (
                row[origin_col].label().filter(|_| !row[origin_col].is_empty()),
                row[contacts_col].as_number(),
                row[sales_col].as_number(),
            ) else {
                continue;
            };
            if contacts > 0.0 && sales > 0.0 {
                let entry = samples.entry(origin).or_default();
                entry.0.push(contacts);
                entry.1.push(sales);
            }
        }

        let min_periods = self.settings.correlation_min_periods;
        let correlated = samples
            .into_iter()
            .filter_map(|(origin, (contacts, sales))| {
                if contacts.len() < min_periods {
                    tracing::debug!(%origin, periods = contacts.len(), "Too few periods to correlate.");
                    return None;
                }
                let coefficient = pearson(&contacts, &sales)?;
                Some(CorrelationRow {
                    origin,
                    coefficient,
                    periods: contacts.len(),
                })
            })
            .collect();
        CorrelationTable::new(correlated)
    }

    /// The largest origins by contacts, with trendlines of sales on contacts and on
    /// qualified leads.
    pub fn scatter(&self, rows: &RowSet) -> ScatterReport {
        let positive = |v: Option<f64>| v.is_some_and(|v| v > 0.0);
        let candidates = self
            .origin_totals(rows)
            .into_iter()
            .filter(|m| positive(m.contacts) && positive(m.qualified) && positive(m.sales));
        let points = top_by(candidates, self.settings.scatter_count, |m| m.contacts);

        let series = |pick: fn(&OriginMetrics) -> Option<f64>| -> Vec<f64> {
            points.iter().filter_map(pick).collect()
        };
        let sales = series(|m| m.sales);
        ScatterReport {
            sales_on_contacts: linear_fit(&series(|m| m.contacts), &sales),
            sales_on_qualified: linear_fit(&series(|m| m.qualified), &sales),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MetricsEngine {
        MetricsEngine::new(AnalysisSettings::default())
            .with_resolver(PeriodResolver::with_reference_year(2025))
    }

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    /// Rows of (period, origin, contacts, qualified, sales); negative numbers mean no data.
    fn rows(data: &[(&str, &str, f64, f64, f64)]) -> RowSet {
        let cell = |v: f64| if v < 0.0 { CellValue::Empty } else { num(v) };
        RowSet::new(
            "Recife",
            vec![
                "periodo".into(),
                "origem".into(),
                "contatos".into(),
                "aproveitados".into(),
                "vendas".into(),
            ],
            data.iter()
                .map(|(p, o, c, q, s)| {
                    vec![CellValue::text(*p), CellValue::text(*o), cell(*c), cell(*q), cell(*s)]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_summary_ratios() {
        let summary = engine().funnel_summary(&rows(&[
            ("jan/25", "Google", 200.0, 150.0, 20.0),
            ("fev/25", "Google", 250.0, 180.0, 30.0),
        ]));
        assert_eq!(summary.totals.contacts, Some(450.0));
        assert_eq!(summary.totals.sales, Some(50.0));
        assert!((summary.conversion.unwrap() - 50.0 / 450.0).abs() < 1e-12);
        assert_eq!(summary.contacts_per_sale, Some(9.0));
    }

    #[test]
    fn test_missing_is_not_zero() {
        let summary = engine().funnel_summary(&rows(&[("jan/25", "Google", 100.0, -1.0, -1.0)]));
        assert_eq!(summary.totals.qualified, None);
        assert_eq!(summary.totals.sales, None);
        assert_eq!(summary.conversion, None);
        assert_eq!(summary.contacts_per_sale, None);

        let zero_sales = engine().funnel_summary(&rows(&[("jan/25", "Google", 100.0, 0.0, 0.0)]));
        assert_eq!(zero_sales.conversion, Some(0.0));
        assert_eq!(zero_sales.contacts_per_sale, None);
        assert_eq!(zero_sales.qualified_conversion, None);
    }

    #[test]
    fn test_origin_performance_sorted_by_sales() {
        let data = rows(&[
            ("jan/25", "Meta", 100.0, 50.0, 5.0),
            ("jan/25", "Google", 200.0, 150.0, 20.0),
            ("jan/25", "Site", 10.0, 5.0, -1.0),
            ("jan/25", "", 999.0, 999.0, 999.0),
        ]);
        let names: Vec<String> = engine()
            .origin_performance(&data)
            .into_iter()
            .map(|m| m.origin)
            .collect();
        assert_eq!(names, vec!["Google", "Meta", "Site"]);
    }

    #[test]
    fn test_distribution_folds_remainder() {
        let mut settings = AnalysisSettings::default();
        settings.distribution_count = 2;
        let engine = MetricsEngine::new(settings);
        let slices = engine.origin_distribution(&rows(&[
            ("jan/25", "A", 50.0, 0.0, 0.0),
            ("jan/25", "B", 30.0, 0.0, 0.0),
            ("jan/25", "C", 15.0, 0.0, 0.0),
            ("jan/25", "D", 5.0, 0.0, 0.0),
        ]));
        let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", OTHERS_LABEL]);
        assert_eq!(slices[2].contacts, 20.0);
        assert_eq!(slices[0].share, Some(0.5));
    }

    #[test]
    fn test_top_channels_require_volume() {
        let top = engine().top_channels(&rows(&[
            ("jan/25", "Tiny", 2.0, 1.0, 1.0),
            ("jan/25", "Google", 200.0, 100.0, 20.0),
            ("jan/25", "Meta", 60.0, 10.0, 9.0),
            ("jan/25", "Radio", 80.0, 0.0, 4.0),
        ]));
        let by_conversion: Vec<&str> = top.by_conversion.iter().map(|m| m.origin.as_str()).collect();
        assert_eq!(by_conversion, vec!["Meta", "Google", "Radio"]);
        let by_qualified: Vec<&str> = top
            .by_qualified_conversion
            .iter()
            .map(|m| m.origin.as_str())
            .collect();
        assert_eq!(by_qualified, vec!["Google"]);
    }

    #[test]
    fn test_qualified_ranking_requires_qualified_volume() {
        let top = engine().top_channels(&rows(&[
            ("jan/25", "Tiny", 60.0, 2.0, 2.0),
            ("jan/25", "Google", 400.0, 200.0, 80.0),
        ]));
        let by_qualified: Vec<&str> = top
            .by_qualified_conversion
            .iter()
            .map(|m| m.origin.as_str())
            .collect();
        assert_eq!(by_qualified, vec!["Google"]);
        // Enough contacts, so it still ranks by plain conversion.
        let by_conversion: Vec<&str> = top.by_conversion.iter().map(|m| m.origin.as_str()).collect();
        assert_eq!(by_conversion, vec!["Google", "Tiny"]);
    }

    #[test]
    fn test_qualified_threshold_is_configurable() {
        let mut settings = AnalysisSettings::default();
        settings.top_channels_min_qualified = 1.0;
        let top = MetricsEngine::new(settings).top_channels(&rows(&[
            ("jan/25", "Tiny", 60.0, 2.0, 2.0),
            ("jan/25", "Google", 400.0, 200.0, 80.0),
        ]));
        assert_eq!(top.by_qualified_conversion[0].origin, "Tiny");
        assert_eq!(top.by_qualified_conversion[0].qualified_conversion, Some(1.0));
    }

    #[test]
    fn test_conversion_by_channel_threshold() {
        let ranked = engine().conversion_by_channel(&rows(&[
            ("jan/25", "Google", 200.0, 100.0, 20.0),
            ("jan/25", "Meta", 99.0, 50.0, 50.0),
            ("jan/25", "Site", 100.0, 50.0, 30.0),
        ]));
        let names: Vec<&str> = ranked.iter().map(|m| m.origin.as_str()).collect();
        assert_eq!(names, vec!["Site", "Google"]);
    }

    #[test]
    fn test_sales_efficiency() {
        let rows = rows(&[
            ("jan/25", "Google", 200.0, 100.0, 20.0),
            ("jan/25", "Meta", 50.0, 20.0, 10.0),
            ("jan/25", "Site", 10.0, 5.0, 9.0),
            ("jan/25", "Radio", 0.0, 0.0, 12.0),
        ]);
        let efficiency = engine().sales_efficiency(&rows);
        assert_eq!(efficiency.len(), 2);
        assert_eq!(efficiency[0].origin, "Meta");
        assert_eq!(efficiency[0].efficiency, 20.0);
        assert_eq!(efficiency[1].efficiency, 10.0);
    }

    #[test]
    fn test_period_totals_chronological() {
        let totals = engine().period_totals(&rows(&[
            ("fev/25", "Google", 250.0, 180.0, 30.0),
            ("jan/25", "Google", 200.0, 150.0, 20.0),
            ("Janeiro 2025", "Meta", 100.0, 50.0, 10.0),
            ("???", "Meta", 1.0, 1.0, 1.0),
        ]));
        let labels: Vec<&str> = totals.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["jan/25", "fev/25"]);
        assert_eq!(totals[0].contacts, Some(300.0));
        assert_eq!(totals[0].conversion, Some(0.1));
    }

    #[test]
    fn test_correlation_drops_zero_sales_periods() {
        let table = engine().correlations(&rows(&[
            ("jan/25", "Meta", 10.0, 5.0, 0.0),
            ("fev/25", "Meta", 12.0, 6.0, 0.0),
            ("jan/25", "Google", 100.0, 50.0, 10.0),
            ("fev/25", "Google", 200.0, 90.0, 22.0),
            ("mar/25", "Google", 300.0, 150.0, 29.0),
        ]));
        assert_eq!(table.len(), 1);
        let google = &table.descending()[0];
        assert_eq!(google.origin, "Google");
        assert_eq!(google.periods, 3);
        assert!(google.coefficient > 0.9 && google.coefficient <= 1.0);
    }

    #[test]
    fn test_correlation_minimum_and_constant_series() {
        let table = engine().correlations(&rows(&[
            ("jan/25", "Google", 100.0, 50.0, 10.0),
            ("fev/25", "Google", 200.0, 90.0, 20.0),
            ("jan/25", "Meta", 100.0, 50.0, 10.0),
            ("fev/25", "Meta", 200.0, 50.0, 10.0),
            ("mar/25", "Meta", 300.0, 50.0, 10.0),
        ]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_scatter_fits() {
        let report = engine().scatter(&rows(&[
            ("jan/25", "A", 100.0, 50.0, 12.0),
            ("jan/25", "B", 200.0, 100.0, 22.0),
            ("jan/25", "C", 300.0, 150.0, 32.0),
            ("jan/25", "D", 400.0, 0.0, 50.0),
        ]));
        let names: Vec<&str> = report.points.iter().map(|m| m.origin.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        let fit = report.sales_on_contacts.unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-9);
        assert!((report.sales_on_qualified.unwrap().slope - 0.2).abs() < 1e-9);
    }
}
