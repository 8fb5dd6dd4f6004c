use crate::engine::MetricsEngine;
use crate::error::AnalyticsError;
use crate::report::ViewReport;
use core_types::{RowSet, columns};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The dashboard views the metrics engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Summary,
    OriginPerformance,
    ConversionByChannel,
    MonthlyTrend,
    TopChannels,
    SalesEfficiency,
    Correlation,
    Scatter,
    Details,
}

impl ViewKind {
    pub const ALL: [ViewKind; 9] = [
        ViewKind::Summary,
        ViewKind::OriginPerformance,
        ViewKind::ConversionByChannel,
        ViewKind::MonthlyTrend,
        ViewKind::TopChannels,
        ViewKind::SalesEfficiency,
        ViewKind::Correlation,
        ViewKind::Scatter,
        ViewKind::Details,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Summary => "summary",
            ViewKind::OriginPerformance => "origin-performance",
            ViewKind::ConversionByChannel => "conversion-by-channel",
            ViewKind::MonthlyTrend => "monthly-trend",
            ViewKind::TopChannels => "top-channels",
            ViewKind::SalesEfficiency => "sales-efficiency",
            ViewKind::Correlation => "correlation",
            ViewKind::Scatter => "scatter",
            ViewKind::Details => "details",
        }
    }

    /// Canonical columns the view cannot be computed without.
    pub fn required_columns(self) -> &'static [&'static str] {
        const FUNNEL: &[&str] = &[columns::CONTACTS, columns::QUALIFIED, columns::SALES];
        const BY_ORIGIN: &[&str] = &[
            columns::ORIGIN,
            columns::CONTACTS,
            columns::QUALIFIED,
            columns::SALES,
        ];
        match self {
            ViewKind::Summary => FUNNEL,
            ViewKind::OriginPerformance
            | ViewKind::ConversionByChannel
            | ViewKind::TopChannels
            | ViewKind::Scatter => BY_ORIGIN,
            ViewKind::MonthlyTrend => &[
                columns::PERIOD,
                columns::CONTACTS,
                columns::QUALIFIED,
                columns::SALES,
            ],
            ViewKind::SalesEfficiency | ViewKind::Correlation => {
                &[columns::ORIGIN, columns::CONTACTS, columns::SALES]
            }
            ViewKind::Details => &[],
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ViewKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ViewKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown view '{s}', expected one of: {}", known.join(", "))
            })
    }
}

impl MetricsEngine {
    /// Computes one view over an already-selected row set.
    pub fn render(&self, kind: ViewKind, rows: &RowSet) -> Result<ViewReport, AnalyticsError> {
        let missing = rows.missing_columns(kind.required_columns());
        if !missing.is_empty() {
            tracing::warn!(view = %kind, ?missing, "View cannot be computed.");
            return Err(AnalyticsError::MissingColumns(missing));
        }
        tracing::debug!(view = %kind, rows = rows.len(), "Rendering view.");

        let settings = self.settings();
        let report = match kind {
            ViewKind::Summary => ViewReport::Summary {
                summary: self.funnel_summary(rows),
                distribution: self.origin_distribution(rows),
                top_conversion: self.top_channels(rows).by_conversion,
            },
            ViewKind::OriginPerformance => ViewReport::OriginPerformance(self.origin_performance(rows)),
            ViewKind::ConversionByChannel => {
                ViewReport::ConversionByChannel(self.conversion_by_channel(rows))
            }
            ViewKind::MonthlyTrend => ViewReport::MonthlyTrend(self.period_totals(rows)),
            ViewKind::TopChannels => ViewReport::TopChannels(self.top_channels(rows)),
            ViewKind::SalesEfficiency => ViewReport::SalesEfficiency(self.sales_efficiency(rows)),
            ViewKind::Correlation => {
                let table = self.correlations(rows);
                ViewReport::Correlation {
                    best: table.best(settings.correlation_slice),
                    worst: table.worst(settings.correlation_slice),
                }
            }
            ViewKind::Scatter => ViewReport::Scatter(self.scatter(rows)),
            ViewKind::Details => ViewReport::Details(rows.clone()),
        };
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::AnalysisSettings;
    use core_types::CellValue;

    #[test]
    fn test_view_names_round_trip() {
        for kind in ViewKind::ALL {
            assert_eq!(kind.name().parse::<ViewKind>(), Ok(kind));
        }
        assert_eq!("Top_Channels".parse::<ViewKind>(), Ok(ViewKind::TopChannels));
        assert!("pie".parse::<ViewKind>().is_err());
    }

    #[test]
    fn test_missing_columns_reported() {
        let rows = RowSet::new(
            "Natal",
            vec!["origem".into(), "contatos".into()],
            vec![vec![CellValue::text("Google"), CellValue::Number(10.0)]],
        )
        .unwrap();
        let engine = MetricsEngine::new(AnalysisSettings::default());
        assert_eq!(
            engine.render(ViewKind::Summary, &rows),
            Err(AnalyticsError::MissingColumns(vec![
                "aproveitados".into(),
                "vendas".into()
            ]))
        );
        assert!(matches!(
            engine.render(ViewKind::Details, &rows),
            Ok(ViewReport::Details(_))
        ));
    }
}
