use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestSettings,
    pub analysis: AnalysisSettings,
}

/// Controls which workbook sheets become city tables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Summary or duplicate sheets that are never ingested. Matched by exact name.
    pub excluded_sheets: Vec<String>,
}

/// Minimum volumes and slice sizes for the ranking views.
///
/// These are fixed domain thresholds, not computed from the data. They keep a channel with a
/// handful of contacts from topping a ranking on a spurious ratio.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Contacts an origin needs before it is ranked by conversion.
    pub top_channels_min_contacts: f64,
    /// Qualified leads an origin needs before it is ranked by qualified conversion.
    pub top_channels_min_qualified: f64,
    /// How many origins each top-channels ranking returns.
    pub top_channels_count: usize,
    /// Contacts an origin needs to appear in the conversion-by-channel view.
    pub conversion_min_contacts: f64,
    /// Sales an origin needs before its efficiency is ranked.
    pub efficiency_min_sales: f64,
    pub efficiency_count: usize,
    /// Periods with both contacts and sales above zero an origin needs for a correlation.
    pub correlation_min_periods: usize,
    /// Size of the best and worst correlation slices.
    pub correlation_slice: usize,
    /// Origins shown individually in the contact share; the rest are grouped.
    pub distribution_count: usize,
    pub scatter_count: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            excluded_sheets: [
                "Salvador",
                "Planilha1",
                "Fortaleza",
                "Deliverysalvador1",
                "Deliverysalvador4",
                "SSA",
                "Brasília",
                "J4ASSUNCAO",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_channels_min_contacts: 50.0,
            top_channels_min_qualified: 30.0,
            top_channels_count: 5,
            conversion_min_contacts: 100.0,
            efficiency_min_sales: 10.0,
            efficiency_count: 15,
            correlation_min_periods: 3,
            correlation_slice: 15,
            distribution_count: 5,
            scatter_count: 15,
        }
    }
}

impl IngestSettings {
    pub fn is_excluded(&self, sheet_name: &str) -> bool {
        self.excluded_sheets.iter().any(|s| s == sheet_name)
    }
}

impl Settings {
    /// Rejects settings that would make a view meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        let counts = [
            ("top_channels_count", a.top_channels_count),
            ("efficiency_count", a.efficiency_count),
            ("correlation_slice", a.correlation_slice),
            ("distribution_count", a.distribution_count),
            ("scatter_count", a.scatter_count),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.{name} must be at least 1"
            )));
        }
        // Pearson needs two points to be defined at all.
        if a.correlation_min_periods < 2 {
            return Err(ConfigError::ValidationError(
                "analysis.correlation_min_periods must be at least 2".to_string(),
            ));
        }
        let thresholds = [
            ("top_channels_min_contacts", a.top_channels_min_contacts),
            ("top_channels_min_qualified", a.top_channels_min_qualified),
            ("conversion_min_contacts", a.conversion_min_contacts),
            ("efficiency_min_sales", a.efficiency_min_sales),
        ];
        if let Some((name, _)) = thresholds
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(ConfigError::ValidationError(format!(
                "analysis.{name} must be a non-negative number"
            )));
        }
        Ok(())
    }
}
