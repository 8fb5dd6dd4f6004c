use crate::cli::FilterArgs;
use crate::render;
use analytics::{MetricsEngine, ViewKind};
use anyhow::{Context, Result, bail};
use configuration::Settings;
use core_types::{Dataset, RowSet};
use dataset_store::{DatasetHandle, DatasetStore};
use ingest::WorkbookIngestor;
use query::{PeriodRange, QueryEngine, QueryError, Selection};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs: the settings and the slot holding the loaded dataset.
pub struct App {
    settings: Settings,
    handle: DatasetHandle,
    store: DatasetStore,
    query: QueryEngine,
    metrics: MetricsEngine,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let metrics = MetricsEngine::new(settings.analysis.clone());
        Self {
            settings,
            handle: DatasetHandle::new(),
            store: DatasetStore::default(),
            query: QueryEngine::default(),
            metrics,
        }
    }

    /// Loads a workbook, or a JSON export when the file ends in `.json`, and swaps it in.
    pub fn load(&self, source: &Path) -> Result<Arc<Dataset>> {
        let is_json = source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let dataset = if is_json {
            let json = std::fs::read_to_string(source)
                .with_context(|| format!("Failed to read {}", source.display()))?;
            self.store
                .from_json(&json)
                .with_context(|| format!("Failed to decode dataset from {}", source.display()))?
        } else {
            let ingestion = WorkbookIngestor::new(self.settings.ingest.clone())
                .ingest_path(source)
                .with_context(|| format!("Failed to ingest {}", source.display()))?;
            for skipped in &ingestion.skipped {
                eprintln!("warning: {skipped}");
            }
            ingestion.dataset
        };

        self.handle.replace(dataset);
        self.handle
            .snapshot()
            .context("The dataset slot is empty right after loading")
    }

    pub fn inspect(&self, source: &Path) -> Result<()> {
        let dataset = self.load(source)?;
        println!("Cities: {}", dataset.cities().join(", "));
        for table in dataset.tables() {
            println!("  {} ({} rows, {} columns)", table.city, table.len(), table.columns.len());
        }
        if dataset.periods().is_empty() {
            println!("No periods found.");
        } else {
            println!("{}", render::periods(dataset.periods()));
        }
        Ok(())
    }

    pub fn query(&self, source: &Path, filters: &FilterArgs, json: bool) -> Result<()> {
        let dataset = self.load(source)?;
        let selection = self.selection(&dataset, filters);
        let Some(rows) = self.select(&dataset, &selection)? else {
            return Ok(());
        };
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            println!("{}", render::row_set(&rows));
        }
        Ok(())
    }

    pub fn view(&self, source: &Path, filters: &FilterArgs, kind: ViewKind, json: bool) -> Result<()> {
        let dataset = self.load(source)?;
        let selection = self.selection(&dataset, filters);
        let Some(rows) = self.select(&dataset, &selection)? else {
            return Ok(());
        };
        let report = self.metrics.render(kind, &rows)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        if render::is_empty(&report) {
            println!("Not enough data for the {kind} view.");
            return Ok(());
        }
        for (title, table) in render::view(&report) {
            println!("{title}\n{table}");
        }
        Ok(())
    }

    pub fn export(&self, source: &Path, out: &Path) -> Result<()> {
        let dataset = self.load(source)?;
        let json = self.store.to_json_pretty(&dataset)?;
        std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), cities = dataset.cities().len(), "Dataset exported.");
        Ok(())
    }

    /// Turns the filter flags into a selection. A missing bound falls back to the dataset's
    /// first or last period, or to the given bound when the dataset has no periods.
    fn selection(&self, dataset: &Dataset, filters: &FilterArgs) -> Selection {
        let resolver = self.query.resolver();
        let default = self.query.default_range(dataset);
        let start = filters.from.as_deref().map(|label| resolver.resolve(label));
        let end = filters.to.as_deref().map(|label| resolver.resolve(label));
        let range = match (start, end) {
            (Some(start), Some(end)) => Some(PeriodRange::new(start, end)),
            (Some(start), None) => Some(PeriodRange::new(start, default.map_or(start, |r| r.end))),
            (None, Some(end)) => Some(PeriodRange::new(default.map_or(end, |r| r.start), end)),
            (None, None) => default,
        };

        let mut selection =
            Selection::city(filters.city.clone()).with_origins(filters.origins.iter().cloned());
        if let Some(range) = range {
            selection = selection.with_range(range);
        }
        selection
    }

    /// Runs a selection. `None` means there was nothing to show and a message was printed.
    fn select(&self, dataset: &Dataset, selection: &Selection) -> Result<Option<RowSet>> {
        match self.query.select(dataset, selection) {
            Ok(rows) if rows.is_empty() => {
                println!("The selection for {} matched no rows.", selection.city);
                Ok(None)
            }
            Ok(rows) => Ok(Some(rows)),
            Err(QueryError::UnknownCity(city)) => bail!(
                "No data for city '{city}'. Known cities: {}",
                dataset.cities().join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Period, PeriodOption};

    fn filters(from: Option<&str>, to: Option<&str>, origins: &[&str]) -> FilterArgs {
        FilterArgs {
            city: "Recife".to_string(),
            from: from.map(String::from),
            to: to.map(String::from),
            origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    fn option(value: &str, year: i32, month: u32) -> PeriodOption {
        PeriodOption {
            value: value.to_string(),
            label: value.to_string(),
            period: Period::new(year, month).unwrap(),
        }
    }

    #[test]
    fn test_one_bound_without_period_options_still_filters() {
        let app = App::new(Settings::default());
        let dataset = Dataset::default();

        let selection = app.selection(&dataset, &filters(Some("fev/25"), None, &[]));
        let feb = Period::new(2025, 2).unwrap();
        assert_eq!(selection.range, Some(PeriodRange::new(feb, feb)));

        let selection = app.selection(&dataset, &filters(None, Some("fev/25"), &[]));
        assert_eq!(selection.range, Some(PeriodRange::new(feb, feb)));

        let selection = app.selection(&dataset, &filters(None, None, &[]));
        assert_eq!(selection.range, None);
    }

    #[test]
    fn test_missing_bound_falls_back_to_dataset_periods() {
        let app = App::new(Settings::default());
        let dataset = Dataset::new(
            vec![],
            vec![option("dez/24", 2024, 12), option("mar/25", 2025, 3)],
        );
        let selection = app.selection(&dataset, &filters(Some("jan/25"), None, &[]));
        let range = selection.range.unwrap();
        assert_eq!(range.start, Period::new(2025, 1).unwrap());
        assert_eq!(range.end, Period::new(2025, 3).unwrap());
    }

    #[test]
    fn test_origin_whitelist_kept_for_every_view() {
        let app = App::new(Settings::default());
        let selection = app.selection(&Dataset::default(), &filters(None, None, &["Google"]));
        let origins = selection.origins.unwrap();
        assert_eq!(origins.into_iter().collect::<Vec<_>>(), vec!["Google".to_string()]);
    }
}
