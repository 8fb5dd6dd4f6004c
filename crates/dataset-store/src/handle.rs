use arc_swap::ArcSwapOption;
use core_types::Dataset;
use std::sync::Arc;

/// The slot holding the currently loaded dataset.
///
/// Loading a new workbook swaps the whole dataset in one atomic step. Readers take a
/// snapshot and keep a consistent view even if a reload happens while they work; the old
/// dataset is freed when its last snapshot is dropped.
#[derive(Debug, Default)]
pub struct DatasetHandle {
    slot: ArcSwapOption<Dataset>,
}

impl DatasetHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            slot: ArcSwapOption::from_pointee(dataset),
        }
    }

    /// Installs `dataset` and returns the one it replaced, if any.
    pub fn replace(&self, dataset: Dataset) -> Option<Arc<Dataset>> {
        let previous = self.slot.swap(Some(Arc::new(dataset)));
        tracing::debug!(replaced = previous.is_some(), "Dataset swapped in.");
        previous
    }

    pub fn clear(&self) -> Option<Arc<Dataset>> {
        self.slot.swap(None)
    }

    /// The dataset loaded right now, or `None` before the first load.
    pub fn snapshot(&self) -> Option<Arc<Dataset>> {
        self.slot.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.load().is_some()
    }
}
