use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::category::{
    build_comparison, classify, Comparison, ComparisonRequest, IndicatorCategory,
};
use crate::data::model::{Dataset, IndicatorRecord};
use crate::data::query::{
    filter_by_indicator_and_range, list_indicators, related_indicator_names, year_bounds, CHILDREN,
};
use crate::data::summary::{summarize, Summary};

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything the panels draw for the current selection. Rebuilt from the
/// dataset on every selection change; never edited by the UI.
#[derive(Debug, Clone)]
pub struct View {
    pub window: Vec<IndicatorRecord>,
    pub summary: Summary,
    pub category: IndicatorCategory,
    pub comparison: Option<Comparison>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            window: Vec::new(),
            summary: Summary::default(),
            category: IndicatorCategory::Other,
            comparison: None,
        }
    }
}

impl View {
    /// Unit of the window, taken from its first record.
    pub fn unit(&self) -> &str {
        self.window.first().map_or("", |r| r.unit.as_str())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Current snapshot (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Distinct indicator names for the selector.
    pub indicators: Vec<String>,

    /// Global year bounds for the range sliders.
    pub year_bounds: Option<(i32, i32)>,

    pub selected: Option<String>,

    /// Inclusive year window.
    pub year_range: (i32, i32),

    /// All child nutrition indicators in the dataset.
    pub child_indicators: Vec<String>,

    /// Child indicators picked for side-by-side comparison.
    pub child_selection: BTreeSet<String>,

    pub view: View,

    pub colors: SeriesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::from_path(config.data_path.clone());
        Self::with_cache(config, cache)
    }

    /// Build state around an existing cache, e.g. a preloaded one.
    pub fn with_cache(config: DashboardConfig, cache: DatasetCache) -> Self {
        Self {
            config,
            cache,
            dataset: None,
            indicators: Vec::new(),
            year_bounds: None,
            selected: None,
            year_range: (0, 0),
            child_indicators: Vec::new(),
            child_selection: BTreeSet::new(),
            view: View::default(),
            colors: SeriesColors::default(),
            status_message: None,
        }
    }

    /// Pull the dataset from the cache (reads the file on first use only).
    pub fn load(&mut self) {
        if self.cache.is_loaded() {
            log::debug!("serving cached dataset snapshot");
        }
        match self.cache.get() {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.dataset = None;
                self.indicators.clear();
                self.year_bounds = None;
                self.selected = None;
                self.view = View::default();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop the cached snapshot and read the source again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.load();
    }

    /// Switch to another file.
    pub fn open_path(&mut self, path: PathBuf) {
        self.cache.set_path(path);
        self.load();
    }

    pub fn data_path(&self) -> Option<PathBuf> {
        self.cache.path().map(|p| p.to_path_buf())
    }

    /// Ingest a dataset snapshot and derive the view. A selected indicator
    /// that is still present keeps its year window (clamped to the new
    /// bounds); otherwise the first indicator is selected over the full range.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let previous_range = self.year_range;
        self.indicators = list_indicators(&dataset);
        self.year_bounds = year_bounds(&dataset);
        self.year_range = self.year_bounds.unwrap_or((0, 0));
        self.child_indicators = related_indicator_names(&dataset, CHILDREN);
        self.colors = SeriesColors::new(&self.indicators);

        if dataset.is_empty() {
            log::warn!("dataset has no records");
        }

        log::info!(
            "{} indicators, years {:?}",
            self.indicators.len(),
            self.year_bounds
        );

        self.dataset = Some(dataset);
        self.status_message = None;

        let kept = self
            .selected
            .take()
            .filter(|item| self.indicators.contains(item));
        match kept {
            Some(item) => {
                log::debug!("keeping selection {item:?} across reload");
                self.child_selection
                    .retain(|child| self.child_indicators.contains(child));
                self.child_selection.insert(item.clone());
                self.selected = Some(item);
                self.year_range = self.clamp_range(previous_range.0, previous_range.1);
                self.refresh();
            }
            None => match self.indicators.first().cloned() {
                Some(item) => self.select_indicator(item),
                None => {
                    self.selected = None;
                    self.refresh();
                }
            },
        }
    }

    /// Select an indicator; the child comparison starts from just this one.
    pub fn select_indicator(&mut self, item: String) {
        self.child_selection = BTreeSet::from([item.clone()]);
        self.selected = Some(item);
        self.refresh();
    }

    /// Set the year window, clamped to the dataset bounds with `low <= high`.
    pub fn set_year_range(&mut self, low: i32, high: i32) {
        if self.year_bounds.is_none() {
            return;
        }
        let range = self.clamp_range(low, high);
        if range != self.year_range {
            self.year_range = range;
            self.refresh();
        }
    }

    fn clamp_range(&self, low: i32, high: i32) -> (i32, i32) {
        let (min, max) = self.year_bounds.unwrap_or((0, 0));
        let low = low.clamp(min, max);
        (low, high.clamp(low, max))
    }

    /// Add or remove a child indicator from the comparison.
    pub fn toggle_child(&mut self, item: &str) {
        if !self.child_selection.remove(item) {
            self.child_selection.insert(item.to_string());
        }
        self.refresh();
    }

    /// Recompute the derived view after a selection change.
    pub fn refresh(&mut self) {
        let (Some(dataset), Some(item)) = (&self.dataset, &self.selected) else {
            self.view = View::default();
            return;
        };
        let (low, high) = self.year_range;

        let window = filter_by_indicator_and_range(dataset, item, low, high);
        let summary = summarize(&window);
        let category = classify(item);
        let comparison = build_comparison(
            dataset,
            category,
            &ComparisonRequest {
                selected: item,
                window: &window,
                child_selection: &self.child_selection,
                low,
                high,
            },
        );

        log::debug!(
            "view for {item:?} [{low}, {high}]: {} records, category {category}",
            window.len()
        );

        self.view = View {
            window,
            summary,
            category,
            comparison,
        };
    }
}
