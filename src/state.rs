use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::aggregate::{DashboardOutcome, DashboardViews};
use crate::data::cache::DatasetCache;
use crate::data::filter::{filter, FilterSelection};
use crate::data::model::{Dataset, FilterOptions};

// ---------------------------------------------------------------------------
// Filter dimensions offered as multi-selects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Sex,
    Origin,
    AgeGroup,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Sex, Dimension::Origin, Dimension::AgeGroup];

    pub fn title(self) -> &'static str {
        match self {
            Dimension::Sex => "Sex",
            Dimension::Origin => "Origin",
            Dimension::AgeGroup => "Age groups",
        }
    }

    pub fn options(self, opts: &FilterOptions) -> &[String] {
        match self {
            Dimension::Sex => &opts.sexes,
            Dimension::Origin => &opts.origins,
            Dimension::AgeGroup => &opts.age_groups,
        }
    }

    pub fn selected(self, sel: &FilterSelection) -> &BTreeSet<String> {
        match self {
            Dimension::Sex => &sel.sexes,
            Dimension::Origin => &sel.origins,
            Dimension::AgeGroup => &sel.age_groups,
        }
    }

    pub fn selected_mut(self, sel: &mut FilterSelection) -> &mut BTreeSet<String> {
        match self {
            Dimension::Sex => &mut sel.sexes,
            Dimension::Origin => &mut sel.origins,
            Dimension::AgeGroup => &mut sel.age_groups,
        }
    }

    /// Select every value this dimension offers.
    pub fn select_all(self, sel: &mut FilterSelection, opts: &FilterOptions) {
        *self.selected_mut(sel) = self.options(opts).iter().cloned().collect();
    }

    /// Deselect every value, which hides all records.
    pub fn select_none(self, sel: &mut FilterSelection) {
        self.selected_mut(sel).clear();
    }
}

/// Detail tabs below the headline charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Origin,
    AgeSex,
    Districts,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Datasets read so far, keyed by path.
    cache: DatasetCache,

    /// Path of the dataset on screen.
    pub data_path: Option<PathBuf>,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Views for the current selection (cached until the selection changes).
    pub outcome: Option<DashboardOutcome>,

    /// Stable colours per origin and per age group.
    pub origin_colors: ColorMap,
    pub age_colors: ColorMap,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            data_path: None,
            dataset: None,
            selection: FilterSelection::default(),
            outcome: None,
            origin_colors: ColorMap::default(),
            age_colors: ColorMap::default(),
            tab: Tab::default(),
            status_message: None,
        }
    }

    /// Load the configured dataset.
    pub fn open_default(&mut self) {
        let path = self.config.data_path.clone();
        self.open(&path);
    }

    /// Load (or fetch from the cache) the dataset at `path` and show it.
    /// On failure the previous dataset is dropped and the error is shown.
    pub fn open(&mut self, path: &Path) {
        if self.cache.get(path).is_none() {
            log::info!("Reading {}", path.display());
        }
        match self.cache.init(path) {
            Ok(dataset) => {
                self.data_path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.data_path = None;
                self.dataset = None;
                self.outcome = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a dataset: reset filters to "everything" and rebuild colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.selection = FilterSelection::all(&dataset);
        self.origin_colors = ColorMap::new(&dataset.options.origins);
        self.age_colors = ColorMap::new(&dataset.options.age_groups);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the views for the current selection.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.outcome = None;
            return;
        };
        let filtered = filter(ds, &self.selection);
        if filtered.is_empty() {
            log::debug!("Selection matches no records");
        } else {
            log::debug!("Selection matches {} of {} records", filtered.len(), ds.len());
        }
        self.outcome = Some(DashboardViews::compute(&filtered, &self.config.limits));
    }

    /// Replace the selection, recomputing only if it differs.
    /// Returns whether anything changed.
    pub fn apply_selection(&mut self, selection: FilterSelection) -> bool {
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.refilter();
        true
    }

    /// Number of records matching the selection.
    pub fn visible_rows(&self) -> usize {
        match &self.outcome {
            Some(DashboardOutcome::Ready(views)) => views.rows,
            _ => 0,
        }
    }

    /// Put every filter back to "everything selected".
    /// Returns whether the selection changed.
    pub fn reset_filters(&mut self) -> bool {
        let Some(ds) = &self.dataset else {
            return false;
        };
        let all = FilterSelection::all(ds);
        self.apply_selection(all)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn fixture() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "StichtagDat,EreignisDatJahr,EreignisDatMM,AnzZuzuWir,SexLang,AlterV20ueber80Kurz_noDM,HerkunftLang,QuarLang,KreisLang"
        )
        .unwrap();
        writeln!(file, "31.01.2015,2015,1,3,weiblich,20,Schweiz,Enge,Kreis 2").unwrap();
        writeln!(file, "31.01.2016,2016,1,4,männlich,40,Ausland,Seefeld,Kreis 8").unwrap();
        writeln!(file, "29.02.2016,2016,2,5,weiblich,40,Ausland,Enge,Kreis 2").unwrap();
        file
    }

    fn loaded(file: &NamedTempFile) -> AppState {
        let mut state = AppState::new(AppConfig {
            data_path: file.path().to_path_buf(),
            ..AppConfig::default()
        });
        state.open_default();
        state
    }

    #[test]
    fn opening_selects_everything() {
        let file = fixture();
        let state = loaded(&file);

        assert!(state.status_message.is_none());
        assert_eq!(state.selection.year_range, (2015, 2016));
        assert_eq!(state.visible_rows(), 3);
        match &state.outcome {
            Some(DashboardOutcome::Ready(views)) => assert_eq!(views.total, 12),
            other => panic!("expected views, got {other:?}"),
        }
    }

    #[test]
    fn reopening_hits_the_cache() {
        let file = fixture();
        let mut state = loaded(&file);
        state.open(file.path());
        assert_eq!(state.cache.loads(), 1);
    }

    #[test]
    fn unchanged_selection_is_not_recomputed() {
        let file = fixture();
        let mut state = loaded(&file);
        assert!(!state.apply_selection(state.selection.clone()));

        let mut sel = state.selection.clone();
        sel.year_range = (2016, 2016);
        assert!(state.apply_selection(sel));
        assert_eq!(state.visible_rows(), 2);
    }

    #[test]
    fn select_none_yields_empty_outcome() {
        let file = fixture();
        let mut state = loaded(&file);

        let opts = state.dataset.as_ref().unwrap().options.clone();
        let mut sel = state.selection.clone();
        Dimension::Origin.select_none(&mut sel);
        assert!(state.apply_selection(sel.clone()));
        assert_eq!(state.outcome, Some(DashboardOutcome::Empty));
        assert_eq!(state.visible_rows(), 0);

        Dimension::Origin.select_all(&mut sel, &opts);
        assert!(state.apply_selection(sel));
        assert_eq!(state.visible_rows(), 3);
    }

    #[test]
    fn reset_restores_full_selection() {
        let file = fixture();
        let mut state = loaded(&file);
        assert!(!state.reset_filters());

        let mut sel = state.selection.clone();
        sel.year_range = (2016, 2016);
        Dimension::Sex.select_none(&mut sel);
        state.apply_selection(sel);
        assert_eq!(state.outcome, Some(DashboardOutcome::Empty));

        assert!(state.reset_filters());
        assert_eq!(state.selection.year_range, (2015, 2016));
        assert_eq!(state.selection.sexes.len(), 2);
        assert_eq!(state.visible_rows(), 3);
    }

    #[test]
    fn reset_without_dataset_is_a_no_op() {
        let mut state = AppState::new(AppConfig::default());
        assert!(!state.reset_filters());
        assert!(state.outcome.is_none());
    }

    #[test]
    fn failed_open_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(AppConfig::default());
        state.open(&dir.path().join("absent.csv"));

        assert!(state.dataset.is_none());
        assert!(state.outcome.is_none());
        let msg = state.status_message.as_deref().unwrap_or_default();
        assert!(msg.starts_with("Error: cannot open"));
    }
}
