use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataLoadError;
use super::loader;
use super::model::Dataset;

/// Loaded datasets keyed by path. Each path is read at most once; callers
/// share the same immutable `Arc<Dataset>` afterwards.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, reading the file on first use.
    pub fn init(&mut self, path: &Path) -> Result<Arc<Dataset>, DataLoadError> {
        self.init_with(path, loader::load_file)
    }

    /// Like [`init`](Self::init) with a custom loader for the cold path.
    /// A failed load leaves the cache untouched.
    pub fn init_with<F>(&mut self, path: &Path, load: F) -> Result<Arc<Dataset>, DataLoadError>
    where
        F: FnOnce(&Path) -> Result<Dataset, DataLoadError>,
    {
        if let Some(ds) = self.entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }

        self.loads += 1;
        let ds = Arc::new(load(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&ds));
        Ok(ds)
    }

    /// The cached dataset for `path`, without loading.
    pub fn get(&self, path: &Path) -> Option<Arc<Dataset>> {
        self.entries.get(path).cloned()
    }

    /// Number of times a loader was invoked.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::tests::record;

    #[test]
    fn second_init_reuses_the_loaded_dataset() {
        let mut cache = DatasetCache::new();
        let path = Path::new("arrivals.csv");
        let mut calls = 0;

        let first = cache
            .init_with(path, |_| {
                calls += 1;
                Ok(Dataset::from_records(vec![record(2020, "weiblich", "Schweiz", "20", 3)]))
            })
            .unwrap();
        let second = cache
            .init_with(path, |_| {
                calls += 1;
                Ok(Dataset::from_records(Vec::new()))
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(cache.loads(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn get_does_not_load() {
        let mut cache = DatasetCache::new();
        let path = Path::new("arrivals.csv");
        assert!(cache.get(path).is_none());
        assert_eq!(cache.loads(), 0);

        cache
            .init_with(path, |_| Ok(Dataset::from_records(Vec::new())))
            .unwrap();
        assert!(cache.get(path).is_some());
        assert!(cache.get(Path::new("other.csv")).is_none());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache = DatasetCache::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        assert!(cache.init(&path).is_err());
        assert!(cache.get(&path).is_none());
        assert!(cache.init(&path).is_err());
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn file_is_read_once_and_results_are_equal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "StichtagDat,EreignisDatJahr,EreignisDatMM,AnzZuzuWir,SexLang,AlterV20ueber80Kurz_noDM,HerkunftLang,QuarLang,KreisLang"
        )
        .unwrap();
        writeln!(file, "2019-12-31,2019,12,2,weiblich,20,Schweiz,Enge,Kreis 2").unwrap();
        writeln!(file, "2020-12-31,2020,12,x,männlich,40,Ausland,Seefeld,Kreis 8").unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.init(file.path()).unwrap();
        let second = cache.init(file.path()).unwrap();

        assert_eq!(cache.loads(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, loader::load_file(file.path()).unwrap());
    }
}
