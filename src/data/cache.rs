use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{load_file, LoadError};
use super::model::Dataset;

/// Where a [`DatasetCache`] gets its snapshot from.
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    /// A dataset supplied up front; never touches the filesystem.
    #[cfg(test)]
    Preloaded(Arc<Dataset>),
}

/// Load-once boundary around the dataset.
///
/// The first [`get`](Self::get) reads the source; later calls hand out the
/// same `Arc` until [`invalidate`](Self::invalidate) or
/// [`set_path`](Self::set_path) drops it.
#[derive(Debug)]
pub struct DatasetCache {
    source: Source,
    snapshot: Option<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            snapshot: None,
        }
    }

    /// Cache that always serves `dataset`.
    #[cfg(test)]
    pub fn preloaded(dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);
        Self {
            source: Source::Preloaded(dataset.clone()),
            snapshot: Some(dataset),
        }
    }

    /// The shared snapshot, loading it first if needed.
    pub fn get(&mut self) -> Result<Arc<Dataset>, LoadError> {
        if let Some(ds) = &self.snapshot {
            return Ok(ds.clone());
        }
        let dataset = match &self.source {
            Source::File(path) => {
                let dataset = Arc::new(load_file(path)?);
                log::info!(
                    "Loaded {} records from {}",
                    dataset.len(),
                    path.display()
                );
                dataset
            }
            #[cfg(test)]
            Source::Preloaded(ds) => ds.clone(),
        };
        self.snapshot = Some(dataset.clone());
        Ok(dataset)
    }

    /// Forget the snapshot; the next `get` reloads from the source.
    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            log::debug!("dataset cache invalidated");
        }
    }

    /// Point the cache at another file. Drops the current snapshot.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.source = Source::File(path.into());
        self.invalidate();
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            #[cfg(test)]
            Source::Preloaded(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}
