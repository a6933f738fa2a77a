// MeasureStore - durable per-measure JSON records
//
// One record per sealed measure: a JSON map of in-measure position to the
// symbol's textual form, named `<base>_<index>.json`. Records from a prior
// run are cleared at session start so re-runs never collide with leftovers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SessionError;
use crate::symbol::Symbol;

pub struct MeasureStore {
    dir: PathBuf,
    base_name: String,
}

impl MeasureStore {
    pub fn new<P: AsRef<Path>>(dir: P, base_name: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            base_name: base_name.to_string(),
        }
    }

    /// Path of the record for a given measure index.
    pub fn record_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.json", self.base_name, index))
    }

    /// Remove records left behind by a prior run (idempotent).
    ///
    /// Creates the output directory if it does not exist yet. Only files
    /// matching this store's `<base>_*.json` naming are removed.
    pub fn clear_previous(&self) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;

        let prefix = format!("{}_", self.base_name);
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(".json") {
                fs::remove_file(entry.path())?;
            }
        }

        log::info!("[Store] Cleared previous records under {:?}", self.dir);
        Ok(())
    }

    /// Persist one measure as a durable record.
    ///
    /// The record is a map from in-measure index (0..len-1) to the symbol's
    /// textual representation, serialized as human-readable UTF-8 JSON.
    pub fn save(&self, index: usize, symbols: &[Symbol]) -> Result<PathBuf, SessionError> {
        let record: BTreeMap<usize, String> = symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| (i, symbol.to_string()))
            .collect();

        let path = self.record_path(index);
        let json = serde_json::to_string_pretty(&record).map_err(|err| {
            SessionError::StoreFailed {
                details: format!("serialize measure {}: {}", index, err),
            }
        })?;
        fs::write(&path, json)?;

        log::info!("[Store] Saved measure {} to {:?}", index, path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SolfaName;

    #[test]
    fn test_save_writes_indexed_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = MeasureStore::new(dir.path(), "measure");
        store.clear_previous().unwrap();

        let symbols = vec![
            Symbol::pitch(SolfaName::Do, 4),
            Symbol::Rest,
            Symbol::DetectionFailure,
        ];
        let path = store.save(0, &symbols).unwrap();
        assert!(path.ends_with("measure_0.json"));

        let contents = fs::read_to_string(&path).unwrap();
        let record: BTreeMap<usize, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(record[&0], "Do4");
        assert_eq!(record[&1], "Rest");
        assert_eq!(record[&2], "Failure");
    }

    #[test]
    fn test_clear_previous_removes_only_matching_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = MeasureStore::new(dir.path(), "measure");
        store.clear_previous().unwrap();

        store.save(0, &[Symbol::Rest]).unwrap();
        store.save(1, &[Symbol::Rest]).unwrap();
        fs::write(dir.path().join("unrelated.txt"), "keep me").unwrap();

        store.clear_previous().unwrap();

        assert!(!store.record_path(0).exists());
        assert!(!store.record_path(1).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_clear_previous_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("records");
        let store = MeasureStore::new(&nested, "measure");

        store.clear_previous().unwrap();
        assert!(nested.is_dir());
    }
}
