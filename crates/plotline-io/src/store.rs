use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use plotline_core::{Graph, GraphSet};

use crate::savefile::{read_graphs, write_graphs, SavefileError};

/// Save directory relative to the working directory.
pub const DEFAULT_SAVE_DIR: &str = "data/saves";

const SAVE_EXTENSION: &str = "ini";

/// Named save files under one directory: one file per save, file stem =
/// save name.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{SAVE_EXTENSION}"))
    }

    /// Write the whole set to a new save file, creating the save
    /// directory on demand.
    pub fn save(&self, name: &str, set: &GraphSet) -> Result<(), SavefileError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        write_graphs(&mut writer, set)?;
        log::info!("saved {} graphs to {}", set.len(), path.display());
        Ok(())
    }

    /// Read a save file back into a graph list (section order).
    pub fn load(&self, name: &str) -> Result<Vec<Graph>, SavefileError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(SavefileError::NotFound(name.to_string()));
        }
        let graphs = read_graphs(BufReader::new(File::open(&path)?))?;
        log::info!("loaded {} graphs from {}", graphs.len(), path.display());
        Ok(graphs)
    }

    /// Base names of every regular file in the save directory, sorted.
    /// A missing directory is an empty list, not an error.
    pub fn list(&self) -> Result<Vec<String>, SavefileError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), SavefileError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(SavefileError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        log::info!("deleted save {}", path.display());
        Ok(())
    }
}

impl Default for SaveStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotline_core::{Graph, DEFAULT_THICKNESS};

    fn sample_set() -> GraphSet {
        let mut set = GraphSet::new();
        set.add(Graph::functional("line", "x").with_color(1.0, 0.0, 0.0)).unwrap();
        set.add(Graph::implicit("upper", "y > x")).unwrap();
        set
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("saves"));

        store.save("session", &sample_set()).unwrap();
        let loaded = store.load("session").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "line");
        assert_eq!(loaded[0].thickness, DEFAULT_THICKNESS);
        assert_eq!(loaded[1].body, "y > x");
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        store.save("beta", &sample_set()).unwrap();
        store.save("alpha", &sample_set()).unwrap();
        assert_eq!(store.list().unwrap(), ["alpha", "beta"]);

        store.delete("beta").unwrap();
        assert_eq!(store.list().unwrap(), ["alpha"]);
    }

    #[test]
    fn test_load_missing_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let err = store.load("nope").unwrap_err();
        assert!(matches!(err, SavefileError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn test_delete_missing_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        assert!(matches!(store.delete("nope"), Err(SavefileError::NotFound(_))));
    }

    #[test]
    fn test_overwrite_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        store.save("s", &sample_set()).unwrap();

        let mut smaller = GraphSet::new();
        smaller.add(Graph::functional("only", "x")).unwrap();
        store.save("s", &smaller).unwrap();

        let loaded = store.load("s").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "only");
    }
}
