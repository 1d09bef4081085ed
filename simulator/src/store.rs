use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use winfinity_execution::State;
use winfinity_types::arcade::Key;

/// Wallet storage in a JSON file, laid out like the browser's `localStorage`
/// (a flat map of key to string).
///
/// Every write rewrites the file. I/O problems are logged and never surface
/// to the economy, so a broken disk degrades to an in-memory session.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable store");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "starting with empty store");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read store");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let raw = match serde_json::to_string_pretty(&self.values) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to encode store");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), error = %e, "failed to write store");
        }
    }
}

impl State for FileStore {
    fn get(&self, key: Key) -> Option<String> {
        self.values.get(key.as_str()).cloned()
    }

    fn insert(&mut self, key: Key, value: String) {
        self.values.insert(key.as_str().to_string(), value);
        self.flush();
    }

    fn delete(&mut self, key: Key) {
        if self.values.remove(key.as_str()).is_some() {
            self.flush();
        }
    }
}
