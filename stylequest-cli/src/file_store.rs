//! A [`KeyValueStore`] backed by one JSON object file.
//!
//! Every write rewrites the whole file (temp file + rename), so a value is
//! on disk as soon as `set` returns. Reads go to the file each time; the last
//! writer wins when two processes share a path.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use stylequest_game::KeyValueStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("cannot access store file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is not a JSON object")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> FileStoreError {
        FileStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| FileStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to modify. A corrupt file is replaced rather than blocking
    /// every future write.
    fn load_for_update(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        match self.load() {
            Err(FileStoreError::Corrupt { path, source }) => {
                log::warn!("discarding unreadable store {}: {source}", path.display());
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let payload = serde_json::to_vec_pretty(entries).map_err(|source| {
            FileStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, payload).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))
    }
}

impl KeyValueStore for JsonFileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let mut entries = self.load_for_update()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
