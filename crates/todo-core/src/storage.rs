use std::collections::BTreeMap;

use crate::error::StorageError;

/// A per-origin string key-value store, shaped after the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. An optional quota caps the summed size of keys and values,
/// the way browsers cap `localStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let available = quota.saturating_sub(self.used_excluding(key));
            let needed = key.len() + value.len();
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileStore;

#[cfg(feature = "native")]
mod file {
    use std::fs;
    use std::io::{ErrorKind, Write};
    use std::path::{Path, PathBuf};

    use tempfile::NamedTempFile;
    use tracing::debug;

    use super::KeyValueStore;
    use crate::error::StorageError;

    /// One file per key inside a data directory. Writes go through a temp file
    /// and a rename so a crash never leaves a half-written value behind.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        dir: PathBuf,
    }

    impl FileStore {
        #[tracing::instrument(skip(dir))]
        pub fn open(dir: &Path) -> Result<Self, StorageError> {
            fs::create_dir_all(dir).map_err(|err| StorageError::Io {
                key: dir.display().to_string(),
                message: err.to_string(),
            })?;
            debug!(dir = %dir.display(), "opened file store");
            Ok(Self {
                dir: dir.to_path_buf(),
            })
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }

        pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
            let valid = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
                && !key.starts_with('.');
            if !valid {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    message: "key is not a valid file name".to_string(),
                });
            }
            Ok(self.dir.join(format!("{key}.json")))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let path = self.path_for(key)?;
            match fs::read_to_string(&path) {
                Ok(raw) => Ok(Some(raw)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(io_error(key, err)),
            }
        }

        #[tracing::instrument(skip(self, value), fields(bytes = value.len()))]
        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let path = self.path_for(key)?;
            let mut temp = NamedTempFile::new_in(&self.dir).map_err(|err| io_error(key, err))?;
            temp.write_all(value.as_bytes())
                .map_err(|err| io_error(key, err))?;
            temp.flush().map_err(|err| io_error(key, err))?;
            temp.persist(&path)
                .map_err(|err| io_error(key, err.error))?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            let path = self.path_for(key)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(io_error(key, err)),
            }
        }
    }

    fn io_error(key: &str, err: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
