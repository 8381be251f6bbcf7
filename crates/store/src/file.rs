use std::{
    path::{Path, PathBuf},
    sync::{Mutex, RwLock},
};

use tracing::{debug, info};

use crate::{
    Store,
    error::{Error, Result},
    tables::Tables,
};

/// A store held in memory and persisted as a single JSON document.
///
/// An in-memory instance (no path) treats `commit` as a no-op, which is what
/// tests and throwaway bots want.
///
/// Lock order is `persist_lock` before `tables`.
pub struct FileStore {
    path: Option<PathBuf>,
    tables: RwLock<Tables>,
    /// Held from snapshot to rename so concurrent commits land in order and
    /// never share the temp file.
    persist_lock: Mutex<()>,
}

impl FileStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: RwLock::new(Tables::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Open the store at `path`, loading its contents when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            let tables: Tables = serde_json::from_str(&raw).map_err(|source| Error::Parse {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "opened store");
            tables
        } else {
            debug!(path = %path.display(), "store file missing, starting empty");
            Tables::default()
        };
        Ok(Self {
            path: Some(path),
            tables: RwLock::new(tables),
            persist_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Callers must hold `persist_lock`.
    fn persist(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tables)?;
        // Write next to the target and rename so a crash never leaves a torn file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "committed store");
        Ok(())
    }
}

impl Store for FileStore {
    fn read(&self, f: &mut dyn FnMut(&Tables)) -> Result<()> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        f(&tables);
        Ok(())
    }

    fn write(&self, f: &mut dyn FnMut(&mut Tables)) -> Result<()> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        f(&mut tables);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let _persisting = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        self.persist(&tables)
    }

    fn backup(&self) -> Result<String> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(serde_json::to_string_pretty(&*tables)?)
    }

    fn recover(&self, backup: &str) -> Result<()> {
        let recovered: Tables =
            serde_json::from_str(backup).map_err(|source| Error::InvalidBackup { source })?;
        let _persisting = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        *tables = recovered;
        info!("recovered store from backup");
        self.persist(&tables)
    }

    fn clear(&self) -> Result<()> {
        let _persisting = self.persist_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        *tables = Tables::default();
        self.persist(&tables)
    }
}
