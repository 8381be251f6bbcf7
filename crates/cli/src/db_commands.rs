use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    clap::Subcommand,
    herald_config::StoreConfig,
    herald_store::{FileStore, Store},
};

/// Default store file name inside the data directory.
const STORE_FILE: &str = "herald.db.json";

#[derive(Subcommand)]
pub enum DbAction {
    /// Print the store backup, or write it to a file.
    Backup {
        /// File to write the backup to (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the store contents with a backup file.
    Recover {
        /// Backup produced by `herald db backup` or the `/backup` ability.
        file: PathBuf,
    },
    /// Drop every user, admin and blacklist entry.
    Clear,
}

/// Where the store lives on disk, or `None` for an in-memory store.
pub fn store_path(config: &StoreConfig) -> Option<PathBuf> {
    if config.in_memory {
        return None;
    }
    Some(
        config
            .path
            .clone()
            .unwrap_or_else(|| herald_config::data_dir().join(STORE_FILE)),
    )
}

pub fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn Store>> {
    let store = match store_path(config) {
        Some(path) => FileStore::open(path)?,
        None => FileStore::in_memory(),
    };
    Ok(Arc::new(store))
}

pub fn handle_db(action: DbAction, config: &StoreConfig) -> anyhow::Result<()> {
    let Some(path) = store_path(config) else {
        anyhow::bail!("the store is configured in memory, nothing to manage");
    };
    let store = FileStore::open(&path)?;
    match action {
        DbAction::Backup { output } => backup(&store, output.as_deref()),
        DbAction::Recover { file } => recover(&store, &file),
        DbAction::Clear => {
            store.clear()?;
            println!("Store cleared: {}", path.display());
            Ok(())
        },
    }
}

fn backup(store: &dyn Store, output: Option<&Path>) -> anyhow::Result<()> {
    let backup = store.backup()?;
    match output {
        Some(output) => {
            std::fs::write(output, backup)?;
            println!("Backup written to {}", output.display());
        },
        None => println!("{backup}"),
    }
    Ok(())
}

fn recover(store: &dyn Store, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    store.recover(&raw)?;
    println!("Store recovered from {}", file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, herald_store::StoreExt};

    #[test]
    fn in_memory_has_no_path() {
        let config = StoreConfig {
            in_memory: true,
            path: Some(PathBuf::from("ignored.json")),
        };
        assert_eq!(store_path(&config), None);
    }

    #[test]
    fn configured_path_wins_over_data_dir() {
        let config = StoreConfig {
            path: Some(PathBuf::from("/tmp/bot.json")),
            in_memory: false,
        };
        assert_eq!(store_path(&config), Some(PathBuf::from("/tmp/bot.json")));

        let default = store_path(&StoreConfig::default()).unwrap();
        assert!(default.ends_with(STORE_FILE));
    }

    #[test]
    fn backup_to_file_then_recover() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            path: Some(dir.path().join("db.json")),
            in_memory: false,
        };
        let output = dir.path().join("backup.json");

        let store = open_store(&config).unwrap();
        store
            .update(|t| t.set_mut("ADMINS").insert("7".into()))
            .unwrap();
        store.commit().unwrap();

        handle_db(
            DbAction::Backup {
                output: Some(output.clone()),
            },
            &config,
        )
        .unwrap();
        handle_db(DbAction::Clear, &config).unwrap();
        assert!(open_store(&config).unwrap().view(|t| t.is_empty()).unwrap());

        handle_db(DbAction::Recover { file: output }, &config).unwrap();
        let reopened = open_store(&config).unwrap();
        assert!(reopened.view(|t| t.contains("ADMINS", "7")).unwrap());
    }

    #[test]
    fn recover_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            path: Some(dir.path().join("db.json")),
            in_memory: false,
        };
        let err = handle_db(
            DbAction::Recover {
                file: dir.path().join("nope.json"),
            },
            &config,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn in_memory_store_cannot_be_managed() {
        let config = StoreConfig {
            in_memory: true,
            path: None,
        };
        assert!(handle_db(DbAction::Clear, &config).is_err());
    }
}
