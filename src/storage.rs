//! Storage layer: JSON snapshot of the board under `.taskboard/`.

use crate::config::BoardConfig;
use crate::store::TaskStore;
use crate::types::{Task, validate_tasks};
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Storage directory name.
pub const BOARD_DIR: &str = ".taskboard";

/// Snapshot file holding the task collection.
const TASKS_FILE: &str = "tasks.json";

/// Scratch file used for atomic replacement of the snapshot.
const TASKS_TMP_FILE: &str = "tasks.json.tmp";

/// Where a snapshot that failed to restore is kept.
pub const TASKS_BAD_FILE: &str = "tasks.json.bad";

/// Storage handle for reading/writing board snapshots.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Initialize storage in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        let board_dir = root.join(BOARD_DIR);
        fs::create_dir_all(&board_dir).context("Failed to create .taskboard directory")?;

        let storage = Self {
            root: root.to_path_buf(),
        };

        if !storage.tasks_path().exists() {
            storage.save(&[]).context("Failed to create tasks.json")?;
        }
        if !board_dir.join(crate::config::CONFIG_FILE).exists() {
            BoardConfig::default().save(&board_dir)?;
        }

        Ok(storage)
    }

    /// Open existing storage.
    pub fn open(root: &Path) -> Result<Self> {
        let board_dir = root.join(BOARD_DIR);
        if !board_dir.exists() {
            eyre::bail!("No .taskboard directory found. Run 'tb init' first.");
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn board_dir(&self) -> PathBuf {
        self.root.join(BOARD_DIR)
    }

    fn tasks_path(&self) -> PathBuf {
        self.board_dir().join(TASKS_FILE)
    }

    /// Load the board configuration.
    pub fn config(&self) -> Result<BoardConfig> {
        BoardConfig::load(&self.board_dir())
    }

    /// Load the snapshot, falling back to an empty board when it is malformed.
    pub fn load(&self) -> Result<Vec<Task>> {
        self.load_or(Vec::new())
    }

    /// Load the snapshot, falling back to `default` when the file is missing
    /// or malformed. A malformed file is renamed to `tasks.json.bad` so the
    /// next save does not overwrite it. Read failures are still errors.
    pub fn load_or(&self, default: Vec<Task>) -> Result<Vec<Task>> {
        let path = self.tasks_path();
        if !path.exists() {
            return Ok(default);
        }

        let content = fs::read_to_string(&path).context("Failed to read tasks.json")?;
        match parse_snapshot(&content) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                let bad_path = self.board_dir().join(TASKS_BAD_FILE);
                log::warn!("Ignoring {}: {:#}", path.display(), e);
                if let Err(e) = fs::rename(&path, &bad_path) {
                    log::warn!("Failed to set aside {}: {}", path.display(), e);
                } else {
                    log::warn!("Kept unreadable snapshot as {}", bad_path.display());
                }
                Ok(default)
            }
        }
    }

    /// Load the snapshot into a store that writes itself back after every
    /// mutation.
    pub fn open_store(&self) -> Result<TaskStore> {
        let mut store = TaskStore::from_tasks(self.load()?);
        let storage = self.clone();
        store.on_change(move |tasks| {
            if let Err(e) = storage.save(tasks) {
                log::warn!("Failed to persist board: {:#}", e);
            }
        });
        Ok(store)
    }

    /// Replace the snapshot with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let tmp_path = self.board_dir().join(TASKS_TMP_FILE);
        let json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;

        let mut file = File::create(&tmp_path).context("Failed to create tasks.json.tmp")?;
        writeln!(file, "{}", json).context("Failed to write tasks.json.tmp")?;
        file.sync_all().context("Failed to sync tasks.json.tmp")?;

        fs::rename(&tmp_path, self.tasks_path()).context("Failed to replace tasks.json")?;
        log::debug!("Saved {} task(s) to {}", tasks.len(), self.tasks_path().display());

        Ok(())
    }
}

/// Parse a snapshot. Any record with the wrong shape, or a collection that
/// breaks id uniqueness or lane density, discards the whole snapshot in
/// favour of `default`.
pub fn restore(json: &str, default: Vec<Task>) -> Vec<Task> {
    parse_snapshot(json).unwrap_or_else(|e| {
        log::warn!("Ignoring snapshot: {:#}", e);
        default
    })
}

fn parse_snapshot(json: &str) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(json).context("Malformed snapshot")?;
    validate_tasks(&tasks).context("Inconsistent snapshot")?;
    Ok(tasks)
}
