// JSON file backend: one `{key}.json` file per collection

use crate::models::Item;
use crate::storage::{self, Storage};
use eyre::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stores the collection as a JSON array in `<dir>/<key>.json`.
///
/// Readers take a shared lock and writers an exclusive lock on a sidecar
/// `<key>.lock` file. Writes go to a temp file that is renamed over the
/// blob, so an interrupted save leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Open or create a file store in `dir` for the given key
    pub fn open<P: AsRef<Path>>(dir: P, key: &str) -> Result<Self> {
        storage::validate_key(key)?;

        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join(format!("{}.json", key)),
            lock_path: dir.join(format!("{}.lock", key)),
        })
    }

    /// Path of the JSON blob
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .context("Failed to open lock file")
    }
}

impl Storage for FileStore {
    fn load(&self) -> Result<Vec<Item>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No stored items yet");
            return Ok(Vec::new());
        }

        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock).context("Failed to acquire shared lock")?;

        let blob = fs::read_to_string(&self.path).context("Failed to read items file")?;
        let items = storage::decode(&blob)?;

        info!(path = ?self.path, count = items.len(), "Loaded items from file");
        // Lock is released when `lock` is dropped
        Ok(items)
    }

    fn save(&mut self, items: &[Item]) -> Result<()> {
        let blob = storage::encode(items)?;

        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock).context("Failed to acquire file lock")?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = File::create(&tmp_path).context("Failed to create temp file")?;
            tmp.write_all(blob.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path).context("Failed to replace items file")?;

        debug!(path = ?self.path, count = items.len(), "Saved items to file");
        Ok(())
    }
}
