use super::{CheckpointError, CheckpointResult, CheckpointStore, SiteCheckpoint};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Checkpoint store keeping `<dir>/<site>.json` files
///
/// Saves go to a temp file in the same directory which is then linked into
/// place without overwriting, so a crash never leaves a partial checkpoint.
pub struct JsonCheckpointStore {
    dir: PathBuf,
}

impl JsonCheckpointStore {
    /// Opens (and creates if needed) a checkpoint directory
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory that holds one file per completed site
    ///
    /// # Returns
    ///
    /// * `Ok(JsonCheckpointStore)` - Store rooted at `dir`
    /// * `Err(CheckpointError)` - The directory could not be created
    pub fn new(dir: impl AsRef<Path>) -> CheckpointResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, site: &str) -> CheckpointResult<PathBuf> {
        let valid = !site.is_empty()
            && site
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CheckpointError::InvalidSiteName(site.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", site)))
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self, site: &str) -> CheckpointResult<Option<SiteCheckpoint>> {
        let path = self.path_for(site)?;
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let checkpoint = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(checkpoint))
    }

    fn save(&self, checkpoint: &SiteCheckpoint) -> CheckpointResult<()> {
        let path = self.path_for(&checkpoint.site)?;

        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, checkpoint)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                CheckpointError::AlreadyExists(checkpoint.site.clone())
            } else {
                CheckpointError::Io(e.error)
            }
        })?;

        tracing::debug!("Checkpoint written to {}", path.display());
        Ok(())
    }

    fn contains(&self, site: &str) -> CheckpointResult<bool> {
        Ok(self.path_for(site)?.is_file())
    }

    fn remove(&self, site: &str) -> CheckpointResult<bool> {
        let path = self.path_for(site)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> CheckpointResult<Vec<String>> {
        let mut sites = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                sites.push(stem.to_string());
            }
        }
        sites.sort();
        Ok(sites)
    }
}
