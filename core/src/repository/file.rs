use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::snapshot::StoreSnapshot;
use crate::repository::record::{decode, encode};
use crate::repository::traits::StateRepository;

pub const DEFAULT_DIR_NAME: &str = ".brief";
pub const DEFAULT_FILE_NAME: &str = "brief-light-storage.json";

#[derive(Clone, Debug)]
pub struct FileStateRepository {
    file_path: PathBuf,
}

impl FileStateRepository {
    /// Stores state in `base_dir`, or `~/.brief` when none is given.
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(DEFAULT_DIR_NAME)
            }
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("Could not create data directory {}", path.display()))?;
        path.push(DEFAULT_FILE_NAME);

        Ok(FileStateRepository { file_path: path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl StateRepository for FileStateRepository {
    fn load(&self, loaded_at: DateTime<Utc>) -> Result<Option<StoreSnapshot>> {
        if !self.file_path.exists() {
            debug!(path = %self.file_path.display(), "no saved state yet");
            return Ok(None);
        }
        let json = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Could not read {}", self.file_path.display()))?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        decode(&json, loaded_at).map(Some)
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let json = encode(snapshot)?;

        // Write a sibling file and swap it in so a crash never leaves half a
        // snapshot behind.
        let tmp_path = self.file_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Could not write {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(json.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.file_path)
            .with_context(|| format!("Could not replace {}", self.file_path.display()))?;

        debug!(path = %self.file_path.display(), tasks = snapshot.len(), "state saved");
        Ok(())
    }
}
