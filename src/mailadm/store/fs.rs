use super::DataStore;
use crate::error::{MailAdmError, Result};
use crate::model::Dataset;
use crate::seed;
use std::fs;
use std::path::{Path, PathBuf};

const DATA_FILENAME: &str = "dataset.json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_file(&self) -> PathBuf {
        self.root.join(DATA_FILENAME)
    }

    pub fn exists(&self) -> bool {
        self.data_file().exists()
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(MailAdmError::Io)?;
        }
        Ok(())
    }
}

impl DataStore for FileStore {
    /// Reads the snapshot, falling back to seed data when there is none yet.
    fn load(&self) -> Result<Dataset> {
        let path = self.data_file();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no dataset yet, using seed data");
            return Ok(seed::dataset());
        }

        let content = fs::read_to_string(&path).map_err(MailAdmError::Io)?;
        let data: Dataset = serde_json::from_str(&content).map_err(|e| {
            MailAdmError::Store(format!("{} is not a valid dataset: {}", path.display(), e))
        })?;
        Ok(data)
    }

    fn save(&mut self, data: &Dataset) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(data).map_err(MailAdmError::Serialization)?;
        fs::write(self.data_file(), content).map_err(MailAdmError::Io)?;
        tracing::debug!(path = %self.data_file().display(), "dataset saved");
        Ok(())
    }
}
