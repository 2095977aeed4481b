use super::StatePersistence;
use crate::error::{LeadboardError, Result};
use crate::state::PersistedViewState;
use std::fs;
use std::path::{Path, PathBuf};

pub const STATE_FILENAME: &str = "leadboard-app-store.json";

/// View state persisted as a single JSON record inside the data directory.
pub struct FileStatePersistence {
    root: PathBuf,
}

impl FileStatePersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(STATE_FILENAME)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(LeadboardError::Io)?;
        }
        Ok(())
    }
}

impl StatePersistence for FileStatePersistence {
    fn load(&self) -> Result<Option<PersistedViewState>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(LeadboardError::Io)?;
        let state = serde_json::from_str(&content).map_err(|e| {
            LeadboardError::State(format!("{} is not a valid state file: {}", path.display(), e))
        })?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &PersistedViewState) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(state).map_err(LeadboardError::Serialization)?;
        fs::write(self.path(), content).map_err(LeadboardError::Io)?;
        Ok(())
    }
}
