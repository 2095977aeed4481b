use crate::api::LeadboardApi;
use crate::config::LeadboardConfig;
use crate::error::{LeadboardError, Result};
use crate::query::QueryClient;
use crate::state::ViewStateStore;
use crate::store::fs::FileStatePersistence;
use crate::store::memory::InMemorySource;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the platform data directory when set.
pub const HOME_ENV: &str = "LEADBOARD_HOME";

pub type FileApi = LeadboardApi<InMemorySource, FileStatePersistence>;

pub struct LeadboardContext {
    pub api: FileApi,
    pub config: LeadboardConfig,
    pub data_dir: PathBuf,
}

/// `$LEADBOARD_HOME` if set and non-empty, else the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "leadboard", "leadboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| LeadboardError::Config("Could not determine data directory".into()))
}

/// Load config and persisted view state from `data_dir` and build the API over the seed data.
pub fn initialize(data_dir: &Path) -> Result<LeadboardContext> {
    debug!(data_dir = %data_dir.display(), "initializing");
    let config = LeadboardConfig::load(data_dir)?;

    let source = InMemorySource::seeded()?;
    let queries = QueryClient::new(source, config.clone());
    let view = ViewStateStore::restore(FileStatePersistence::new(data_dir))?;

    Ok(LeadboardContext {
        api: LeadboardApi::new(queries, view),
        config,
        data_dir: data_dir.to_path_buf(),
    })
}
