//! # Storage Layer
//!
//! Two storage concerns live here, each behind a trait so the layers above never
//! know which backend they are talking to:
//!
//! - [`DataSource`]: read-only access to the full `Lead` and `Campaign`
//!   collections. This stands in for a remote API. The query layer never writes
//!   through it.
//! - [`StatePersistence`]: durable storage for the persisted subset of the view
//!   state (see [`crate::state::PersistedViewState`]).
//!
//! ## Implementations
//!
//! - [`memory::InMemorySource`]: the static seed data, validated on load
//! - [`memory::InMemoryStatePersistence`]: shared in-memory record, for tests
//!   and for simulating restarts
//! - [`fs::FileStatePersistence`]: production JSON file
//!
//! ```text
//! <data dir>/
//! ├── config.json                # LeadboardConfig
//! └── leadboard-app-store.json   # persisted view state
//! ```
//!
//! ## Failure
//!
//! Both `DataSource` methods return `Result` even though the seed cannot fail.
//! A networked source reports [`QueryError::SourceUnavailable`] through the same
//! signature, so callers' success paths stay unchanged.

use crate::error::{QueryError, Result};
use crate::model::{Campaign, Lead};
use crate::state::PersistedViewState;
use std::sync::Arc;

pub mod fs;
pub mod memory;

/// Read-only access to the lead and campaign collections.
///
/// Implementations return records in a stable order; list queries preserve it.
pub trait DataSource: Send + Sync {
    fn leads(&self) -> std::result::Result<Vec<Lead>, QueryError>;

    fn campaigns(&self) -> std::result::Result<Vec<Campaign>, QueryError>;
}

impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn leads(&self) -> std::result::Result<Vec<Lead>, QueryError> {
        (**self).leads()
    }

    fn campaigns(&self) -> std::result::Result<Vec<Campaign>, QueryError> {
        (**self).campaigns()
    }
}

/// Durable home for the persisted view-state record.
pub trait StatePersistence {
    /// Load the record, `None` if nothing has been persisted yet.
    fn load(&self) -> Result<Option<PersistedViewState>>;

    /// Replace the persisted record.
    fn save(&mut self, state: &PersistedViewState) -> Result<()>;
}
