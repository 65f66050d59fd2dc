//! SYSTEM OS tools module
//!
//! Tool implementations behind the MCP surface. Each tool is a plain
//! function over the shared [`Session`] returning a serializable response,
//! with errors reported as strings.

pub mod analytics;
pub mod days;
pub mod status;

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::history::HistoryStore;
use crate::models::{Catalog, Goals};
use crate::sync::{Autosaver, Credential, HistoryBackend};

/// Shared state for one running tracker
#[derive(Clone)]
pub struct Session {
    /// In-memory history; always the source of truth for reads
    pub store: Arc<Mutex<HistoryStore>>,
    pub catalog: Arc<Catalog>,
    pub goals: Goals,
    pub autosave: Autosaver,
    pub credential: Credential,
    pub backend: Arc<dyn HistoryBackend>,
}

impl Session {
    pub fn new(
        store: Arc<Mutex<HistoryStore>>,
        catalog: Catalog,
        goals: Goals,
        autosave: Autosaver,
        credential: Credential,
        backend: Arc<dyn HistoryBackend>,
    ) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            goals,
            autosave,
            credential,
            backend,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date argument
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.parse()
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {s}"))
}
