//! Persistence and synchronization
//!
//! The engine owns its history in memory; these collaborators move whole
//! snapshots in and out of durable storage. A failed save or load is
//! reported, never fatal: the in-memory store stays authoritative until
//! the next successful write.

pub mod autosave;
pub mod local;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

use crate::history::HistoryStore;

pub use autosave::{Autosaver, AUTOSAVE_QUIET_PERIOD};
pub use local::LocalStore;
pub use remote::{AuthSession, AuthUser, RemoteStore};

/// Synchronization error types
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Storage connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Remote sync requires a login token")]
    MissingCredential,
}

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// How the session was obtained. The engine treats both kinds equally; a
/// backend may require one or the other.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Local-only session, nothing leaves the machine
    Offline,
    /// Bearer token from a login or registration
    Token(String),
}

impl Credential {
    pub fn mode(&self) -> &'static str {
        match self {
            Credential::Offline => "local",
            Credential::Token(_) => "online",
        }
    }
}

/// Whole-snapshot persistence: `save` overwrites everything previously
/// stored and `load` returns an empty store when nothing exists yet.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    async fn load(&self, credential: &Credential) -> SyncResult<HistoryStore>;
    async fn save(&self, credential: &Credential, history: &HistoryStore) -> SyncResult<()>;

    /// Human-readable target for logs and the status tool
    fn describe(&self) -> String;
}
