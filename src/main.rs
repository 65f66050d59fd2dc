//! SYSTEM OS
//!
//! An MCP server for daily nutrition, hydration, and habit tracking.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use systemos::build_info;
use systemos::coach::Coach;
use systemos::history::HistoryStore;
use systemos::mcp::SystemOsService;
use systemos::models::{Catalog, Goals};
use systemos::sync::{
    Autosaver, Credential, HistoryBackend, LocalStore, RemoteStore, AUTOSAVE_QUIET_PERIOD,
};
use systemos::tools::Session;

/// Get the local database path from environment or use default
fn get_data_path() -> PathBuf {
    std::env::var("SYSTEMOS_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("systemos.db");
            path
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("systemos=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Online mode when a sync server is configured, local fallback otherwise
    let (backend, credential, history): (Arc<dyn HistoryBackend>, Credential, HistoryStore) =
        match std::env::var("SYSTEMOS_API_URL") {
            Ok(api_url) => {
                let username = std::env::var("SYSTEMOS_USERNAME")
                    .map_err(|_| "SYSTEMOS_USERNAME is required when SYSTEMOS_API_URL is set")?;
                let password = std::env::var("SYSTEMOS_PASSWORD")
                    .map_err(|_| "SYSTEMOS_PASSWORD is required when SYSTEMOS_API_URL is set")?;

                eprintln!("Online mode; sync server: {}", api_url);
                let remote = RemoteStore::new(api_url);
                let auth = remote.login(&username, &password).await?;
                eprintln!(
                    "Logged in as {} ({} days of history)",
                    auth.user.username,
                    auth.history.days_tracked()
                );
                (Arc::new(remote), Credential::Token(auth.token), auth.history)
            }
            Err(_) => {
                let db_path = get_data_path();
                eprintln!("Offline mode; local store: {}", db_path.display());

                // Ensure data directory exists
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let local = LocalStore::open(&db_path)?;
                eprintln!("Database schema version: {}", local.schema_version()?);

                let history = local.load(&Credential::Offline).await?;
                eprintln!("Loaded {} days of history", history.days_tracked());
                (Arc::new(local), Credential::Offline, history)
            }
        };

    // Shared state: in-memory store plus the debounced saver over it
    let store = Arc::new(Mutex::new(history));
    let autosave = Autosaver::spawn(
        store.clone(),
        backend.clone(),
        credential.clone(),
        AUTOSAVE_QUIET_PERIOD,
    );
    let session = Session::new(
        store,
        Catalog::standard(),
        Goals::standard(),
        autosave,
        credential,
        backend,
    );

    let coach = std::env::var("SYSTEMOS_COACH_URL").ok().map(Coach::new);
    if coach.is_none() {
        eprintln!("Coach endpoint not configured (SYSTEMOS_COACH_URL); ask_coach disabled");
    }

    // Create the service
    let service = SystemOsService::new(session, coach);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
