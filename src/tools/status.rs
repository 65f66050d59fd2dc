//! Status tool
//!
//! Runtime status of the running tracker: build info, process stats,
//! storage target, and store statistics.

use std::time::Instant;

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

use super::Session;

/// Snapshot of the running service
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
    /// "local" or "online"
    pub mode: &'static str,
    /// Persistence target
    pub storage: String,
    pub days_tracked: usize,
    pub earliest_date: Option<String>,
    pub level: u64,
    /// Completion time of the most recent successful save
    pub last_saved: Option<String>,
}

/// Tracks service start time for uptime reporting
pub struct StatusTracker {
    start_time: Instant,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Get the current status
    pub async fn get_status(&self, session: &Session) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        let store = session.store.lock().await;

        ServiceStatus {
            version: build_info.version,
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            mode: session.credential.mode(),
            storage: session.backend.describe(),
            days_tracked: store.days_tracked(),
            earliest_date: store.earliest_date().map(|d| d.to_string()),
            level: store.level(),
            last_saved: session
                .autosave
                .last_saved()
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
