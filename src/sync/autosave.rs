//! Debounced autosave
//!
//! A timer that resets on every mutation and persists one snapshot after a
//! quiet period, so a burst of edits collapses into a single save. A manual
//! flush saves immediately and supersedes any pending debounced save (last
//! write wins). Save failures are logged and reported; the in-memory store
//! stays authoritative for the next trigger.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time;
use tracing::{debug, warn};

use crate::history::HistoryStore;

use super::{Credential, HistoryBackend, SyncResult};

/// Quiet period after the last mutation before an automatic save fires
pub const AUTOSAVE_QUIET_PERIOD: Duration = Duration::from_secs(2);

enum Signal {
    Touch,
    Flush(oneshot::Sender<SyncResult<()>>),
}

/// Handle to the background saver task
#[derive(Clone)]
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Signal>,
    last_saved: Arc<std::sync::Mutex<Option<DateTime<Utc>>>>,
}

impl Autosaver {
    /// Spawn the saver task over a shared store and backend
    pub fn spawn(
        store: Arc<Mutex<HistoryStore>>,
        backend: Arc<dyn HistoryBackend>,
        credential: Credential,
        quiet: Duration,
    ) -> Self {
        let last_saved = Arc::new(std::sync::Mutex::new(None));
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, store, backend, credential, quiet, last_saved.clone()));
        Self { tx, last_saved }
    }

    /// Note that a mutation happened; (re)starts the quiet timer
    pub fn touch(&self) {
        if self.tx.send(Signal::Touch).is_err() {
            warn!("autosave task is gone; mutation will not be persisted automatically");
        }
    }

    /// Save right now and report the result
    pub async fn flush(&self) -> SyncResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Signal::Flush(ack_tx)).is_err() {
            warn!("autosave task is gone; manual save skipped");
            return Ok(());
        }
        ack_rx.await.unwrap_or(Ok(()))
    }

    /// Completion time of the most recent successful save
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.lock().expect("last_saved lock poisoned")
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Signal>,
    store: Arc<Mutex<HistoryStore>>,
    backend: Arc<dyn HistoryBackend>,
    credential: Credential,
    quiet: Duration,
    last_saved: Arc<std::sync::Mutex<Option<DateTime<Utc>>>>,
) {
    while let Some(signal) = rx.recv().await {
        match signal {
            Signal::Flush(ack) => {
                let _ = ack.send(save(&store, &*backend, &credential, &last_saved).await);
            }
            Signal::Touch => {
                // Debounce: every further touch restarts the quiet timer; a
                // flush saves immediately and absorbs the pending timer
                loop {
                    let timer = time::sleep(quiet);
                    tokio::pin!(timer);
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(Signal::Touch) => continue,
                            Some(Signal::Flush(ack)) => {
                                let _ = ack
                                    .send(save(&store, &*backend, &credential, &last_saved).await);
                                break;
                            }
                            None => {
                                // Channel closed with a dirty store: final save
                                let _ = save(&store, &*backend, &credential, &last_saved).await;
                                return;
                            }
                        },
                        _ = &mut timer => {
                            let _ = save(&store, &*backend, &credential, &last_saved).await;
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn save(
    store: &Mutex<HistoryStore>,
    backend: &dyn HistoryBackend,
    credential: &Credential,
    last_saved: &std::sync::Mutex<Option<DateTime<Utc>>>,
) -> SyncResult<()> {
    let snapshot = store.lock().await.clone();
    match backend.save(credential, &snapshot).await {
        Ok(()) => {
            *last_saved.lock().expect("last_saved lock poisoned") = Some(Utc::now());
            debug!(
                days = snapshot.days_tracked(),
                backend = %backend.describe(),
                "history snapshot saved"
            );
            Ok(())
        }
        Err(e) => {
            warn!("history save failed: {e}; in-memory state retained");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::sync::SyncError;

    #[derive(Default)]
    struct CountingBackend {
        saves: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl HistoryBackend for CountingBackend {
        async fn load(&self, _credential: &Credential) -> SyncResult<HistoryStore> {
            Ok(HistoryStore::new())
        }

        async fn save(
            &self,
            _credential: &Credential,
            _history: &HistoryStore,
        ) -> SyncResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SyncError::MissingCredential);
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn describe(&self) -> String {
            "test".to_string()
        }
    }

    fn setup(quiet: Duration) -> (Autosaver, Arc<CountingBackend>) {
        let store = Arc::new(Mutex::new(HistoryStore::new()));
        let backend = Arc::new(CountingBackend::default());
        let saver = Autosaver::spawn(store, backend.clone(), Credential::Offline, quiet);
        (saver, backend)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_save() {
        let (saver, backend) = setup(Duration::from_secs(2));

        saver.touch();
        saver.touch();
        saver.touch();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
        assert!(saver.last_saved().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touches_keep_resetting_the_timer() {
        let (saver, backend) = setup(Duration::from_secs(2));

        for _ in 0..5 {
            saver.touch();
            time::sleep(Duration::from_secs(1)).await;
            assert_eq!(backend.saves.load(Ordering::SeqCst), 0);
        }

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_supersedes_pending_debounce() {
        let (saver, backend) = setup(Duration::from_secs(2));

        saver.touch();
        saver.flush().await.unwrap();
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);

        // The absorbed timer must not fire a second save
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported_and_retried_on_next_trigger() {
        let (saver, backend) = setup(Duration::from_secs(2));

        backend.fail.store(true, Ordering::SeqCst);
        assert!(saver.flush().await.is_err());
        assert!(saver.last_saved().is_none());

        backend.fail.store(false, Ordering::SeqCst);
        saver.flush().await.unwrap();
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
        assert!(saver.last_saved().is_some());
    }
}
