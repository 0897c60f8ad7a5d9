use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use exam_core::model::AttemptDraft;
use storage::repository::AttemptRepository;

/// Indicator shown next to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Saving,
    /// The last write failed; cleared by the next successful one.
    Failed,
}

/// Debounced, best-effort draft writer.
///
/// Only the newest draft is kept: scheduling again before the debounce window
/// elapses replaces the pending draft and restarts the window.
pub struct AutoSaver {
    writer: Arc<Writer>,
    pending: watch::Sender<Option<AttemptDraft>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaver {
    /// Spawn the writer task on the current tokio runtime.
    ///
    /// The task stops when `cancel` fires or the saver is dropped.
    #[must_use]
    pub fn spawn(
        repo: Arc<dyn AttemptRepository>,
        debounce: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (pending, rx) = watch::channel(None);
        let (status, _) = watch::channel(SaveStatus::Saved);
        let writer = Arc::new(Writer {
            repo,
            status,
            last_saved: Mutex::new(None),
        });
        let task = tokio::spawn(run(Arc::clone(&writer), debounce, rx, cancel.clone()));
        Self {
            writer,
            pending,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Queue `draft`; the indicator switches to `Saving` right away.
    pub fn schedule(&self, draft: AttemptDraft) {
        self.pending.send_replace(Some(draft));
        self.writer.status.send_replace(SaveStatus::Saving);
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        *self.writer.status.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.writer.status.subscribe()
    }

    /// Drop any pending draft and wait for the writer to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "auto-save task ended abnormally");
            }
        }
    }

    /// Stop the writer, then store the newest draft once if it was never
    /// written. Failures are logged.
    pub async fn flush_and_shutdown(&self) {
        self.shutdown().await;
        let latest = self.pending.borrow().clone();
        let Some(draft) = latest else {
            return;
        };
        if self.writer.is_saved(&draft) {
            return;
        }
        if self.writer.write(draft).await {
            self.writer.status.send_replace(SaveStatus::Saved);
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Writer {
    repo: Arc<dyn AttemptRepository>,
    status: watch::Sender<SaveStatus>,
    last_saved: Mutex<Option<AttemptDraft>>,
}

impl Writer {
    fn is_saved(&self, draft: &AttemptDraft) -> bool {
        self.last_saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(draft)
    }

    /// Returns true once the draft is stored.
    async fn write(&self, draft: AttemptDraft) -> bool {
        match self.repo.save_draft(&draft).await {
            Ok(()) => {
                debug!(practice_id = %draft.practice_id, "draft saved");
                *self
                    .last_saved
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(draft);
                true
            }
            Err(err) => {
                warn!(practice_id = %draft.practice_id, error = %err, "auto-save failed");
                self.status.send_replace(SaveStatus::Failed);
                false
            }
        }
    }
}

async fn run(
    writer: Arc<Writer>,
    debounce: Duration,
    mut pending: watch::Receiver<Option<AttemptDraft>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            changed = pending.changed() => if changed.is_err() { return },
        }

        // Quiet period: every newer draft restarts it.
        loop {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = tokio::time::sleep(debounce) => break,
                changed = pending.changed() => if changed.is_err() { return },
            }
        }

        let Some(draft) = pending.borrow_and_update().clone() else {
            continue;
        };

        let saved = tokio::select! {
            () = cancel.cancelled() => return,
            saved = writer.write(draft) => saved,
        };
        // A newer draft keeps the indicator on `Saving`.
        if saved && !pending.has_changed().unwrap_or(false) {
            writer.status.send_replace(SaveStatus::Saved);
        }
    }
}
