//! # Editor State
//!
//! Holds the one invoice currently under review and debounces draft saves.
//!
//! ## Thread Safety
//! The session sits behind a `tokio::sync::Mutex`. Every edit is applied
//! (and totals recomputed) while the lock is held, so no request ever sees
//! an invoice whose totals lag behind its items.
//!
//! ## Debounced Auto-Save
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  edit ──► generation = 1 ──► spawn(sleep 1s) ──► gen still 1? ──► no   │
//! │  edit ──► generation = 2 ──► spawn(sleep 1s) ──► gen still 2? ──► save │
//! │                                                                         │
//! │  save / discard / open ──► generation += 1   (pending saves drop out)  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use paylance_core::editor::EditSession;
use paylance_core::Invoice;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// The editing session plus its auto-save timer.
///
/// Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct EditorState {
    session: Arc<Mutex<Option<EditSession>>>,
    generation: Arc<AtomicU64>,
    autosave_delay: Duration,
}

impl EditorState {
    pub fn new(autosave_delay: Duration) -> Self {
        EditorState {
            session: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            autosave_delay,
        }
    }

    /// Exclusive access to the session slot.
    pub async fn lock(&self) -> MutexGuard<'_, Option<EditSession>> {
        self.session.lock().await
    }

    /// A copy of the invoice under review, if any.
    pub async fn snapshot(&self) -> Option<Invoice> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.invoice().clone())
    }

    /// Replaces the current session and schedules a draft save for it.
    pub async fn open(&self, session: EditSession) -> Invoice {
        let invoice = session.invoice().clone();
        *self.session.lock().await = Some(session);
        self.schedule_autosave();
        invoice
    }

    /// Restores a session without writing a draft (it came from one).
    pub async fn restore(&self, session: EditSession) {
        self.cancel_autosave();
        *self.session.lock().await = Some(session);
    }

    /// Removes the current session, dropping any pending save.
    pub async fn close(&self) -> Option<EditSession> {
        self.cancel_autosave();
        self.session.lock().await.take()
    }

    /// Saves the draft after the quiet period unless another edit arrives.
    pub fn schedule_autosave(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(state.autosave_delay).await;

            if state.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "Draft save superseded");
                return;
            }

            let guard = state.session.lock().await;
            if let Some(session) = guard.as_ref() {
                match session.save_draft().await {
                    Ok(()) => debug!(generation, "Draft saved"),
                    Err(e) => warn!("Failed to save draft: {}", e),
                }
            }
        });
    }

    /// Invalidates any scheduled save.
    pub fn cancel_autosave(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use paylance_core::editor::{InvoiceEdit, SessionStores};

    const DELAY: Duration = Duration::from_millis(20);

    async fn settle() {
        tokio::time::sleep(DELAY * 5).await;
    }

    #[tokio::test]
    async fn test_autosave_after_quiet_period() {
        let stores = SessionStores::in_memory();
        let editor = EditorState::new(DELAY);
        editor.open(EditSession::blank(stores.clone())).await;

        {
            let mut guard = editor.lock().await;
            let session = guard.as_mut().unwrap();
            session
                .apply(InvoiceEdit::SetTaxRate { value: 8.0 })
                .unwrap();
        }
        editor.schedule_autosave();
        settle().await;

        let draft = stores.drafts.load().await.unwrap().unwrap();
        assert_eq!(draft.tax_rate(), 8.0);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_save() {
        let stores = SessionStores::in_memory();
        let editor = EditorState::new(DELAY);
        editor.open(EditSession::blank(stores.clone())).await;

        let closed = editor.close().await;
        assert!(closed.is_some());
        settle().await;

        assert!(stores.drafts.load().await.unwrap().is_none());
        assert!(editor.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_restore_does_not_write() {
        let stores = SessionStores::in_memory();
        let editor = EditorState::new(DELAY);
        editor.restore(EditSession::blank(stores.clone())).await;
        settle().await;

        assert!(stores.drafts.load().await.unwrap().is_none());
        assert!(editor.snapshot().await.is_some());
    }
}
