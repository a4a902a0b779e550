//! Per-session conversation histories.
//!
//! Each chat session gets its own id and history; concurrent users of the
//! hosted UI never share agent memory.

use std::collections::HashMap;
use std::sync::Arc;

use rig::completion::Message;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Shared store mapping session ids to their conversation histories.
///
/// Histories live for the life of the process; there is no eviction. That is
/// adequate for a locally hosted demo UI, but a long-running multi-user
/// deployment would want a cap or idle-session expiry on top.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Vec<Message>>>>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the history for `id`, creating an empty one for new sessions.
    pub async fn history(&self, id: Uuid) -> Arc<Mutex<Vec<Message>>> {
        if let Some(history) = self.inner.read().await.get(&id) {
            return Arc::clone(history);
        }
        let mut guard = self.inner.write().await;
        Arc::clone(guard.entry(id).or_default())
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no session has started yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
