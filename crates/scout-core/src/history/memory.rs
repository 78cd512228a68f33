//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::{ConversationStore, Result, Role, SessionId, TRACING_TARGET, Turn};

type SessionLog = Arc<Mutex<Vec<Turn>>>;

/// Process-local conversation store.
///
/// The outer map lock is only held long enough to look up or insert a
/// session entry; appends then lock the single session, so sessions never
/// contend with each other. Clearing a session empties its log in place,
/// so an append that already holds the log is never lost.
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionLog>>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sessions the store has seen.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, session_id: SessionId) -> SessionLog {
        if let Some(log) = self.sessions.read().await.get(&session_id) {
            return log.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id).or_default().clone()
    }
}

impl std::fmt::Debug for InMemoryConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryConversationStore")
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, session_id: SessionId, role: Role, content: &str) -> Result<()> {
        let log = self.session(session_id).await;
        let mut turns = log.lock().await;
        turns.push(Turn::new(role, content));

        tracing::trace!(
            target: TRACING_TARGET,
            session_id = %session_id,
            role = %role,
            turns = turns.len(),
            "Appended turn"
        );

        Ok(())
    }

    async fn read(&self, session_id: SessionId, max: usize) -> Result<Vec<Turn>> {
        let Some(log) = self.sessions.read().await.get(&session_id).cloned() else {
            return Ok(Vec::new());
        };

        let turns = log.lock().await;
        let skip = turns.len().saturating_sub(max);
        Ok(turns[skip..].to_vec())
    }

    async fn clear(&self, session_id: SessionId) -> Result<()> {
        let Some(log) = self.sessions.read().await.get(&session_id).cloned() else {
            return Ok(());
        };

        log.lock().await.clear();
        tracing::trace!(target: TRACING_TARGET, session_id = %session_id, "Cleared session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_returns_recent_turns_oldest_first() {
        let store = InMemoryConversationStore::new();
        let session = SessionId::new();

        for i in 0..5 {
            store
                .append(session, Role::User, &format!("message {i}"))
                .await
                .unwrap();
        }

        let turns = store.read(session, 2).await.unwrap();
        let contents: Vec<_> = turns.iter().map(|t| t.content()).collect();
        assert_eq!(contents, vec!["message 3", "message 4"]);
    }

    #[tokio::test]
    async fn unknown_session_is_empty() {
        let store = InMemoryConversationStore::new();
        assert!(store.read(SessionId::new(), 10).await.unwrap().is_empty());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn clear_empties_session() {
        let store = InMemoryConversationStore::new();
        let session = SessionId::new();
        store.append(session, Role::User, "hello").await.unwrap();

        store.clear(session).await.unwrap();

        assert!(store.read(session, 10).await.unwrap().is_empty());
        store.clear(SessionId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn append_racing_clear_is_kept() {
        let store = InMemoryConversationStore::new();
        let session = SessionId::new();
        store.append(session, Role::User, "before").await.unwrap();

        // An append that resolved its log before the clear ran.
        let log = store.session(session).await;
        store.clear(session).await.unwrap();
        log.lock().await.push(Turn::new(Role::User, "in flight"));

        let turns = store.read(session, 10).await.unwrap();
        let contents: Vec<_> = turns.iter().map(|t| t.content()).collect();
        assert_eq!(contents, vec!["in flight"]);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sessions_do_not_lose_appends() {
        let store = InMemoryConversationStore::new();
        let sessions: Vec<SessionId> = (0..8).map(|_| SessionId::new()).collect();

        let mut handles = Vec::new();
        for session in sessions.clone() {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    store
                        .append(session, Role::User, &i.to_string())
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for session in sessions {
            assert_eq!(store.read(session, usize::MAX).await.unwrap().len(), 25);
        }
        assert_eq!(store.session_count().await, 8);
    }
}
