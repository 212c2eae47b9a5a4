//! In-memory session store keyed by session token.

use std::collections::{hash_map::Entry, HashMap};
use tokio::sync::RwLock;

/// Per-client authentication state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientSession {
    pub authenticated: bool,
}

impl ClientSession {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            authenticated: false,
        }
    }

    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            authenticated: true,
        }
    }
}

/// Maps session tokens to their [`ClientSession`].
///
/// Reads share the lock, writes hold it exclusively for a single map access.
/// Sessions are only ever replaced as whole values, never removed.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ClientSession>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &str) -> Option<ClientSession> {
        self.sessions.read().await.get(token).copied()
    }

    /// Insert or overwrite the session stored under `token`.
    pub async fn put(&self, token: &str, session: ClientSession) {
        self.sessions
            .write()
            .await
            .insert(token.to_string(), session);
    }

    /// Insert `session` only if `token` is not taken yet.
    ///
    /// The lookup and the insert happen under the same write guard, so a token
    /// can never end up shared by two sessions. Returns `false` on collision.
    pub async fn insert_new(&self, token: &str, session: ClientSession) -> bool {
        match self.sessions.write().await.entry(token.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(session);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn get_missing_token_returns_none() {
        let store = SessionStore::new();
        assert_eq!(store.get("missing").await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_overwrites_whole_session() {
        let store = SessionStore::new();
        store.put("token", ClientSession::anonymous()).await;
        store.put("token", ClientSession::authenticated()).await;
        assert_eq!(store.get("token").await, Some(ClientSession::authenticated()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn insert_new_refuses_taken_token() {
        let store = SessionStore::new();
        assert!(store.insert_new("token", ClientSession::authenticated()).await);
        assert!(!store.insert_new("token", ClientSession::anonymous()).await);
        assert_eq!(store.get("token").await, Some(ClientSession::authenticated()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_insert_new_admits_exactly_one_writer() {
        let store = Arc::new(SessionStore::new());
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.insert_new("shared", ClientSession::anonymous()).await
            }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap_or(false) {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.len().await, 1);
    }
}
