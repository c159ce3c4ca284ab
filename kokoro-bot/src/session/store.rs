//! In-memory session store with per-session exclusive access.

use crate::message::Message;
use crate::util::{generate_session_token, timestamp_ms};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Session behavior knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Maximum number of messages retained per session.
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_history: 50 }
    }
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<Message>,
    created_at: u64,
    last_accessed: u64,
}

impl SessionState {
    fn new() -> Self {
        let now = timestamp_ms();
        Self {
            messages: Vec::new(),
            created_at: now,
            last_accessed: now,
        }
    }

    fn touch(&mut self) {
        self.last_accessed = timestamp_ms();
    }
}

/// Exclusive-access handle to one session.
///
/// Obtained from [`SessionStore::resolve`]. All mutation goes through a
/// handle, so appending to a session that was never created cannot be
/// expressed. Each operation takes the session's own lock for the duration of
/// that operation only; callers must not hold results across a generator call
/// expecting them to stay current.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    token: String,
    state: Arc<Mutex<SessionState>>,
    max_history: usize,
}

impl SessionHandle {
    /// The session's opaque token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// A consistent copy of the history at the moment of the call.
    pub async fn snapshot(&self) -> Vec<Message> {
        let mut state = self.state.lock().await;
        state.touch();
        state.messages.clone()
    }

    /// Append messages as one atomic unit, then drop the oldest entries down
    /// to the history bound.
    ///
    /// A concurrent append to the same session waits; appends to other
    /// sessions proceed untouched. There is no partially-applied state a
    /// reader can observe.
    pub async fn append(&self, messages: impl IntoIterator<Item = Message>) {
        let mut state = self.state.lock().await;
        state.messages.extend(messages);
        if state.messages.len() > self.max_history {
            let excess = state.messages.len() - self.max_history;
            state.messages.drain(..excess);
        }
        state.touch();
    }

    /// Number of retained messages.
    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    /// Whether the session holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Milliseconds since the Unix epoch at which the session was created.
    pub async fn created_at(&self) -> u64 {
        self.state.lock().await.created_at
    }
}

/// Owns every live conversation for the process's lifetime.
///
/// The map itself is guarded by a [`RwLock`] taken only for lookup and
/// insertion; each session carries its own [`Mutex`] for history access, so
/// unrelated conversations never contend.
#[derive(Debug, Default)]
pub struct SessionStore {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    /// Create a store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with custom settings.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a token to a live session.
    ///
    /// A known token returns its existing session. An absent, unknown, or
    /// syntactically garbage token gets a brand-new empty session under a
    /// freshly generated token; it is never an error. The insertion happens
    /// under the map write lock, so a racing resolve cannot shadow it.
    pub async fn resolve(&self, requested: Option<&str>) -> SessionHandle {
        if let Some(token) = requested {
            let sessions = self.sessions.read().await;
            if let Some(state) = sessions.get(token) {
                debug!(token = %token, "resolved existing session");
                return self.handle(token.to_string(), Arc::clone(state));
            }
        }

        let token = generate_session_token();
        let mut sessions = self.sessions.write().await;
        let state = Arc::clone(
            sessions
                .entry(token.clone())
                .or_insert_with(|| Arc::new(Mutex::new(SessionState::new()))),
        );
        drop(sessions);
        debug!(token = %token, "created session");
        self.handle(token, state)
    }

    /// Look up a session without creating one.
    pub async fn get(&self, token: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .map(|state| self.handle(token.to_string(), Arc::clone(state)))
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove sessions untouched for longer than `ttl_ms`.
    ///
    /// Returns how many were removed. A session whose lock is currently held
    /// is in the middle of a request and therefore not idle; it is skipped.
    pub async fn remove_idle(&self, ttl_ms: u64) -> usize {
        let now = timestamp_ms();
        let mut sessions = self.sessions.write().await;
        let expired: Vec<String> = sessions
            .iter()
            .filter_map(|(token, state)| {
                let state = state.try_lock().ok()?;
                (now.saturating_sub(state.last_accessed) > ttl_ms).then(|| token.clone())
            })
            .collect();
        for token in &expired {
            sessions.remove(token);
            debug!(token = %token, "removed idle session");
        }
        expired.len()
    }

    fn handle(&self, token: String, state: Arc<Mutex<SessionState>>) -> SessionHandle {
        SessionHandle {
            token,
            state,
            max_history: self.config.max_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_without_token_creates_session() {
        let store = SessionStore::new();
        let session = store.resolve(None).await;

        assert!(!session.token().is_empty());
        assert!(session.is_empty().await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_resolve_known_token_reuses_session() {
        let store = SessionStore::new();
        let first = store.resolve(None).await;
        first.append([Message::user("Hello")]).await;

        let again = store.resolve(Some(first.token())).await;
        assert_eq!(again.token(), first.token());
        assert_eq!(again.len().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token_gets_fresh_token() {
        let store = SessionStore::new();
        let session = store.resolve(Some("no-such-session")).await;

        assert_ne!(session.token(), "no-such-session");
        assert!(store.get("no-such-session").await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_append_truncates_oldest_first() {
        let store = SessionStore::with_config(SessionConfig { max_history: 4 });
        let session = store.resolve(None).await;

        for i in 0..4 {
            session
                .append([
                    Message::user(format!("u{i}")),
                    Message::assistant(format!("r{i}")),
                ])
                .await;
        }

        let messages = session.snapshot().await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "u2");
        assert_eq!(messages[3].content, "r3");
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let store = SessionStore::new();
        let a = store.resolve(None).await;
        let b = store.resolve(None).await;

        a.append([Message::user("only in a")]).await;

        assert_eq!(a.len().await, 1);
        assert!(b.is_empty().await);
        assert_ne!(a.token(), b.token());
    }

    #[tokio::test]
    async fn test_remove_idle_reaps_untouched_sessions() {
        let store = SessionStore::new();
        let stale = store.resolve(None).await;
        let stale_token = stale.token().to_string();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let fresh = store.resolve(None).await;
        fresh.append([Message::user("hi")]).await;

        let removed = store.remove_idle(20).await;
        assert_eq!(removed, 1);
        assert!(store.get(&stale_token).await.is_none());
        assert!(store.get(fresh.token()).await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_one_session_interleave_whole() {
        let store = Arc::new(SessionStore::new());
        let session = store.resolve(None).await;

        let mut tasks = Vec::new();
        for i in 0..16 {
            let handle = session.clone();
            tasks.push(tokio::spawn(async move {
                handle
                    .append([
                        Message::user(format!("u{i}")),
                        Message::assistant(format!("r{i}")),
                    ])
                    .await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let messages = session.snapshot().await;
        assert_eq!(messages.len(), 32);
        // Pairs may land in any order, but each pair is contiguous.
        for pair in messages.chunks(2) {
            assert_eq!(pair[0].role, crate::message::Role::User);
            assert_eq!(pair[1].role, crate::message::Role::Assistant);
            assert_eq!(pair[0].content[1..], pair[1].content[1..]);
        }
    }
}
