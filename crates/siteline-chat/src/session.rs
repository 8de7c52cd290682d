//! Session storage and per-session serialisation.
//!
//! A session owns one transcript and one lead record. Storage sits behind
//! the [`SessionStore`] trait so a shared cache can replace the in-memory
//! map without touching the engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use siteline_core::types::LeadRecord;

use crate::error::ChatError;
use crate::transcript::Transcript;

/// Conversation state for one session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub transcript: Transcript,
    pub lead: LeadRecord,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, system_prompt: &str, max_turns: usize) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            transcript: Transcript::new(system_prompt, max_turns),
            lead: LeadRecord::default(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        match ttl {
            Some(ttl) => now - self.last_active > ttl,
            None => false,
        }
    }
}

/// Pluggable session backing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session. Expired sessions are reported as absent.
    async fn get(&self, id: &str) -> Result<Option<Session>, ChatError>;

    /// Insert or replace a session.
    async fn put(&self, session: Session) -> Result<(), ChatError>;

    /// Remove a session, returning whether one existed.
    async fn remove(&self, id: &str) -> Result<bool, ChatError>;

    /// Drop every expired session, returning how many were removed.
    async fn evict_expired(&self) -> Result<usize, ChatError>;

    /// Number of stored sessions, expired or not.
    async fn len(&self) -> Result<usize, ChatError>;
}

/// Process-local session map with idle expiry.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// `ttl_minutes == 0` disables expiry.
    pub fn new(ttl_minutes: u32) -> Self {
        let ttl = (ttl_minutes > 0).then(|| Duration::minutes(i64::from(ttl_minutes)));
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn without_expiry() -> Self {
        Self::new(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Session(format!("Lock poisoned: {e}")))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>, ChatError> {
        let sessions = self.lock()?;
        let now = Utc::now();
        Ok(sessions
            .get(id)
            .filter(|s| !s.is_expired(self.ttl, now))
            .cloned())
    }

    async fn put(&self, session: Session) -> Result<(), ChatError> {
        self.lock()?.insert(session.id.clone(), session);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, ChatError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn evict_expired(&self) -> Result<usize, ChatError> {
        let mut sessions = self.lock()?;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted expired sessions");
        }
        Ok(evicted)
    }

    async fn len(&self) -> Result<usize, ChatError> {
        Ok(self.lock()?.len())
    }
}

/// Keyed async mutex serialising requests for the same session id.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Held until the guard drops.
    pub async fn acquire(&self, id: &str) -> Result<OwnedMutexGuard<()>, ChatError> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| ChatError::Session(format!("Lock poisoned: {e}")))?;
            locks.entry(id.to_string()).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }

    /// Forget locks nobody holds or waits on.
    pub fn prune(&self) -> usize {
        match self.locks.lock() {
            Ok(mut locks) => {
                let before = locks.len();
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                before - locks.len()
            }
            Err(_) => 0,
        }
    }

    /// Forget the lock for `id` if nobody holds or waits on it.
    pub fn release(&self, id: &str) -> bool {
        match self.locks.lock() {
            Ok(mut locks) => match locks.get(id) {
                Some(lock) if Arc::strong_count(lock) == 1 => locks.remove(id).is_some(),
                _ => false,
            },
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
