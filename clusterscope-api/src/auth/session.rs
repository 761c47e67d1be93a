//! In-memory session store

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use clusterscope_common::auth::Session;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    session_duration: Duration,
}

impl SessionStore {
    pub fn new(session_duration: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_duration,
        }
    }

    /// Create and store a session starting at `now`
    pub async fn create(&self, username: &str, now: DateTime<Utc>) -> Session {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.session_duration,
        };

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    /// Live session for `id`; an expired one is removed
    pub async fn get(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                None => return None,
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        self.sessions.write().await.remove(id);
        None
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
