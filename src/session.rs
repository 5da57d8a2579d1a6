//! In-memory registry of active quiz sessions.
//!
//! Sessions are keyed by a generated id handed to the client at start time
//! and auto-expire after a period of inactivity. The store is an explicit
//! object owned by the router state rather than a process-global.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config;
use crate::srs::QuizSession;

struct SessionEntry {
  session: QuizSession,
  last_access: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
  inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a session and hand back its generated id.
  pub fn insert(&self, session: QuizSession) -> String {
    let id = generate_session_id();
    let mut sessions = self.inner.lock().expect("Session store lock poisoned");
    sessions.insert(
      id.clone(),
      SessionEntry {
        session,
        last_access: Utc::now(),
      },
    );
    id
  }

  /// Run `f` against a stored session, refreshing its last-access time.
  /// Returns None when the id is unknown or expired.
  pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut QuizSession) -> T) -> Option<T> {
    let mut sessions = self.inner.lock().expect("Session store lock poisoned");

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions);
    }

    let entry = sessions.get_mut(id)?;
    entry.last_access = Utc::now();
    Some(f(&mut entry.session))
  }

  /// Drop a session, returning it if it existed.
  pub fn remove(&self, id: &str) -> Option<QuizSession> {
    let mut sessions = self.inner.lock().expect("Session store lock poisoned");
    sessions.remove(id).map(|entry| entry.session)
  }

  pub fn len(&self) -> usize {
    self.inner.lock().expect("Session store lock poisoned").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  sessions.retain(|_, entry| entry.last_access > expiry);
}

/// Generate a new session ID
fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
