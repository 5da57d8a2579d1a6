//! Application state shared by all handlers.

use crate::db::DbPool;
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection
    pub pool: DbPool,

    /// Active quiz sessions
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            sessions: SessionStore::new(),
        }
    }
}
