//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

use crate::db::{decks, schema};
use crate::domain::{DeckNode, NodeKind};

/// Test environment with a migrated database in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Database connection with the full schema applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("flashdeck.db");
        let conn = Connection::open(&db_path)?;
        schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Insert a root-level deck and return its id.
    pub fn seed_deck(&self, title: &str) -> i64 {
        decks::insert_node(
            &self.conn,
            &DeckNode::new(title.to_string(), NodeKind::Deck, None),
        )
        .expect("failed to seed deck")
    }

    /// Insert a folder (optionally nested) and return its id.
    pub fn seed_folder(&self, title: &str, parent_id: Option<i64>) -> i64 {
        decks::insert_node(
            &self.conn,
            &DeckNode::new(title.to_string(), NodeKind::Folder, parent_id),
        )
        .expect("failed to seed folder")
    }
}
