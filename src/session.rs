//! The cached current-user record.
//!
//! The dashboard holds no durable state of its own except this: one user
//! record per login, keyed by a random cookie token and replaced wholesale
//! at the next login. Rows never expire; logout (or external clearing) is
//! the only way out.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::models::User;

pub type DbPool = Pool<SqliteConnectionManager>;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_sessions",
    include_str!("../migrations/001_sessions.sql"),
)];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("session db error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("session codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
}

impl SessionStore {
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(db_path);
        Self::build(manager, 8)
    }

    /// Store backed by an in-memory database; handy in tests. A single
    /// pooled connection, since every `:memory:` connection is its own
    /// database.
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::build(SqliteConnectionManager::memory(), 1)
    }

    fn build(manager: SqliteConnectionManager, max_size: u32) -> anyhow::Result<Self> {
        let pool = Pool::builder().max_size(max_size).build(manager)?;

        let conn = pool.get()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        for (name, sql) in MIGRATIONS {
            let already_applied: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if !already_applied {
                tracing::info!("Applying migration: {}", name);
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO schema_version (name) VALUES (?1)",
                    params![name],
                )?;
            }
        }

        Ok(Self { pool })
    }

    /// Cache `user` under a fresh token and return the token.
    pub fn insert(&self, user: &User) -> Result<String, StoreError> {
        let conn = self.pool.get()?;
        let token = generate_token();
        let id = uuid::Uuid::now_v7().to_string();
        let user_json = serde_json::to_string(user)?;
        conn.execute(
            "INSERT INTO sessions (id, token, user_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, token, user_json, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(token)
    }

    /// The cached record for a token, or `None` when logged out.
    pub fn get(&self, token: &str) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get()?;
        let user_json: Option<String> = conn
            .query_row(
                "SELECT user_json FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        match user_json {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn clear(&self, token: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
