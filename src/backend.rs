use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BackendError;
use crate::models::{GameType, Location, NewGameType, NewSessionRow, SessionRow, UserId};

/// Table-style persistence collaborator plus the identity it scopes rows to.
///
/// Selects are scoped to the current identity; with nobody signed in they
/// return no rows. Inserts take the identity explicitly and return the
/// stored record, including the id the backend assigned.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserId>, BackendError>;

    /// Sessions for the current identity, newest date first
    async fn select_sessions(&self) -> Result<Vec<SessionRow>, BackendError>;
    async fn insert_session(&self, user: &UserId, row: &NewSessionRow) -> Result<SessionRow, BackendError>;

    async fn select_locations(&self) -> Result<Vec<Location>, BackendError>;
    async fn insert_location(&self, user: &UserId, name: &str) -> Result<Location, BackendError>;

    async fn select_game_types(&self) -> Result<Vec<GameType>, BackendError>;
    async fn insert_game_type(&self, user: &UserId, game_type: &NewGameType) -> Result<GameType, BackendError>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    location TEXT NOT NULL,
    buy_in INTEGER NOT NULL,
    cash_out INTEGER NOT NULL,
    duration TEXT NOT NULL,
    game_type TEXT NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS locations (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS game_types (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    sb REAL NOT NULL,
    bb REAL NOT NULL,
    str REAL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS sessions_user_date ON sessions (user_id, date);
";

/// SQLite-backed table API
/// Holds the signed-in identity in-process
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    user: RwLock<Option<UserId>>,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening session database");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, BackendError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            user: RwLock::new(None),
        })
    }

    pub async fn sign_in(&self, user: impl Into<UserId>) {
        let user = user.into();
        debug!(%user, "signed in");
        *self.user.write().await = Some(user);
    }

    pub async fn sign_out(&self) {
        debug!("signed out");
        *self.user.write().await = None;
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        self.conn.lock().await.execute_batch(sql)?;
        Ok(())
    }

    fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
        Ok(SessionRow {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            location: row.get("location")?,
            buy_in: row.get("buy_in")?,
            cash_out: row.get("cash_out")?,
            duration: row.get("duration")?,
            game_type: row.get("game_type")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    fn game_type_from_row(row: &Row<'_>) -> rusqlite::Result<GameType> {
        Ok(GameType {
            id: row.get("id")?,
            sb: row.get("sb")?,
            bb: row.get("bb")?,
            str: row.get("str")?,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn current_user(&self) -> Result<Option<UserId>, BackendError> {
        Ok(self.user.read().await.clone())
    }

    async fn select_sessions(&self) -> Result<Vec<SessionRow>, BackendError> {
        let Some(user) = self.current_user().await? else {
            return Ok(Vec::new());
        };
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT * FROM sessions WHERE user_id = ?1 ORDER BY date DESC, created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![user], Self::session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn insert_session(&self, user: &UserId, row: &NewSessionRow) -> Result<SessionRow, BackendError> {
        let id = new_id();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sessions (id, user_id, date, location, buy_in, cash_out, duration, game_type, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                user,
                row.date,
                row.location,
                row.buy_in,
                row.cash_out,
                row.duration,
                row.game_type,
                row.notes,
                now(),
            ],
        )?;
        conn.query_row("SELECT * FROM sessions WHERE id = ?1", params![id], Self::session_from_row)
            .optional()?
            .ok_or_else(|| BackendError::Corrupt(format!("session {id} missing after insert")))
    }

    async fn select_locations(&self) -> Result<Vec<Location>, BackendError> {
        let Some(user) = self.current_user().await? else {
            return Ok(Vec::new());
        };
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name FROM locations WHERE user_id = ?1 ORDER BY created_at")?;
        let rows = stmt
            .query_map(params![user], |row| {
                Ok(Location {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn insert_location(&self, user: &UserId, name: &str) -> Result<Location, BackendError> {
        let id = new_id();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO locations (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, user, name, now()],
        )?;
        Ok(Location {
            id,
            name: name.to_string(),
        })
    }

    async fn select_game_types(&self) -> Result<Vec<GameType>, BackendError> {
        let Some(user) = self.current_user().await? else {
            return Ok(Vec::new());
        };
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, sb, bb, str FROM game_types WHERE user_id = ?1 ORDER BY created_at")?;
        let rows = stmt
            .query_map(params![user], Self::game_type_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn insert_game_type(&self, user: &UserId, game_type: &NewGameType) -> Result<GameType, BackendError> {
        let id = new_id();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO game_types (id, user_id, sb, bb, str, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, user, game_type.sb, game_type.bb, game_type.str, now()],
        )?;
        Ok(GameType {
            id,
            sb: game_type.sb,
            bb: game_type.bb,
            str: game_type.str,
        })
    }
}
