//! Pool-backed [`CharacterStore`] implementation.

use crate::characters::{add_character, get_character, list_characters};
use crate::DbPool;
use parley_types::{CharacterStore, NewPersona, Persona, StoreError};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;

/// Character store over a SQLite connection pool.
///
/// Every call checks out its own pooled connection, so concurrent readers
/// never share a connection. Calls block; async callers should wrap them in
/// `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct SqliteCharacterStore {
    pool: DbPool,
}

impl SqliteCharacterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Unavailable(format!("db connection failed: {}", e)))
    }
}

impl CharacterStore for SqliteCharacterStore {
    fn get(&self, id: i64) -> Result<Option<Persona>, StoreError> {
        let conn = self.conn()?;
        get_character(&conn, id).map_err(|e| StoreError::Query(e.to_string()))
    }

    fn get_all(&self) -> Result<Vec<Persona>, StoreError> {
        let conn = self.conn()?;
        list_characters(&conn).map_err(|e| StoreError::Query(e.to_string()))
    }

    fn add(&self, persona: &NewPersona) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let id = add_character(&conn, persona).map_err(|e| StoreError::Query(e.to_string()))?;
        tracing::info!(character_id = id, name = %persona.name, "character added");
        Ok(id)
    }
}
