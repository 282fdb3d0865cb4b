//! Persistence for Parley personas.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, character queries, and [`SqliteCharacterStore`],
//! the [`parley_types::CharacterStore`] implementation used by the service.
//!
//! WAL mode lets pipeline invocations read personas concurrently while a
//! character is being added; each insert is a single statement, so readers
//! never observe a half-written row.

mod characters;
mod migrations;
mod pool;
mod store;

pub use characters::{add_character, get_character, list_characters};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use store::SqliteCharacterStore;
