use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::errors::StoreError;
use crate::repositories::SqliteNewsRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Process-wide store handle. Created once at startup and closed explicitly
/// on shutdown; repositories share the underlying connection.
pub struct Database {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl Database {
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let connection = SqliteConnection::establish(database_url)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::connect(":memory:")
    }

    fn from_connection(mut connection: SqliteConnection) -> Result<Self, StoreError> {
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| StoreError::Migration(err.to_string()))?;
        if !applied.is_empty() {
            info!(count = applied.len(), "Applied pending migrations");
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(connection)),
        })
    }

    pub fn connection(&self) -> Arc<Mutex<SqliteConnection>> {
        self.conn.clone()
    }

    pub fn repository(&self) -> SqliteNewsRepository {
        SqliteNewsRepository::new(self.conn.clone())
    }

    /// Release the connection. Handles still held elsewhere keep it open
    /// until they are dropped.
    pub fn close(self) {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                drop(mutex);
                info!("Database connection closed");
            }
            Err(shared) => {
                warn!(
                    handles = Arc::strong_count(&shared) - 1,
                    "Database still referenced; connection closes when the last handle drops"
                );
            }
        }
    }
}
