pub mod models;
pub mod query;
pub mod repository;
pub mod seed;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use models::{Book, BookListing, NewUser, User};
pub use query::{Predicate, QueryLayer, QueryStrategy, Record};
pub use repository::{BookRepository, UserRepository};

use crate::error::Result;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        email TEXT NOT NULL,
        admin BOOLEAN NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        book_title TEXT NOT NULL UNIQUE,
        secret TEXT NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS books_user_id ON books(user_id)",
];

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection is kept alive for the
    /// pool's lifetime since every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    pub fn query_layer(&self, strategy: Arc<dyn QueryStrategy>) -> QueryLayer {
        QueryLayer::new(self.pool.clone(), strategy)
    }

    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        log::info!("Database schema ready");
        Ok(())
    }

    /// Drops both tables and recreates them empty.
    pub async fn reset(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS books")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS users")
            .execute(&self.pool)
            .await?;

        log::info!("Database tables dropped");
        self.init_schema().await
    }
}
