use std::path::Path;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::config::{DatabaseConfig, DatabaseSelection};

static POSTGRES_MIGRATIONS: Migrator = sqlx::migrate!("./migrations/postgres");
static SQLITE_MIGRATIONS: Migrator = sqlx::migrate!("./migrations/sqlite");

/// Connection pool for whichever backend was selected at boot.
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Database {
    /// Builds a lazily connecting pool. No connection is attempted here, so an
    /// unreachable server only shows up once migrations run.
    pub fn register(selection: &DatabaseSelection, cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let acquire_timeout = Duration::from_secs(cfg.acquire_timeout_secs);
        match selection {
            DatabaseSelection::Networked(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect_lazy(url)
                    .map_err(|e| anyhow::anyhow!("invalid DATABASE_URL: {}", e))?;
                Ok(Database::Postgres(pool))
            }
            DatabaseSelection::LocalFile(path) => {
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .foreign_keys(true)
                    .busy_timeout(Duration::from_secs(10));
                let pool = SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect_lazy_with(options);
                Ok(Database::Sqlite(pool))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Database::Postgres(_) => "postgres",
            Database::Sqlite(_) => "sqlite",
        }
    }

    /// Applies every pending migration over a single pooled connection.
    ///
    /// The connection goes back to the pool when this returns, whether the
    /// migrations succeeded or not.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        match self {
            Database::Postgres(pool) => {
                let mut conn = pool.acquire().await?;
                POSTGRES_MIGRATIONS.run(&mut *conn).await?;
            }
            Database::Sqlite(pool) => {
                let mut conn = pool.acquire().await?;
                SQLITE_MIGRATIONS.run(&mut *conn).await?;
            }
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match self {
            Database::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Database::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        }
    }

    pub async fn close(&self) {
        match self {
            Database::Postgres(pool) => pool.close().await,
            Database::Sqlite(pool) => pool.close().await,
        }
    }
}

/// Creates the directory that will hold the SQLite file, if it is missing.
pub fn ensure_sqlite_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
