use std::{
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    str::FromStr,
};

use sqlx::{
    Sqlite,
    pool::PoolConnection,
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
    },
};
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::core::db::StoreResult;

const MEMORY_URL: &str = "sqlite::memory:";

pub(super) struct StoreState {
    db_file: Option<PathBuf>,
    pool: RwLock<SqlitePool>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("db_file", &self.db_file)
            .finish()
    }
}

impl StoreState {
    /// Acquire a pooled connection and hold the pool read lock for the entire lifetime
    /// of the returned guard.
    pub(super) async fn conn(&self) -> StoreResult<DbConnGuard<'_>> {
        let pool_guard = self.pool.read().await;

        // The connection must be acquired while the read lock is held so that
        // `close` cannot run underneath it.
        let conn = pool_guard.acquire().await?;

        Ok(DbConnGuard {
            _pool_guard: pool_guard,
            conn,
        })
    }

    pub(super) async fn open<P: AsRef<Path>>(db_file: P) -> StoreResult<Self> {
        let db_file = db_file.as_ref().to_path_buf();
        let connect_opts = SqliteConnectOptions::new()
            .filename(&db_file)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_opts)
            .await?;
        Self::migrate(&pool).await?;
        tracing::debug!(path = %db_file.display(), "opened calendar database");
        Ok(Self {
            db_file: Some(db_file),
            pool: RwLock::new(pool),
        })
    }

    /// An in-memory database lives exactly as long as its single connection.
    pub(super) async fn in_memory() -> StoreResult<Self> {
        let connect_opts = SqliteConnectOptions::from_str(MEMORY_URL)?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self {
            db_file: None,
            pool: RwLock::new(pool),
        })
    }

    async fn migrate(pool: &SqlitePool) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    /// Waits for in-flight queries, checkpoints the WAL and releases file handles.
    pub(super) async fn close(&self) -> StoreResult<()> {
        let pool_guard = self.pool.write().await;
        if self.db_file.is_some() {
            sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
                .execute(&*pool_guard)
                .await?;
        }
        pool_guard.close().await;
        Ok(())
    }
}

pub(super) struct DbConnGuard<'a> {
    _pool_guard: RwLockReadGuard<'a, SqlitePool>,
    conn: PoolConnection<Sqlite>,
}

impl Deref for DbConnGuard<'_> {
    type Target = PoolConnection<Sqlite>;
    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DbConnGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
