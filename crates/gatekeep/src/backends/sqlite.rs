//! SQLite backend built on sqlx.
//!
//! sqlx is async, while store operations are synchronous. The backend owns
//! a private current-thread runtime and blocks on it for every statement,
//! so it must not be driven from inside another runtime's worker thread.
//! Async hosts call the store through `tokio::task::spawn_blocking`.

use std::future::Future;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::Runtime;
use tracing::debug;

use super::{Backend, StoredUser};
use crate::access::AccessLevel;
use crate::error::{AuthError, Result};

/// Database file used when no path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "gatekeep.sqlite3";

/// SQL to create the `auth_user` table.
pub const CREATE_USER_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS auth_user (
    username VARCHAR(150) PRIMARY KEY,
    password_hash TEXT NOT NULL,
    access INTEGER NOT NULL
)
";

/// Persists users to a SQLite database file.
pub struct SqliteBackend {
    pool: SqlitePool,
    runtime: Option<Runtime>,
}

impl SqliteBackend {
    /// Opens (creating if missing) the database at `path` and ensures the
    /// user table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;
            sqlx::query(CREATE_USER_TABLE_SQL).execute(&pool).await?;
            Ok::<_, AuthError>(pool)
        })?;

        debug!(path = %path.as_ref().display(), "opened sqlite user database");

        Ok(Self {
            pool,
            runtime: Some(runtime),
        })
    }

    fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or(AuthError::Database(sqlx::Error::PoolClosed))?;
        runtime.block_on(fut)
    }
}

impl Backend for SqliteBackend {
    fn load(&self) -> Result<Vec<StoredUser>> {
        self.run(async {
            let rows = sqlx::query_as::<_, (String, String, i32)>(
                "SELECT username, password_hash, access FROM auth_user",
            )
            .fetch_all(&self.pool)
            .await?;

            Ok(rows
                .into_iter()
                .map(|(username, password_hash, access)| StoredUser {
                    username,
                    password_hash,
                    access: AccessLevel(access),
                })
                .collect())
        })
    }

    fn insert(&self, user: &StoredUser) -> Result<()> {
        self.run(async {
            sqlx::query("INSERT INTO auth_user (username, password_hash, access) VALUES (?, ?, ?)")
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.access.value())
                .execute(&self.pool)
                .await?;
            Ok(())
        })
    }

    fn update_password(&self, username: &str, password_hash: &str) -> Result<()> {
        self.run(async {
            sqlx::query("UPDATE auth_user SET password_hash = ? WHERE username = ?")
                .bind(password_hash)
                .bind(username)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
    }

    fn update_access(&self, username: &str, access: AccessLevel) -> Result<()> {
        self.run(async {
            sqlx::query("UPDATE auth_user SET access = ? WHERE username = ?")
                .bind(access.value())
                .bind(username)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
    }

    fn delete(&self, username: &str) -> Result<()> {
        self.run(async {
            sqlx::query("DELETE FROM auth_user WHERE username = ?")
                .bind(username)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        self.run(async {
            self.pool.close().await;
            Ok(())
        })
    }
}

impl Drop for SqliteBackend {
    fn drop(&mut self) {
        // Dropping may happen on an async worker thread.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, access: AccessLevel) -> StoredUser {
        StoredUser {
            username: name.to_string(),
            password_hash: format!("hash-of-{name}"),
            access,
        }
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite3");

        let backend = SqliteBackend::open(&path).unwrap();
        backend.insert(&user("alice", AccessLevel::ADMIN)).unwrap();
        backend.insert(&user("bob", AccessLevel::USER)).unwrap();
        backend.update_password("alice", "new-hash").unwrap();
        backend.update_access("bob", AccessLevel(5)).unwrap();
        backend.close().unwrap();
        drop(backend);

        let backend = SqliteBackend::open(&path).unwrap();
        let mut rows = backend.load().unwrap();
        rows.sort_by(|a, b| a.username.cmp(&b.username));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].password_hash, "new-hash");
        assert_eq!(rows[0].access, AccessLevel::ADMIN);
        assert_eq!(rows[1].access, AccessLevel(5));
    }

    #[test]
    fn test_delete_row() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::open(dir.path().join("users.sqlite3")).unwrap();

        backend.insert(&user("alice", AccessLevel::USER)).unwrap();
        backend.delete("alice").unwrap();
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_row_is_database_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::open(dir.path().join("users.sqlite3")).unwrap();

        backend.insert(&user("alice", AccessLevel::USER)).unwrap();
        assert!(matches!(
            backend.insert(&user("alice", AccessLevel::USER)),
            Err(AuthError::Database(_))
        ));
    }

    #[test]
    fn test_closed_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::open(dir.path().join("users.sqlite3")).unwrap();

        backend.close().unwrap();
        assert!(matches!(backend.load(), Err(AuthError::Database(_))));
    }
}
