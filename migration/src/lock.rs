//! 迁移进程间互斥
//!
//! 会话级 advisory lock，在建记账表之前获取，整个迁移过程中持有。
//! 依赖调用方提供单连接的数据库句柄，加锁与解锁必须落在同一个会话上。
//!
//! - PostgreSQL: `pg_try_advisory_lock` / `pg_advisory_unlock`
//! - MySQL: `GET_LOCK` / `RELEASE_LOCK`
//! - SQLite: 没有会话锁，文件级写锁负责串行化写入，这里只记录日志

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::MigrationError;

/// PostgreSQL advisory lock 键
pub const LOCK_KEY: i64 = 0x7363_6865_6d61_7461;

/// MySQL 命名锁
pub const LOCK_NAME: &str = "schema_migrations";

const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// 持有中的迁移锁，必须显式 `release`
pub struct MigrationLock {
    db: Arc<DatabaseConnection>,
    backend: DatabaseBackend,
}

impl MigrationLock {
    /// 获取迁移锁，超过 `timeout` 仍未获得则返回 `LockTimeout`
    pub async fn acquire(
        db: Arc<DatabaseConnection>,
        timeout: Duration,
    ) -> Result<Self, MigrationError> {
        let backend = db.get_database_backend();

        match backend {
            DatabaseBackend::Postgres => {
                let deadline = Instant::now() + timeout;
                loop {
                    let row = db
                        .query_one(Statement::from_sql_and_values(
                            backend,
                            "SELECT pg_try_advisory_lock($1) AS locked",
                            [LOCK_KEY.into()],
                        ))
                        .await?;
                    let locked = match row {
                        Some(row) => row.try_get::<bool>("", "locked")?,
                        None => false,
                    };
                    if locked {
                        break;
                    }
                    if Instant::now() >= deadline {
                        return Err(MigrationError::LockTimeout(timeout));
                    }
                    tracing::info!("Another migrator holds the lock, waiting...");
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
            }
            DatabaseBackend::MySql => {
                let row = db
                    .query_one(Statement::from_sql_and_values(
                        backend,
                        "SELECT GET_LOCK(?, ?) AS locked",
                        [LOCK_NAME.into(), (timeout.as_secs() as i64).into()],
                    ))
                    .await?;
                let locked = match row {
                    Some(row) => row.try_get::<Option<i64>>("", "locked")?,
                    None => None,
                };
                if locked != Some(1) {
                    return Err(MigrationError::LockTimeout(timeout));
                }
            }
            DatabaseBackend::Sqlite => {
                tracing::debug!("SQLite has no session locks, relying on the database file lock");
            }
        }

        tracing::debug!(backend = ?backend, "Migration lock acquired");
        Ok(Self { db, backend })
    }

    /// 释放迁移锁
    pub async fn release(self) -> Result<(), MigrationError> {
        let stmt = match self.backend {
            DatabaseBackend::Postgres => Statement::from_sql_and_values(
                self.backend,
                "SELECT pg_advisory_unlock($1)",
                [LOCK_KEY.into()],
            ),
            DatabaseBackend::MySql => Statement::from_sql_and_values(
                self.backend,
                "SELECT RELEASE_LOCK(?)",
                [LOCK_NAME.into()],
            ),
            DatabaseBackend::Sqlite => return Ok(()),
        };

        self.db.query_one(stmt).await?;
        tracing::debug!("Migration lock released");
        Ok(())
    }
}
