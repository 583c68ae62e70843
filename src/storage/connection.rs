use sea_orm::sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::errors::AppError;

/// 迁移连接的最长存活时间
///
/// advisory lock 绑定在会话上，连接在运行期间被回收会悄悄丢掉锁。
const SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// 连接 SQLite 数据库（带自动创建和 WAL）
///
/// `pinned` 为真时连接不会因空闲或存活时间被回收。
pub async fn connect_sqlite(
    database_url: &str,
    max_connections: u32,
    pinned: bool,
) -> Result<DatabaseConnection, AppError> {
    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .pragma("foreign_keys", "ON");

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
    if pinned {
        pool_options = pool_options.max_lifetime(None).idle_timeout(None);
    }

    let pool = pool_options
        .connect_with(opt)
        .await
        .map_err(|e| AppError::Internal(format!("无法连接到 SQLite 数据库: {}", e)))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// MySQL/PostgreSQL 连接参数
fn generic_options(database_url: &str, config: &DatabaseConfig, pinned: bool) -> ConnectOptions {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    if pinned {
        opt.max_lifetime(SESSION_LIFETIME)
            .idle_timeout(SESSION_LIFETIME);
    }
    opt
}

/// 连接通用数据库（MySQL/PostgreSQL）
pub async fn connect_generic(
    database_url: &str,
    config: &DatabaseConfig,
    pinned: bool,
) -> Result<DatabaseConnection, AppError> {
    Database::connect(generic_options(database_url, config, pinned))
        .await
        .map_err(AppError::Database)
}

/// 智能连接数据库（自动识别类型）
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    connect_with(config, false).await
}

async fn connect_with(
    config: &DatabaseConfig,
    pinned: bool,
) -> Result<DatabaseConnection, AppError> {
    if config.url.starts_with("sqlite://") || config.url.starts_with("sqlite:") {
        tracing::info!("使用 SQLite 数据库（已启用 WAL）");
        connect_sqlite(&config.url, config.max_connections, pinned).await
    } else if config.url.starts_with("postgres://") || config.url.starts_with("postgresql://") {
        tracing::info!("使用 PostgreSQL 数据库");
        connect_generic(&config.url, config, pinned).await
    } else if config.url.starts_with("mysql://") {
        tracing::info!("使用 MySQL 数据库");
        connect_generic(&config.url, config, pinned).await
    } else {
        Err(AppError::Config(format!(
            "不支持的数据库类型: {}",
            config.url
        )))
    }
}

/// 迁移专用连接：单连接池，连接在整个运行期间保持不变
///
/// advisory lock 是会话级的，加锁、迁移和解锁必须使用同一个连接。
pub async fn connect_for_migrations(
    config: &DatabaseConfig,
) -> Result<DatabaseConnection, AppError> {
    let single = DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..config.clone()
    };
    connect_with(&single, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_connect_sqlite_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            ..Default::default()
        };

        let db = connect_for_migrations(&config).await.unwrap();
        db.execute_unprepared("CREATE TABLE ping (id INTEGER)")
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let config = DatabaseConfig {
            url: "oracle://localhost/db".into(),
            ..Default::default()
        };
        assert!(matches!(connect(&config).await, Err(AppError::Config(_))));
    }

    #[test]
    fn test_migration_pool_keeps_its_session() {
        let config = DatabaseConfig {
            url: "postgres://localhost/content".into(),
            max_connections: 1,
            min_connections: 1,
        };

        let pinned = generic_options(&config.url, &config, true);
        assert_eq!(pinned.get_max_lifetime(), Some(SESSION_LIFETIME));
        assert_eq!(pinned.get_idle_timeout(), Some(SESSION_LIFETIME));

        let pooled = generic_options(&config.url, &config, false);
        assert_eq!(pooled.get_max_lifetime(), None);
    }
}
