use std::path::PathBuf;
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// 迁移引擎错误
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    // 记账表无法创建，后续所有操作都没有意义
    #[error("Failed to create migration tracking table: {0}")]
    TrackingTable(#[source] DbErr),

    #[error("Cannot read migrations directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read migration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration sequence broken at {filename}: expected version {expected:02}, found {found:02}")]
    SequenceGap {
        expected: u32,
        found: u32,
        filename: String,
    },

    #[error("Migration {version:02} ({filename}) failed at statement #{statement}: {source}")]
    Execution {
        version: u32,
        filename: String,
        statement: usize,
        #[source]
        source: DbErr,
    },

    #[error("Migration {version:02} ({filename}) could not be split into statements: {message}")]
    Split {
        version: u32,
        filename: String,
        message: String,
    },

    // 文件有内容但没有任何可执行语句，不能记为已应用
    #[error("Migration {version:02} ({filename}) contains no executable statements")]
    NoStatements { version: u32, filename: String },

    #[error("Migration {0:02} was not found in the migrations directory")]
    NotFound(u32),

    #[error("Migration {0:02} has not been applied yet, refusing to force it")]
    NotApplied(u32),

    #[error("Timed out after {0:?} waiting for the migration lock")]
    LockTimeout(Duration),
}
