use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::discover::{checksum, discover, filter_pending, validate_sequence, MigrationFile};
use crate::error::MigrationError;
use crate::lock::MigrationLock;
use crate::splitter::split_statements;
use crate::tracker::MigrationTracker;
use crate::version::format_version;

/// 迁移运行参数
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub directory: PathBuf,
    pub extension: String,
    /// 是否获取 advisory lock
    pub lock: bool,
    pub lock_timeout: Duration,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("migrations"),
            extension: "sql".to_string(),
            lock: true,
            lock_timeout: Duration::from_secs(60),
        }
    }
}

/// 一次成功应用的迁移
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub version: u32,
    pub filename: String,
    pub execution_time_ms: i64,
}

/// 执行失败的迁移
#[derive(Debug, Clone, Serialize)]
pub struct FailedMigration {
    pub version: u32,
    pub filename: String,
    pub error: String,
}

/// 一次运行的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub applied: Vec<AppliedMigration>,
    pub total_pending: usize,
    pub failure: Option<FailedMigration>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.applied.len()
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.succeeded() == self.total_pending
    }
}

/// 迁移执行器
///
/// 只负责执行 SQL，记账全部交给 [`MigrationTracker`]。
pub struct MigrationRunner<'a> {
    db: Arc<DatabaseConnection>,
    tracker: &'a MigrationTracker,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(db: Arc<DatabaseConnection>, tracker: &'a MigrationTracker) -> Self {
        Self { db, tracker }
    }

    /// 应用目录中所有待执行的迁移
    ///
    /// 序列不连续时一个都不执行；遇到第一个失败立即停止，
    /// 已应用的版本始终是完整序列的前缀。
    pub async fn run(&self, options: &MigrationOptions) -> Result<RunReport, MigrationError> {
        let candidates = discover(&options.directory, &options.extension)?;
        validate_sequence(&candidates)?;

        self.warn_on_drift(&candidates).await;

        let applied = self.tracker.get_applied_versions().await;
        let pending = filter_pending(&candidates, &applied);

        let mut report = RunReport {
            total_pending: pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            tracing::info!("Database schema is up to date");
            return Ok(report);
        }

        tracing::info!(
            pending = pending.len(),
            applied = applied.len(),
            "Applying pending migrations"
        );

        for file in &pending {
            match self.apply_and_record(file).await {
                Ok(applied) => report.applied.push(applied),
                Err(e) => {
                    tracing::error!(
                        version = %file.label(),
                        file = %file.raw_name,
                        error = %e,
                        "Migration failed, stopping"
                    );
                    report.failure = Some(FailedMigration {
                        version: file.version,
                        filename: file.raw_name.clone(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded(),
            total = report.total_pending,
            "Migration run finished"
        );
        Ok(report)
    }

    /// 强制重新执行一个已应用的版本，并覆盖其记账记录
    pub async fn reapply(
        &self,
        options: &MigrationOptions,
        version: u32,
    ) -> Result<RunReport, MigrationError> {
        let candidates = discover(&options.directory, &options.extension)?;
        let file = candidates
            .iter()
            .find(|file| file.version == version)
            .ok_or(MigrationError::NotFound(version))?;

        if !self.tracker.is_applied(version).await {
            return Err(MigrationError::NotApplied(version));
        }

        tracing::warn!(
            version = %file.label(),
            file = %file.raw_name,
            "Forcing re-execution of an applied migration"
        );

        let mut report = RunReport {
            total_pending: 1,
            ..Default::default()
        };
        match self.apply_and_record(file).await {
            Ok(applied) => report.applied.push(applied),
            Err(e) => {
                tracing::error!(version = %file.label(), error = %e, "Forced migration failed");
                report.failure = Some(FailedMigration {
                    version,
                    filename: file.raw_name.clone(),
                    error: e.to_string(),
                });
            }
        }
        Ok(report)
    }

    async fn apply_and_record(
        &self,
        file: &MigrationFile,
    ) -> Result<AppliedMigration, MigrationError> {
        let content = fs::read_to_string(&file.path).map_err(|source| MigrationError::Read {
            path: file.path.clone(),
            source,
        })?;

        let statements = self.statements_for(file, &content)?;
        let digest = checksum(content.as_bytes());
        let elapsed_ms = self.execute_file(file, &statements, &digest).await?;

        tracing::info!(
            version = %file.label(),
            file = %file.raw_name,
            elapsed_ms,
            "✓ Migration applied"
        );

        Ok(AppliedMigration {
            version: file.version,
            filename: file.raw_name.clone(),
            execution_time_ms: elapsed_ms,
        })
    }

    /// 按连接的方言切分文件内容
    ///
    /// 有内容却切不出任何语句（例如只剩注释）视为错误，避免空事务被记为已应用。
    fn statements_for(
        &self,
        file: &MigrationFile,
        content: &str,
    ) -> Result<Vec<String>, MigrationError> {
        let statements = split_statements(content, self.db.get_database_backend()).map_err(
            |e| MigrationError::Split {
                version: file.version,
                filename: file.raw_name.clone(),
                message: e.to_string(),
            },
        )?;

        if statements.is_empty() && !content.trim().is_empty() {
            return Err(MigrationError::NoStatements {
                version: file.version,
                filename: file.raw_name.clone(),
            });
        }
        Ok(statements)
    }

    /// 在同一个事务中执行文件内所有语句并写入记账记录，返回耗时（毫秒）
    ///
    /// 语句或记账任一失败，整个事务回滚，之前已提交的文件不受影响。
    async fn execute_file(
        &self,
        file: &MigrationFile,
        statements: &[String],
        digest: &str,
    ) -> Result<i64, MigrationError> {
        let started = Instant::now();

        let txn = self.db.begin().await?;
        for (index, statement) in statements.iter().enumerate() {
            tracing::trace!(version = %file.label(), statement = index + 1, "{}", statement);
            txn.execute_unprepared(statement)
                .await
                .map_err(|source| MigrationError::Execution {
                    version: file.version,
                    filename: file.raw_name.clone(),
                    statement: index + 1,
                    source,
                })?;
        }
        let elapsed_ms = started.elapsed().as_millis() as i64;

        self.tracker
            .record_applied(&txn, file.version, &file.raw_name, elapsed_ms, Some(digest))
            .await?;
        txn.commit().await?;

        Ok(elapsed_ms)
    }

    async fn warn_on_drift(&self, candidates: &[MigrationFile]) {
        let stored = match self.tracker.get_checksums().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored checksums, skipping drift check");
                return;
            }
        };

        for file in candidates {
            if let Some(Some(expected)) = stored.get(&file.version)
                && expected != &file.checksum
            {
                tracing::warn!(
                    version = %format_version(file.version),
                    file = %file.raw_name,
                    "Applied migration was modified on disk after it ran"
                );
            }
        }
    }
}

/// 完整的迁移流程：加锁、确保记账表、校验序列、依次执行
pub async fn run_migrations(
    db: Arc<DatabaseConnection>,
    options: &MigrationOptions,
) -> Result<RunReport, MigrationError> {
    with_lock(db, options, |tracker, db| async move {
        MigrationRunner::new(db, &tracker).run(options).await
    })
    .await
}

/// 强制重新执行单个已应用的迁移
pub async fn reapply_migration(
    db: Arc<DatabaseConnection>,
    options: &MigrationOptions,
    version: u32,
) -> Result<RunReport, MigrationError> {
    with_lock(db, options, |tracker, db| async move {
        MigrationRunner::new(db, &tracker).reapply(options, version).await
    })
    .await
}

async fn with_lock<F, Fut>(
    db: Arc<DatabaseConnection>,
    options: &MigrationOptions,
    body: F,
) -> Result<RunReport, MigrationError>
where
    F: FnOnce(MigrationTracker, Arc<DatabaseConnection>) -> Fut,
    Fut: std::future::Future<Output = Result<RunReport, MigrationError>>,
{
    let lock = if options.lock {
        Some(MigrationLock::acquire(db.clone(), options.lock_timeout).await?)
    } else {
        None
    };

    let result = match MigrationTracker::new(db.clone()).await {
        Ok(tracker) => body(tracker, db).await,
        Err(e) => Err(e),
    };

    if let Some(lock) = lock
        && let Err(e) = lock.release().await
    {
        tracing::warn!(error = %e, "Failed to release migration lock");
    }

    result
}
