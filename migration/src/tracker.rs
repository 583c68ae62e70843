use chrono::Utc;
use sea_orm::sea_query::{ColumnDef, Expr, OnConflict, Table};
use sea_orm::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::entity::{self, Column, Entity as SchemaMigrations};
use crate::error::MigrationError;
use crate::version::{format_version, parse_stored_version};

/// 已应用迁移的记录
pub type MigrationRecord = entity::Model;

/// 迁移记账表的唯一拥有者
///
/// 所有对 `schema_migrations` 的写操作都经过这里，执行器只负责跑 SQL。
pub struct MigrationTracker {
    db: Arc<DatabaseConnection>,
}

impl MigrationTracker {
    /// 构造时确保记账表存在，建表失败直接返回错误
    pub async fn new(db: Arc<DatabaseConnection>) -> Result<Self, MigrationError> {
        let tracker = Self { db };
        tracker.ensure_tracking_table().await?;
        Ok(tracker)
    }

    /// `CREATE TABLE IF NOT EXISTS schema_migrations`
    pub async fn ensure_tracking_table(&self) -> Result<(), MigrationError> {
        let stmt = Table::create()
            .table(SchemaMigrations)
            .if_not_exists()
            .col(
                ColumnDef::new(Column::Version)
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Column::AppliedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(ColumnDef::new(Column::Filename).string().not_null())
            .col(ColumnDef::new(Column::Checksum).string().null())
            .col(
                ColumnDef::new(Column::ExecutionTimeMs)
                    .big_integer()
                    .not_null()
                    .default(0),
            )
            .to_owned();

        let backend = self.db.get_database_backend();
        self.db
            .execute(backend.build(&stmt))
            .await
            .map_err(MigrationError::TrackingTable)?;

        tracing::debug!("Migration tracking table is ready");
        Ok(())
    }

    /// 已应用的版本集合（升序）
    ///
    /// 查询失败时记录错误并返回空集合，不让一次读失败拖垮状态查询。
    pub async fn get_applied_versions(&self) -> BTreeSet<u32> {
        let records = match SchemaMigrations::find().all(self.db.as_ref()).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read applied migrations, treating as none applied");
                return BTreeSet::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| {
                let version = parse_stored_version(&record.version);
                if version.is_none() {
                    tracing::warn!(
                        version = %record.version,
                        filename = %record.filename,
                        "Ignoring tracking row with a non-numeric version"
                    );
                }
                version
            })
            .collect()
    }

    /// 记录迁移已应用（upsert）
    ///
    /// 同一版本再次应用时覆盖 `applied_at`、`filename`、`checksum` 和耗时。
    pub async fn mark_applied(
        &self,
        version: u32,
        filename: &str,
        execution_time_ms: i64,
        checksum: Option<&str>,
    ) -> Result<(), MigrationError> {
        self.record_applied(self.db.as_ref(), version, filename, execution_time_ms, checksum)
            .await
    }

    /// 在调用方给定的连接（通常是迁移自身的事务）上写入记录
    pub async fn record_applied<C>(
        &self,
        conn: &C,
        version: u32,
        filename: &str,
        execution_time_ms: i64,
        checksum: Option<&str>,
    ) -> Result<(), MigrationError>
    where
        C: ConnectionTrait,
    {
        let record = entity::ActiveModel {
            version: Set(format_version(version)),
            applied_at: Set(Utc::now()),
            filename: Set(filename.to_string()),
            checksum: Set(checksum.map(|c| c.to_string())),
            execution_time_ms: Set(execution_time_ms),
        };

        SchemaMigrations::insert(record)
            .on_conflict(
                OnConflict::column(Column::Version)
                    .update_columns([
                        Column::AppliedAt,
                        Column::Filename,
                        Column::Checksum,
                        Column::ExecutionTimeMs,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        tracing::debug!(
            version = %format_version(version),
            filename,
            execution_time_ms,
            "Migration recorded"
        );
        Ok(())
    }

    pub async fn is_applied(&self, version: u32) -> bool {
        self.get_applied_versions().await.contains(&version)
    }

    /// 迁移历史，按 `applied_at` 从新到旧
    pub async fn get_history(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let records = SchemaMigrations::find()
            .order_by_desc(Column::AppliedAt)
            .order_by_desc(Column::Version)
            .all(self.db.as_ref())
            .await?;
        Ok(records)
    }

    /// 已应用版本保存的校验和
    pub async fn get_checksums(&self) -> Result<BTreeMap<u32, Option<String>>, MigrationError> {
        let records = SchemaMigrations::find().all(self.db.as_ref()).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                parse_stored_version(&record.version).map(|version| (version, record.checksum))
            })
            .collect())
    }
}
