//! 领域表注册
//!
//! 由实体定义生成 `CREATE TABLE IF NOT EXISTS`，在执行 SQL 迁移之前运行。

use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};

use super::entities::prelude::*;
use crate::errors::AppError;

/// 创建所有领域表（幂等）
pub async fn create_domain_tables(db: &DatabaseConnection) -> Result<(), AppError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        (
            "users",
            schema.create_table_from_entity(Users).if_not_exists().to_owned(),
        ),
        (
            "app_settings",
            schema
                .create_table_from_entity(AppSettings)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in tables {
        db.execute(backend.build(&stmt)).await.map_err(|e| {
            tracing::error!(table = name, error = %e, "Failed to create table");
            AppError::Database(e)
        })?;
        tracing::debug!(table = name, "Table ready");
    }

    tracing::info!("✓ Domain tables created");
    Ok(())
}
