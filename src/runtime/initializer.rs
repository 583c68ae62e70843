//! 初始化流程
//!
//! 固定顺序：建领域表 → 执行迁移 → 写入默认配置 → 创建管理员。
//! 任一步失败即记录日志并中止，后续步骤不再执行；各步骤之间没有事务。

use migration::{MigrationOptions, RunReport, run_migrations};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::errors::AppError;
use crate::services::{SeedOutcome, Seeder};
use crate::storage::create_domain_tables;

#[derive(Debug, Clone)]
pub struct InitReport {
    pub migrations: RunReport,
    pub settings: SeedOutcome,
    pub admin: SeedOutcome,
}

pub struct Initializer {
    db: Arc<DatabaseConnection>,
    options: MigrationOptions,
    settings: Arc<dyn Seeder>,
    admin: Arc<dyn Seeder>,
}

impl Initializer {
    pub fn new(
        db: Arc<DatabaseConnection>,
        options: MigrationOptions,
        settings: Arc<dyn Seeder>,
        admin: Arc<dyn Seeder>,
    ) -> Self {
        Self {
            db,
            options,
            settings,
            admin,
        }
    }

    pub async fn run(&self) -> Result<InitReport, AppError> {
        // 1. 领域表
        tracing::info!("Creating domain tables...");
        create_domain_tables(&self.db).await.inspect_err(|e| {
            tracing::error!(error = %e, "Table creation failed, aborting initialization");
        })?;

        // 2. SQL 迁移
        tracing::info!("Running database migrations...");
        let migrations = run_migrations(self.db.clone(), &self.options)
            .await
            .map_err(AppError::from)
            .and_then(|report| {
                if report.is_success() {
                    Ok(report)
                } else {
                    Err(AppError::MigrationsIncomplete {
                        succeeded: report.succeeded(),
                        total: report.total_pending,
                    })
                }
            })
            .inspect_err(|e| {
                tracing::error!(error = %e, "Migrations failed, aborting initialization");
            })?;
        tracing::info!(
            applied = migrations.succeeded(),
            "✓ Migrations complete"
        );

        // 3. 默认配置
        let settings = self.seed(self.settings.as_ref()).await?;

        // 4. 管理员
        let admin = self.seed(self.admin.as_ref()).await?;

        tracing::info!("Initialization complete");
        Ok(InitReport {
            migrations,
            settings,
            admin,
        })
    }

    async fn seed(&self, seeder: &dyn Seeder) -> Result<SeedOutcome, AppError> {
        tracing::info!(step = seeder.name(), "Seeding...");
        let outcome = seeder.seed().await.inspect_err(|e| {
            tracing::error!(
                step = seeder.name(),
                error = %e,
                "Seeding failed, aborting initialization"
            );
        })?;
        tracing::info!(
            step = seeder.name(),
            created = outcome.created,
            skipped = outcome.skipped,
            "✓ Seeding complete"
        );
        Ok(outcome)
    }
}
