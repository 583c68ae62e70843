//! 初始化数据服务
//!
//! 迁移完成后写入默认配置与初始管理员。两者都可重复执行。

mod admin_service;
mod settings_service;

use async_trait::async_trait;

use crate::errors::AppError;

pub use admin_service::AdminSeeder;
pub use settings_service::{DefaultSetting, default_settings, SettingsService};

/// 一次写入的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub created: usize,
    pub skipped: usize,
}

/// 初始化数据写入器
#[async_trait]
pub trait Seeder: Send + Sync {
    /// 步骤名，用于日志和错误信息
    fn name(&self) -> &'static str;

    async fn seed(&self) -> Result<SeedOutcome, AppError>;
}
