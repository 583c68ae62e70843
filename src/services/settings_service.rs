use async_trait::async_trait;
use std::sync::Arc;

use super::{SeedOutcome, Seeder};
use crate::errors::AppError;
use crate::storage::{SeaOrmBackend, SettingValue, SettingsRepository};

/// 一条默认配置
pub struct DefaultSetting {
    pub key: &'static str,
    pub value: SettingValue,
    pub description: &'static str,
}

/// 初始化时写入的默认配置
pub fn default_settings() -> Vec<DefaultSetting> {
    vec![
        DefaultSetting {
            key: "allow_registration",
            value: SettingValue::Bool(false),
            description: "是否允许新用户注册",
        },
        DefaultSetting {
            key: "site_name",
            value: SettingValue::String("Schemata".to_string()),
            description: "站点名称",
        },
        DefaultSetting {
            key: "default_locale",
            value: SettingValue::String("zh-CN".to_string()),
            description: "默认语言",
        },
        DefaultSetting {
            key: "scheduler_enabled",
            value: SettingValue::Bool(true),
            description: "是否启用定时发布",
        },
        DefaultSetting {
            key: "publish_batch_size",
            value: SettingValue::Int(20),
            description: "每轮定时发布的最大条目数",
        },
    ]
}

/// 默认配置写入服务，已存在的键保持原值
pub struct SettingsService {
    storage: Arc<SeaOrmBackend>,
}

impl SettingsService {
    pub fn new(storage: Arc<SeaOrmBackend>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Seeder for SettingsService {
    fn name(&self) -> &'static str {
        "settings"
    }

    async fn seed(&self) -> Result<SeedOutcome, AppError> {
        let mut outcome = SeedOutcome::default();

        for setting in default_settings() {
            if self.storage.find_setting(setting.key).await?.is_some() {
                tracing::debug!(key = setting.key, "Setting already present, skipping");
                outcome.skipped += 1;
                continue;
            }

            self.storage
                .insert_setting(setting.key, &setting.value, Some(setting.description))
                .await?;
            tracing::info!(key = setting.key, "Default setting created");
            outcome.created += 1;
        }

        Ok(outcome)
    }
}
