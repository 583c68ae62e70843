use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use crate::errors::AppError;
use crate::storage::entities::{prelude::*, *};
use crate::storage::repository::*;

use super::super::backend::SeaOrmBackend;

// 配置管理方法
#[async_trait]
impl SettingsRepository for SeaOrmBackend {
    async fn find_setting(&self, key: &str) -> Result<Option<app_settings::Model>, AppError> {
        let setting = AppSettings::find()
            .filter(app_settings::Column::Key.eq(key))
            .one(self.db.as_ref())
            .await?;
        Ok(setting)
    }

    async fn insert_setting(
        &self,
        key: &str,
        value: &SettingValue,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        let mut setting = app_settings::ActiveModel {
            key: Set(key.to_string()),
            value_type: Set(value.value_type().to_string()),
            value_string: Set(None),
            value_int: Set(None),
            value_bool: Set(None),
            description: Set(description.map(|d| d.to_string())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        // 根据类型写入对应的列
        match value {
            SettingValue::String(v) => setting.value_string = Set(Some(v.clone())),
            SettingValue::Int(v) => setting.value_int = Set(Some(*v)),
            SettingValue::Bool(v) => setting.value_bool = Set(Some(*v)),
        }

        setting.insert(self.db.as_ref()).await?;
        Ok(())
    }
}
