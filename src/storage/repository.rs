use async_trait::async_trait;

use super::entities::{app_settings, users};
use crate::errors::AppError;

/// 配置项的值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl SettingValue {
    pub fn value_type(&self) -> &'static str {
        match self {
            SettingValue::String(_) => "string",
            SettingValue::Int(_) => "int",
            SettingValue::Bool(_) => "bool",
        }
    }
}

/// 新建用户所需字段
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser<'_>) -> Result<users::Model, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, AppError>;
    async fn count_by_role(&self, role: &str) -> Result<u64, AppError>;
}

/// 配置仓储
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn find_setting(&self, key: &str) -> Result<Option<app_settings::Model>, AppError>;
    async fn insert_setting(
        &self,
        key: &str,
        value: &SettingValue,
        description: Option<&str>,
    ) -> Result<(), AppError>;
}
