use serde::{Deserialize, Serialize};

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub migrations: MigrationsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_database_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_database_min_connections")]
    pub min_connections: u32,
}

/// 迁移配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// 迁移文件目录
    #[serde(default = "default_migrations_directory")]
    pub directory: String,
    /// 迁移文件扩展名（不含点）
    #[serde(default = "default_migrations_extension")]
    pub extension: String,
    /// 运行期间是否持有 advisory lock
    #[serde(default = "default_migrations_lock")]
    pub lock: bool,
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

/// 初始管理员配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// 为空时自动生成随机密码并输出一次
    #[serde(default)]
    pub password: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// pretty | json | compact
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============ Default Functions ============

fn default_database_url() -> String {
    "sqlite://schemata.db?mode=rwc".to_string()
}

fn default_database_max_connections() -> u32 {
    10
}

fn default_database_min_connections() -> u32 {
    1
}

fn default_migrations_directory() -> String {
    "migrations".to_string()
}

fn default_migrations_extension() -> String {
    "sql".to_string()
}

fn default_migrations_lock() -> bool {
    true
}

fn default_lock_timeout_secs() -> u64 {
    60
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_enable_rotation() -> bool {
    true
}

// ============ Default Trait Implementations ============

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_database_max_connections(),
            min_connections: default_database_min_connections(),
        }
    }
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            directory: default_migrations_directory(),
            extension: default_migrations_extension(),
            lock: default_migrations_lock(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
            password: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            enable_rotation: default_enable_rotation(),
        }
    }
}
