use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use migration::MigrationOptions;

use super::{AppConfig, MigrationsConfig};
use crate::errors::AppError;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 命令行参数对配置的覆盖（优先级最高）
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub migrations_dir: Option<PathBuf>,
}

impl AppConfig {
    /// 从文件加载配置,支持环境变量覆盖
    ///
    /// # 参数
    /// * `config_path` - 可选的配置文件路径
    ///   - `Some(path)`: 使用指定文件（不存在则创建）
    ///   - `None`: 使用默认 "config.toml"（不存在则警告）
    pub fn load(config_path: Option<&str>) -> Result<Self, AppError> {
        let mut config = Self::load_from_file(config_path)?;
        config.override_with_env();
        Ok(config)
    }

    /// 从 TOML 文件加载配置
    ///
    /// # 行为
    /// - 如果提供 `config_path` 且文件不存在: 创建默认配置文件
    /// - 如果未提供路径且文件不存在: 警告并使用内存默认值
    /// - 文件存在但无法读取或解析: 返回错误，不会退回默认数据库
    fn load_from_file(config_path: Option<&str>) -> Result<Self, AppError> {
        let path = config_path.unwrap_or("config.toml");
        let is_custom_path = config_path.is_some();

        if !Path::new(path).exists() {
            if !is_custom_path {
                eprintln!("[WARN] 未找到配置文件: {}", path);
                eprintln!("[WARN] 使用内存默认配置");
                eprintln!("[HINT] 使用 -c/--config 指定自定义配置文件");
                return Ok(Self::default());
            }

            eprintln!("[WARN] 配置文件不存在: {}", path);
            eprintln!("[WARN] 正在创建默认配置文件...");
            let config = Self::default();
            config.save_to_file(path).map_err(|e| {
                AppError::Config(format!("Failed to create config file {}: {}", path, e))
            })?;
            eprintln!("[INFO] 配置文件已创建: {}", path);
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file {}: {}", path, e)))?;
        let config = toml::from_str::<AppConfig>(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {}: {}", path, e)))?;

        eprintln!("[INFO] 配置已从文件加载: {}", path);
        Ok(config)
    }

    /// 用环境变量覆盖配置
    fn override_with_env(&mut self) {
        self.override_with(|key| env::var(key).ok());
    }

    /// 用任意键值来源覆盖配置（环境变量名作为键）
    pub fn override_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 数据库配置
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max_conn) = lookup("DATABASE_MAX_CONNECTIONS") {
            if let Ok(n) = max_conn.parse() {
                self.database.max_connections = n;
            } else {
                eprintln!("[ERROR] 无效的 DATABASE_MAX_CONNECTIONS: {}", max_conn);
            }
        }
        if let Some(min_conn) = lookup("DATABASE_MIN_CONNECTIONS") {
            if let Ok(n) = min_conn.parse() {
                self.database.min_connections = n;
            } else {
                eprintln!("[ERROR] 无效的 DATABASE_MIN_CONNECTIONS: {}", min_conn);
            }
        }

        // 迁移配置
        if let Some(dir) = lookup("MIGRATIONS_DIR") {
            self.migrations.directory = dir;
        }
        if let Some(ext) = lookup("MIGRATIONS_EXTENSION") {
            self.migrations.extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(enable) = lookup("MIGRATIONS_LOCK") {
            self.migrations.lock = enable == "true" || enable == "1";
        }
        if let Some(timeout) = lookup("MIGRATIONS_LOCK_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.migrations.lock_timeout_secs = n;
            } else {
                eprintln!("[ERROR] 无效的 MIGRATIONS_LOCK_TIMEOUT: {}", timeout);
            }
        }

        // 管理员配置
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }

        // 日志配置
        if let Some(level) = lookup("RUST_LOG") {
            self.log.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = format;
        }
        if let Some(file) = lookup("LOG_FILE") {
            self.log.file = Some(file);
        }
        if let Some(enable) = lookup("LOG_ENABLE_ROTATION") {
            self.log.enable_rotation = enable == "true" || enable == "1";
        }
    }

    /// 应用命令行覆盖
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.database_url {
            self.database.url = url.clone();
        }
        if let Some(dir) = &overrides.migrations_dir {
            self.migrations.directory = dir.to_string_lossy().into_owned();
        }
    }

    /// 保存当前配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        // 如果需要,创建父目录
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::Config("Database URL must not be empty".into()));
        }

        if self.migrations.extension.trim().is_empty() {
            return Err(AppError::Config(
                "Migration file extension must not be empty".into(),
            ));
        }

        if self.admin.username.trim().is_empty() {
            return Err(AppError::Config("Admin username must not be empty".into()));
        }

        if let Some(password) = &self.admin.password
            && password.len() < 8
        {
            return Err(AppError::Config(
                "Admin password must be at least 8 characters".into(),
            ));
        }

        Ok(())
    }
}

impl MigrationsConfig {
    /// 转换为迁移引擎的运行参数
    pub fn options(&self) -> MigrationOptions {
        MigrationOptions {
            directory: PathBuf::from(&self.directory),
            extension: self.extension.clone(),
            lock: self.lock,
            lock_timeout: Duration::from_secs(self.lock_timeout_secs),
        }
    }
}

// ============ 全局配置实例 ============

/// 初始化全局配置
///
/// # 参数
/// * `config_path` - 可选的配置文件路径
///   - `Some(path)`: 从指定文件加载（不存在则创建）
///   - `None`: 从默认 "config.toml" 加载（不存在则警告）
/// * `overrides` - 命令行覆盖，优先于文件和环境变量
pub fn init_config(
    config_path: Option<String>,
    overrides: &ConfigOverrides,
) -> Result<&'static AppConfig, AppError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let mut config = AppConfig::load(config_path.as_deref())?;
    config.apply_overrides(overrides);
    Ok(CONFIG.get_or_init(|| config))
}
