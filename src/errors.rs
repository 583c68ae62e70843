use migration::MigrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    // 迁移错误
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Migrations incomplete: {succeeded} of {total} pending migrations applied")]
    MigrationsIncomplete { succeeded: usize, total: usize },

    // 初始化数据错误
    #[error("Seeding failed ({step}): {message}")]
    Seed { step: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // 通用错误
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "E001",
            AppError::Migration(_) => "E002",
            AppError::MigrationsIncomplete { .. } => "E003",
            AppError::Seed { .. } => "E004",
            AppError::Io(_) => "E005",
            AppError::Internal(_) => "E014",
            AppError::Config(_) => "E015",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database Error",
            AppError::Migration(_) => "Migration Error",
            AppError::MigrationsIncomplete { .. } => "Migrations Incomplete",
            AppError::Seed { .. } => "Seeding Error",
            AppError::Io(_) => "I/O Error",
            AppError::Internal(_) => "Internal Error",
            AppError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }
}
