use tracing_appender::non_blocking::WorkerGuard;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::system::init_logging;

/// 命令启动上下文
pub struct StartupContext {
    pub config: AppConfig,
    _log_guard: Option<WorkerGuard>,
}

/// 初始化日志并校验配置
pub fn prepare(config: AppConfig) -> Result<StartupContext, AppError> {
    // 1. 初始化日志
    let log_guard = init_logging(&config.log);
    tracing::info!("schemata v{} starting...", env!("CARGO_PKG_VERSION"));

    // 2. 验证配置
    config.validate()?;
    tracing::debug!(
        directory = %config.migrations.directory,
        extension = %config.migrations.extension,
        lock = config.migrations.lock,
        "Configuration validated"
    );

    Ok(StartupContext {
        config,
        _log_guard: log_guard,
    })
}
