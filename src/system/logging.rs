use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// 初始化日志
///
/// 终端输出写到 stderr，stdout 留给命令本身的输出。
/// 配置了 `file` 时额外写入文件，返回的 guard 需要持有到进程结束。
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path, config.enable_rotation);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => {
            // pretty format (default)
            registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init()
        }
    }

    tracing::debug!("Logging initialized with level: {}", config.level);
    guard
}

fn file_writer(
    path: &str,
    enable_rotation: bool,
) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let path = Path::new(path);
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "schemata.log".into());

    let appender = if enable_rotation {
        rolling::daily(directory, file_name)
    } else {
        rolling::never(directory, file_name)
    };

    tracing_appender::non_blocking(appender)
}
