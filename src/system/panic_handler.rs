//! Panic handler module
//!
//! 命令执行中发生 panic 时，在终端输出彩色报告并追加写入崩溃日志。
//! 迁移可能中途停止，报告里提示先查看 `status`。

use chrono::Utc;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::{Path, PathBuf};

const RULE: &str = "═══════════════════════════════════════════════════";

/// 安装自定义 panic hook，崩溃信息写入 `crash_log`
pub fn install_panic_hook(crash_log: impl Into<PathBuf>) {
    let crash_log = crash_log.into();

    panic::set_hook(Box::new(move |info| {
        let message = panic_message(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());
        let backtrace = Backtrace::force_capture();

        if let Err(e) = write_crash_log(&crash_log, &message, &location, &backtrace) {
            eprintln!("Failed to write crash log {}: {}", crash_log.display(), e);
        }

        display_panic(&crash_log, &message, &location, &backtrace);
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn display_panic(crash_log: &Path, message: &str, location: &str, backtrace: &Backtrace) {
    use colored::Colorize;

    eprintln!();
    eprintln!("{}", RULE.red().bold());
    eprintln!("{}", "PANIC".red().bold());
    eprintln!("{}", RULE.red().bold());
    eprintln!("{} {}", "原因:".yellow().bold(), message.white());
    eprintln!("{} {}", "位置:".yellow().bold(), location.white());
    eprintln!();
    eprintln!("{}", "堆栈跟踪:".yellow().bold());
    eprintln!("{}", format!("{:?}", backtrace).dimmed());
    eprintln!();
    eprintln!(
        "{}",
        format!("详细信息已保存到 {}", crash_log.display()).cyan()
    );
    eprintln!(
        "{}",
        "迁移可能只完成了一部分，请先运行 `schemata status` 确认状态".cyan()
    );
    eprintln!("{}", RULE.red().bold());
    eprintln!();
}

fn write_crash_log(
    path: &Path,
    message: &str,
    location: &str,
    backtrace: &Backtrace,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    writeln!(file, "==========================================")?;
    writeln!(
        file,
        "Crash Report - {} (schemata v{})",
        timestamp,
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(file, "Command: {}", std::env::args().collect::<Vec<_>>().join(" "))?;
    writeln!(file, "Message: {}", message)?;
    writeln!(file, "Location: {}", location)?;
    writeln!(file, "\nBacktrace:\n{:?}", backtrace)?;
    writeln!(file, "==========================================\n")?;

    Ok(())
}
