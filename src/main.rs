use clap::Parser;
use schemata::config::{args::Cli, init_config};
use schemata::runtime::{execute, prepare};
use schemata::system::install_panic_hook;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // 安装 panic hook
    install_panic_hook("crash.log");

    // 解析命令行参数
    let cli = Cli::parse();

    // status 只读，任何情况下都返回 0
    let failure = if cli.command.is_read_only() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    // 初始化全局配置（配置文件损坏时不退回默认数据库）
    let config = match init_config(cli.config.clone(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return failure;
        }
    };

    // 初始化日志并校验配置
    let ctx = match prepare(config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return failure;
        }
    };

    execute(&cli.command, &ctx.config).await
}
