//! 子命令处理
//!
//! `init`/`migrate` 失败返回退出码 1；`status` 只读，总是返回 0。

use colored::Colorize;
use migration::{
    MigrationTracker, RunReport, StatusReport, collect_offline_status, collect_status,
    format_version, reapply_migration, run_migrations,
};
use sea_orm::DatabaseConnection;
use std::process::ExitCode;
use std::sync::Arc;

use super::initializer::{InitReport, Initializer};
use crate::config::{AppConfig, args::Command};
use crate::errors::AppError;
use crate::services::{AdminSeeder, SettingsService};
use crate::storage::{SeaOrmBackend, connect_for_migrations};

/// 执行子命令并转换为退出码
pub async fn execute(command: &Command, config: &AppConfig) -> ExitCode {
    match command {
        Command::Init => finish(run_init(config).await.map(|report| print_init(&report))),
        Command::Migrate { force } => {
            finish(run_migrate(config, *force).await.map(|report| print_run(&report)))
        }
        Command::Status { json } => {
            match run_status(config).await {
                Ok(report) if *json => match serde_json::to_string_pretty(&report) {
                    Ok(out) => println!("{}", out),
                    Err(e) => eprintln!("{}", AppError::Internal(e.to_string()).format_colored()),
                },
                Ok(report) => print!("{}", format_status(&report)),
                Err(e) => eprintln!("{}", e.format_colored()),
            }
            ExitCode::SUCCESS
        }
    }
}

fn finish(result: Result<(), AppError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "Command failed");
            eprintln!("{}", e.format_colored());
            ExitCode::FAILURE
        }
    }
}

async fn open(config: &AppConfig) -> Result<Arc<DatabaseConnection>, AppError> {
    tracing::info!("Connecting to database: {}", config.database.url);
    let db = connect_for_migrations(&config.database).await?;
    tracing::info!("Database connected");
    Ok(Arc::new(db))
}

/// 完整初始化：建表、迁移、默认配置、管理员
pub async fn run_init(config: &AppConfig) -> Result<InitReport, AppError> {
    let db = open(config).await?;
    let storage = Arc::new(SeaOrmBackend::new(db.clone()));

    Initializer::new(
        db,
        config.migrations.options(),
        Arc::new(SettingsService::new(storage.clone())),
        Arc::new(AdminSeeder::new(storage, config.admin.clone())),
    )
    .run()
    .await
}

/// 仅执行迁移；`force` 指定时重新执行该已应用版本
pub async fn run_migrate(config: &AppConfig, force: Option<u32>) -> Result<RunReport, AppError> {
    let db = open(config).await?;
    let options = config.migrations.options();

    let report = match force {
        Some(version) => reapply_migration(db, &options, version).await?,
        None => run_migrations(db, &options).await?,
    };

    if report.is_success() {
        Ok(report)
    } else {
        print_run(&report);
        Err(AppError::MigrationsIncomplete {
            succeeded: report.succeeded(),
            total: report.total_pending,
        })
    }
}

/// 读取迁移状态
///
/// 数据库不可用或记账表无法创建时，仍根据磁盘列出待执行的迁移。
pub async fn run_status(config: &AppConfig) -> Result<StatusReport, AppError> {
    let options = config.migrations.options();

    let db = match open(config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Database unavailable, reporting from disk only");
            return Ok(collect_offline_status(&options, &e.to_string())?);
        }
    };

    let report = match MigrationTracker::new(db).await {
        Ok(tracker) => collect_status(&tracker, &options).await?,
        Err(e) => {
            tracing::error!(error = %e, "Tracking table unavailable, reporting from disk only");
            collect_offline_status(&options, &e.to_string())?
        }
    };
    Ok(report)
}

fn print_run(report: &RunReport) {
    if report.total_pending == 0 {
        println!("{}", "Database schema is up to date".green());
        return;
    }

    for applied in &report.applied {
        println!(
            "  {} {} ({} ms)",
            "✓".green(),
            applied.filename,
            applied.execution_time_ms
        );
    }
    if let Some(failed) = &report.failure {
        println!("  {} {}", "✗".red(), failed.filename);
        println!("    {}", failed.error.red());
    }
    println!(
        "{}/{} pending migrations applied",
        report.succeeded(),
        report.total_pending
    );
}

fn print_init(report: &InitReport) {
    print_run(&report.migrations);
    println!(
        "Settings: {} created, {} kept",
        report.settings.created, report.settings.skipped
    );
    if report.admin.created > 0 {
        println!("Administrator: created");
    } else {
        println!("Administrator: already present");
    }
    println!("{}", "Initialization complete".green().bold());
}

/// 渲染状态报告（文本）
pub fn format_status(report: &StatusReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Applied migrations:".bold()));
    if report.history.is_empty() {
        out.push_str("  (none)\n");
    }
    for record in &report.history {
        out.push_str(&format!(
            "  {} {}  {}  {} ms\n",
            record.version.green(),
            record.filename,
            record.applied_at.format("%Y-%m-%d %H:%M:%S UTC"),
            record.execution_time_ms
        ));
    }

    out.push_str(&format!("{}\n", "Pending migrations:".bold()));
    if report.pending.is_empty() {
        out.push_str("  (none)\n");
    }
    for file in &report.pending {
        out.push_str(&format!(
            "  {} {}\n",
            format_version(file.version).yellow(),
            file.raw_name
        ));
    }

    if let Some(problem) = &report.sequence_error {
        out.push_str(&format!("{} {}\n", "Sequence problem:".red().bold(), problem));
    }

    for error in &report.read_errors {
        out.push_str(&format!("{} {}\n", "Incomplete:".red().bold(), error));
    }

    for drift in &report.drift {
        out.push_str(&format!(
            "{} {} changed on disk after it was applied\n",
            "Checksum drift:".yellow().bold(),
            drift.filename
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, MigrationsConfig};
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(dir: &Path) -> AppConfig {
        let db_path = dir.join("app.db");
        let migrations = dir.join("migrations");
        std::fs::create_dir_all(&migrations).unwrap();

        AppConfig {
            database: DatabaseConfig {
                url: format!("sqlite://{}", db_path.display()),
                ..Default::default()
            },
            migrations: MigrationsConfig {
                directory: migrations.to_string_lossy().into_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn write(config: &AppConfig, name: &str, sql: &str) {
        std::fs::write(Path::new(&config.migrations.directory).join(name), sql).unwrap();
    }

    #[tokio::test]
    async fn test_migrate_then_status() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        write(&config, "01_posts.sql", "CREATE TABLE posts (id INTEGER);");
        write(&config, "02_tags.sql", "CREATE TABLE tags (id INTEGER);");

        let report = run_migrate(&config, None).await.unwrap();
        assert_eq!(report.succeeded(), 2);

        write(&config, "03_links.sql", "CREATE TABLE links (id INTEGER);");
        let status = run_status(&config).await.unwrap();
        assert_eq!(status.applied, vec![1, 2]);
        assert_eq!(status.pending.len(), 1);

        let text = format_status(&status);
        assert!(text.contains("01_posts.sql"));
        assert!(text.contains("03 03_links.sql"));
        assert!(!text.contains("Sequence problem"));
    }

    #[tokio::test]
    async fn test_migrate_failure_is_incomplete() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path());
        write(&config, "01_ok.sql", "CREATE TABLE ok (id INTEGER);");
        write(&config, "02_bad.sql", "NOT VALID SQL;");

        let err = run_migrate(&config, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::MigrationsIncomplete {
                succeeded: 1,
                total: 2
            }
        ));
        let code = execute(&Command::Migrate { force: None }, &config).await;
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }

    #[tokio::test]
    async fn test_status_always_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(dir.path());
        config.migrations.directory = dir
            .path()
            .join("missing")
            .to_string_lossy()
            .into_owned();

        assert!(run_status(&config).await.is_err());
        let code = execute(&Command::Status { json: false }, &config).await;
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::SUCCESS));
    }

    #[tokio::test]
    async fn test_status_without_database_lists_pending_from_disk() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let mut config = config_for(dir.path());
        config.database.url = format!(
            "sqlite://{}",
            dir.path().join("no-such-dir").join("app.db").display()
        );
        write(&config, "01_posts.sql", "CREATE TABLE posts (id INTEGER);");

        let status = run_status(&config).await.unwrap();
        assert_eq!(status.pending.len(), 1);
        assert!(status.history.is_empty());
        assert_eq!(status.read_errors.len(), 1);
        assert!(format_status(&status).contains("Incomplete: database unavailable"));
    }

    #[tokio::test]
    async fn test_init_seeds_once() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(dir.path());
        config.admin.password = Some("correct-horse".into());
        write(&config, "01_posts.sql", "CREATE TABLE posts (id INTEGER);");

        let first = run_init(&config).await.unwrap();
        assert_eq!(first.admin.created, 1);
        assert!(first.settings.created > 0);

        let second = run_init(&config).await.unwrap();
        assert_eq!(second.migrations.total_pending, 0);
        assert_eq!(second.settings.created, 0);
        assert_eq!(second.admin.created, 0);
    }
}
