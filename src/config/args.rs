//! 命令行参数解析

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "schemata", version, about = "Versioned SQL migrations and database bootstrap")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 配置文件路径，默认使用当前目录下的 config.toml
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// 覆盖配置中的迁移目录
    #[arg(long, global = true, value_name = "DIR")]
    pub migrations_dir: Option<PathBuf>,

    /// 覆盖配置中的数据库连接串
    #[arg(long, global = true, value_name = "URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 建表、执行迁移、写入默认配置并创建管理员账号
    Init,

    /// 仅执行待应用的迁移
    Migrate {
        /// 强制重新执行一个已应用的版本
        #[arg(long, value_name = "VERSION")]
        force: Option<u32>,
    },

    /// 显示迁移历史与待执行列表（只读，总是返回 0）
    Status {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// 提取对配置的覆盖项
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.database_url.clone(),
            migrations_dir: self.migrations_dir.clone(),
        }
    }
}

impl Command {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Command::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["schemata", "init"]).unwrap();
        assert_eq!(cli.command, Command::Init);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_config_flag_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["schemata", "-c", "custom.toml", "migrate"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));

        let cli = Cli::try_parse_from(["schemata", "status", "--config=other.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("other.toml"));
    }

    #[test]
    fn test_parse_migrate_force() {
        let cli = Cli::try_parse_from(["schemata", "migrate", "--force", "3"]).unwrap();
        assert_eq!(cli.command, Command::Migrate { force: Some(3) });
        assert!(!cli.command.is_read_only());
    }

    #[test]
    fn test_parse_status_json_with_overrides() {
        let cli = Cli::try_parse_from([
            "schemata",
            "--migrations-dir",
            "db/migrations",
            "--database-url",
            "sqlite://test.db",
            "status",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::Status { json: true });
        assert!(cli.command.is_read_only());

        let overrides = cli.overrides();
        assert_eq!(overrides.migrations_dir, Some(PathBuf::from("db/migrations")));
        assert_eq!(overrides.database_url.as_deref(), Some("sqlite://test.db"));
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["schemata", "rollback"]).is_err());
        assert!(Cli::try_parse_from(["schemata"]).is_err());
    }
}
