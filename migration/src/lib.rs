//! 基于 SQL 文件的版本化迁移引擎
//!
//! 迁移目录中的 `<version>_<description>.sql` 按版本顺序各执行一次，
//! 执行结果记录在 `schema_migrations` 表中。

pub mod discover;
pub mod entity;
pub mod error;
pub mod lock;
pub mod runner;
pub mod splitter;
pub mod status;
pub mod tracker;
pub mod version;


pub use discover::{MigrationFile, checksum, discover, filter_pending, pending, validate_sequence};
pub use error::MigrationError;
pub use lock::MigrationLock;
pub use runner::{
    AppliedMigration, FailedMigration, MigrationOptions, MigrationRunner, RunReport,
    reapply_migration, run_migrations,
};
pub use splitter::split_statements;
pub use status::{ChecksumDrift, StatusReport, collect_offline_status, collect_status};
pub use tracker::{MigrationRecord, MigrationTracker};
pub use version::{VersionParseError, format_version, parse_version};
