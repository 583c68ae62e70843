pub mod args;
mod loader;
mod structs;

pub use loader::{ConfigOverrides, init_config};
pub use structs::{AdminConfig, AppConfig, DatabaseConfig, LogConfig, MigrationsConfig};
