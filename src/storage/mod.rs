pub mod backend;
mod backends;
pub mod connection;
pub mod entities;
pub mod repository;
pub mod schema;

#[cfg(test)]
mod backend_tests;

pub use backend::SeaOrmBackend;
pub use connection::{connect, connect_for_migrations};
pub use repository::{NewUser, SettingValue, SettingsRepository, UserRepository};
pub use schema::create_domain_tables;
