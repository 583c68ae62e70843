pub mod prelude;

pub mod app_settings;
pub mod users;
