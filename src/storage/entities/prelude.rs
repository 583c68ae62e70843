pub use super::app_settings::Entity as AppSettings;
pub use super::users::Entity as Users;
