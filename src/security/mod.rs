pub mod password;
pub mod token;

pub use password::PasswordManager;
pub use token::{generate_initial_password, generate_random_string};
