pub mod commands;
pub mod initializer;
pub mod startup;

pub use commands::execute;
pub use initializer::{InitReport, Initializer};
pub use startup::{StartupContext, prepare};
