pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, DataArgs};
pub use config::{load_config, EdmConfig};
