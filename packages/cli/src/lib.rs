// ABOUTME: Library side of the flagpost CLI
// ABOUTME: Configuration and logging setup plus the `tokens` admin commands

pub mod config;
pub mod logging;
pub mod tokens;

pub use config::{Config, ConfigError};
pub use tokens::TokensCommands;

#[cfg(test)]
mod tests;
