//! Configuration management for Kysy.

pub mod prompts;
pub mod settings;

pub use prompts::Prompts;
pub use settings::Settings;
