//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are present before starting
//! operations that would otherwise fail midway. All missing variables are
//! reported at once rather than one per run.

use crate::config::settings::missing_env_vars;
use crate::config::Settings;
use crate::error::{KysyError, Result};

/// Run pre-flight checks for the configured components.
///
/// Returns Ok(()) if all required environment variables are set, or a
/// single error enumerating everything that is missing.
pub fn check(settings: &Settings) -> Result<()> {
    let missing = missing_for(&settings.store.provider, |name| std::env::var(name).ok());
    if missing.is_empty() {
        Ok(())
    } else {
        Err(KysyError::Config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )))
    }
}

/// Names of required variables missing from `lookup`, for a given store
/// provider. The in-memory store needs no Supabase credentials.
fn missing_for(provider: &str, lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    missing_env_vars(lookup)
        .into_iter()
        .filter(|name| !(provider == "memory" && name.starts_with("SUPABASE_")))
        .collect()
}
