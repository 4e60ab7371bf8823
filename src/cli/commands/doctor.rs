//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kysy Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Credentials").bold());
    let cred_checks = vec![
        check_openai_api_key(),
        check_env_var("SUPABASE_URL", "Set with: export SUPABASE_URL='https://xyz.supabase.co'"),
        check_env_var("SUPABASE_KEY", "Set with: export SUPABASE_KEY='...'"),
    ];
    for check in &cred_checks {
        check.print();
    }
    checks.extend(cred_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_store(settings), check_chunking(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Kysy.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Kysy is ready to use.");
    }

    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.chars().count() > 20 => {
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask_key(&key)))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Mask a credential for display, keeping the first 7 and last 4 characters.
///
/// Counts characters rather than bytes; env values are user-settable and may
/// contain multibyte text.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let prefix: String = chars.iter().take(7).collect();
    let suffix: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Check a required environment variable is present and non-empty.
fn check_env_var(name: &str, hint: &str) -> CheckResult {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => CheckResult::ok(name, "configured"),
        Ok(_) => CheckResult::error(name, "empty", hint),
        Err(_) => CheckResult::error(name, "not set", hint),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: kysy config edit",
        )
    }
}

/// Check the configured store provider is known.
fn check_store(settings: &Settings) -> CheckResult {
    match settings.store.provider.as_str() {
        "supabase" => CheckResult::ok(
            "Store",
            &format!(
                "supabase (table '{}', function '{}')",
                settings.store.table, settings.store.search_function
            ),
        ),
        "memory" => CheckResult::warning(
            "Store",
            "in-memory (documents are lost on exit)",
            "Set [store] provider = \"supabase\" for persistence",
        ),
        other => CheckResult::error(
            "Store",
            &format!("unknown provider '{}'", other),
            "Supported providers: supabase, memory",
        ),
    }
}

/// Sanity-check the chunking parameters.
fn check_chunking(settings: &Settings) -> CheckResult {
    let size = settings.chunking.chunk_size;
    let overlap = settings.chunking.chunk_overlap;

    if size == 0 {
        CheckResult::error(
            "Chunking",
            "chunk_size is 0",
            "Set [chunking] chunk_size to a positive value",
        )
    } else if overlap >= size {
        CheckResult::error(
            "Chunking",
            &format!("chunk_overlap ({}) >= chunk_size ({})", overlap, size),
            "Overlap must be smaller than the chunk size",
        )
    } else {
        CheckResult::ok(
            "Chunking",
            &format!("size {} chars, overlap {} chars", size, overlap),
        )
    }
}
