//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::settings::missing_env_vars;
use crate::config::Settings;
use crate::error::KysyError;
use crate::store::{setup_sql, DocumentStore, SupabaseStore};
use console::style;
use std::io::{self, Write};

/// Outcome of probing the configured Supabase schema.
enum SchemaStatus {
    Ready,
    Missing,
    Unreachable(String),
}

/// Run the init command for first-time setup.
pub async fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kysy Setup");
    println!();
    println!("Welcome to Kysy! Let's make sure everything is configured correctly.\n");

    // Step 1: Check credentials
    println!("{}", style("Step 1: Checking credentials").bold().cyan());
    println!();

    let missing = missing_env_vars(|name| std::env::var(name).ok());

    if !missing.is_empty() {
        Output::warning("Some required environment variables are missing:");
        println!();
        for name in &missing {
            println!("  {} {} - not set", style("✗").red(), style(name).bold());
            println!("    {} {}", style("→").dim(), style(export_hint(name)).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Set the variables above and run 'kysy init' again.");
            return Ok(());
        }
    } else {
        Output::success("All required credentials are set!");
    }

    println!();

    // Step 2: Check document store schema
    println!("{}", style("Step 2: Checking document store").bold().cyan());
    println!();

    match settings.store.provider.as_str() {
        "memory" => {
            Output::info("Store provider is 'memory'; no database setup needed.");
        }
        _ => match check_schema(settings).await {
            SchemaStatus::Ready => {
                Output::success(&format!(
                    "Table '{}' and function '{}' are in place.",
                    settings.store.table, settings.store.search_function
                ));
            }
            SchemaStatus::Missing => {
                Output::warning("The expected table or function is missing.");
                print_setup_sql(settings);
            }
            SchemaStatus::Unreachable(cause) => {
                Output::warning(&format!("Could not verify the schema: {}", cause));
                print_setup_sql(settings);
            }
        },
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("kysy config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("kysy doctor").cyan());
    println!("  {} Add your first document", style("kysy add \"<text>\"").cyan());
    println!("  {} Ask questions about your documents", style("kysy chat").cyan());
    println!();
    println!("For more help: {}", style("kysy --help").cyan());

    Ok(())
}

/// Probe the configured table and search function with a minimal query.
///
/// PostgREST reports a missing relation or function as a schema error, which
/// is exactly the signal needed to decide whether to print the setup SQL.
async fn check_schema(settings: &Settings) -> SchemaStatus {
    let store = match SupabaseStore::from_env(&settings.store) {
        Ok(store) => store,
        Err(e) => return SchemaStatus::Unreachable(e.to_string()),
    };

    let mut probe = vec![0.0f32; settings.embedding.dimensions as usize];
    probe[0] = 1.0;

    match store.search(&probe, 1, None).await {
        Ok(_) => SchemaStatus::Ready,
        Err(KysyError::Schema(_)) => SchemaStatus::Missing,
        Err(e) => SchemaStatus::Unreachable(e.to_string()),
    }
}

/// Print the schema SQL with instructions.
fn print_setup_sql(settings: &Settings) {
    println!();
    println!(
        "  Run the following in the Supabase SQL editor ({}):",
        style("Dashboard → SQL Editor").dim()
    );
    println!();
    for line in setup_sql(&settings.store, settings.embedding.dimensions).lines() {
        println!("    {}", line);
    }
    println!("  Then run {} to verify.", style("kysy init").green());
}

/// Shell hint for setting a required environment variable.
fn export_hint(name: &str) -> &'static str {
    match name {
        "OPENAI_API_KEY" => "Set with: export OPENAI_API_KEY='sk-...'",
        "SUPABASE_URL" => "Set with: export SUPABASE_URL='https://xyz.supabase.co'",
        "SUPABASE_KEY" => "Set with: export SUPABASE_KEY='...'",
        _ => "Set this variable in your shell configuration",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_hint_names_the_variable() {
        assert!(export_hint("OPENAI_API_KEY").contains("OPENAI_API_KEY"));
        assert!(export_hint("SUPABASE_URL").contains("SUPABASE_URL"));
        assert!(export_hint("SUPABASE_KEY").contains("SUPABASE_KEY"));
    }
}
