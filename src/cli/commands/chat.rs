//! Interactive chat command.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Words that end the chat session (case-insensitive).
const EXIT_WORDS: &[&str] = &["lopeta", "quit", "exit"];

/// Run the interactive chat command.
pub async fn run_chat(thread: &str, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kysy doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let engine = RagEngine::new(settings)?;

    println!("\n{}", style("Kysy Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask questions about your documents. Type 'exit', 'quit' or 'lopeta' to leave.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // End of input, e.g. piped stdin ran out.
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if is_exit_word(input) {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let result = engine.ask(input, thread).await;
        spinner.finish_and_clear();

        println!("\n{} {}", style("Kysy:").cyan().bold(), result.answer);
        println!(
            "{}\n",
            style(format!("({} documents retrieved)", result.retrieved_docs.len())).dim()
        );
    }

    Ok(())
}

fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit_word("exit"));
        assert!(is_exit_word("QUIT"));
        assert!(is_exit_word("Lopeta"));
        assert!(!is_exit_word("continue"));
        assert!(!is_exit_word(""));
    }
}
