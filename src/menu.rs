// src/menu.rs
// =============================================================================
// Interactive mode: ask for a URL once, then let the user run features against
// it from a numbered list until they choose Exit (or stdin closes).
//
// Each choice is turned into the same `Commands` value the CLI would build and
// handed back to main's dispatcher, so both entry points behave the same.
// A failing feature prints its error and waits for Enter; the menu stays up.
// =============================================================================

use crate::benchmark::DEFAULT_RUNS;
use crate::cli::{parse_site_url, Commands};
use crate::config::{Settings, DEFAULT_INTERVAL_MINUTES};
use crate::net::HttpClient;
use crate::schedule::Interrupts;
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use url::Url;

/// Line-based prompt over stdin
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints `question` and reads one line; None once stdin is closed
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question}");
        std::io::stdout().flush().context("could not flush stdout")?;
        let line = self
            .lines
            .next_line()
            .await
            .context("could not read from stdin")?;
        Ok(line.map(|line| line.trim().to_string()))
    }
}

/// What the user picked from the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Mirror,
    Monitor,
    Stats,
    Benchmark,
    Embed,
    Watch,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Choice::Mirror),
            "2" => Some(Choice::Monitor),
            "3" => Some(Choice::Stats),
            "4" => Some(Choice::Benchmark),
            "5" => Some(Choice::Embed),
            "6" => Some(Choice::Watch),
            "7" => Some(Choice::Exit),
            _ => None,
        }
    }
}

fn print_menu(url: &Url) {
    println!();
    println!("🌐 Target: {url}");
    println!("{}", "=".repeat(40));
    println!("1. Mirror website (HTML, CSS, JS, images)");
    println!("2. Monitor uptime");
    println!("3. Content statistics");
    println!("4. Response time benchmark");
    println!("5. Generate embed preview");
    println!("6. Watch for changes");
    println!("7. Exit");
}

/// Interval answers that are not a whole number end up below 1 and fall back
fn parse_interval(input: &str) -> i64 {
    input.trim().parse().unwrap_or(0)
}

pub async fn run_menu(settings: &Settings, client: &HttpClient, interrupts: &Interrupts) -> Result<()> {
    let mut prompt = Prompt::new();

    let url = loop {
        let Some(answer) = prompt.ask("Enter website URL: ").await? else {
            return Ok(());
        };
        match parse_site_url(&answer) {
            Ok(url) => break url,
            Err(message) => println!("❌ {message}"),
        }
    };

    loop {
        print_menu(&url);
        let Some(answer) = prompt.ask("Select an option (1-7): ").await? else {
            return Ok(());
        };
        let Some(choice) = Choice::parse(&answer) else {
            println!("⚠️  Invalid option, please enter a number from 1 to 7");
            continue;
        };

        let url = url.clone();
        let command = match choice {
            Choice::Mirror => Commands::Mirror { url },
            Choice::Stats => Commands::Stats { url, json: false },
            Choice::Benchmark => Commands::Benchmark {
                url,
                runs: DEFAULT_RUNS,
                json: false,
            },
            Choice::Embed => Commands::Embed { url, json: false },
            Choice::Monitor | Choice::Watch => {
                let question =
                    format!("Check interval in minutes (default {DEFAULT_INTERVAL_MINUTES}): ");
                let Some(answer) = prompt.ask(&question).await? else {
                    return Ok(());
                };
                let interval = parse_interval(&answer);
                if choice == Choice::Monitor {
                    Commands::Monitor { url, interval }
                } else {
                    Commands::Watch { url, interval }
                }
            }
            Choice::Exit => {
                println!("👋 Goodbye!");
                return Ok(());
            }
        };

        if let Err(error) = crate::execute(command, settings, client, interrupts).await {
            println!("❌ Error: {error:#}");
        }

        if prompt
            .ask("\nPress Enter to return to the menu...")
            .await?
            .is_none()
        {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse("1"), Some(Choice::Mirror));
        assert_eq!(Choice::parse(" 6 "), Some(Choice::Watch));
        assert_eq!(Choice::parse("7"), Some(Choice::Exit));
        assert_eq!(Choice::parse("8"), None);
        assert_eq!(Choice::parse("mirror"), None);
        assert_eq!(Choice::parse(""), None);
    }

    #[test]
    fn test_interval_answers() {
        assert_eq!(parse_interval("10"), 10);
        assert_eq!(parse_interval(" 3 "), 3);
        // Blank, junk and fractional answers all take the default path
        assert_eq!(parse_interval(""), 0);
        assert_eq!(parse_interval("abc"), 0);
        assert_eq!(parse_interval("1.5"), 0);
    }
}
