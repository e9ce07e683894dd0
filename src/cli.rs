// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every feature is its own subcommand and takes the target URL as a
// positional argument. `menu` starts the interactive loop instead and asks
// for the URL on stdin.
//
// Global flags (work dir, timeout, user agent, log level) apply to every
// subcommand and can also come from SITE_SENTRY_* environment variables.
// =============================================================================

use crate::benchmark::DEFAULT_RUNS;
use crate::config::{DEFAULT_INTERVAL_MINUTES, DEFAULT_USER_AGENT};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "site-sentry",
    version,
    about = "Mirror websites, watch them for changes and inspect their content",
    long_about = "site-sentry mirrors a page with its CSS, JS and images, polls sites for uptime, \
                  detects changes between polls by hashing page sections, and reports content \
                  statistics, response times and social-preview metadata."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory that receives mirrors, change reports and the embed example
    #[arg(long, global = true, env = "SITE_SENTRY_WORK_DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Client-wide request timeout in seconds
    #[arg(long, global = true, env = "SITE_SENTRY_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, global = true, env = "SITE_SENTRY_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "SITE_SENTRY_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a page with its CSS, JS and images into {work-dir}/{host}
    ///
    /// Example: site-sentry mirror https://example.com
    Mirror {
        #[arg(value_parser = parse_site_url)]
        url: Url,
    },

    /// Check whether a site is up, once per interval, until Ctrl+C
    Monitor {
        #[arg(value_parser = parse_site_url)]
        url: Url,

        /// Minutes between checks; values below 1 fall back to 5
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES as i64, allow_negative_numbers = true)]
        interval: i64,
    },

    /// Count images, links, scripts, stylesheets and headings
    Stats {
        #[arg(value_parser = parse_site_url)]
        url: Url,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Time a few uncached requests and report min/avg/max
    Benchmark {
        #[arg(value_parser = parse_site_url)]
        url: Url,

        #[arg(long, default_value_t = DEFAULT_RUNS)]
        runs: usize,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Build a social-preview card and save embed_example.html
    Embed {
        #[arg(value_parser = parse_site_url)]
        url: Url,

        /// Print the extracted metadata as JSON as well
        #[arg(long)]
        json: bool,
    },

    /// Poll a page and report which sections changed since the last poll
    ///
    /// The first poll records a baseline in {work-dir}/change_detection.
    Watch {
        #[arg(value_parser = parse_site_url)]
        url: Url,

        /// Minutes between polls; values below 1 fall back to 5
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES as i64, allow_negative_numbers = true)]
        interval: i64,
    },

    /// Interactive menu: enter a URL once, then pick features from a list
    Menu,
}

/// Accepts only absolute http/https URLs
pub fn parse_site_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(format!("'{raw}' is not an http(s) URL")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site_url() {
        assert!(parse_site_url("https://example.com").is_ok());
        assert!(parse_site_url(" http://example.com/a ").is_ok());
        assert!(parse_site_url("ftp://example.com").is_err());
        assert!(parse_site_url("example.com").is_err());
    }

    #[test]
    fn test_watch_interval_accepts_negative_values() {
        let cli = Cli::parse_from(["site-sentry", "watch", "https://x.com", "--interval", "-1"]);
        match cli.command {
            Commands::Watch { interval, .. } => assert_eq!(interval, -1),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["site-sentry", "benchmark", "https://x.com"]);
        assert_eq!(cli.global.timeout_secs, 120);
        assert!(matches!(cli.command, Commands::Benchmark { runs: 5, json: false, .. }));
    }
}
