// src/config.rs
// =============================================================================
// Runtime settings and logging setup.
//
// Settings come from the global CLI flags (see cli.rs), each of which can
// also be set with a SITE_SENTRY_* environment variable. Logging goes through
// tracing; RUST_LOG wins over --log-level when both are present.
// =============================================================================

use crate::cli::GlobalArgs;
use crate::net::{HttpClient, RequestOptions};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Poll interval used when the requested one is not a positive number of minutes
pub const DEFAULT_INTERVAL_MINUTES: u64 = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Where mirrors, change_detection/ and embed_example.html are written
    pub work_dir: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
    pub log_level: String,
}

impl Settings {
    pub fn from_args(args: &GlobalArgs) -> Self {
        Self {
            work_dir: args.work_dir.clone(),
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
            user_agent: args.user_agent.clone(),
            log_level: args.log_level.clone(),
        }
    }

    pub fn http_client(&self) -> Result<HttpClient> {
        HttpClient::new(self.timeout).context("failed to create HTTP client")
    }

    /// Base options for a request; features add their own headers on top
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new(self.user_agent.clone())
    }
}

/// Initializes the tracing subscriber once for the process
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("failed to initialize logging")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_settings_from_flags() {
        let cli = Cli::parse_from([
            "site-sentry",
            "--work-dir",
            "/tmp/out",
            "--timeout-secs",
            "0",
            "stats",
            "https://x.com",
        ]);
        let settings = Settings::from_args(&cli.global);
        assert_eq!(settings.work_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.timeout, Duration::from_secs(1));
        assert_eq!(settings.request_options().user_agent(), DEFAULT_USER_AGENT);
    }
}
