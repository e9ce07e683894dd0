// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and build Settings
// 2. Set up logging and the shared HTTP client
// 3. Dispatch to the appropriate subcommand handler (or the interactive menu)
// 4. Exit with proper code (0 = success, 2 = error)
//
// Ctrl+C: one listener for the whole process. While monitor or watch runs it
// stops just that feature (in the menu you land back on the list); at any
// other moment it ends the program.
// =============================================================================

mod benchmark; // src/benchmark.rs - response time runs
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - settings and logging
mod detect; // src/detect/ - section hashing and change reports
mod dom; // src/dom.rs - DOM capability over scraper
mod embed; // src/embed.rs - social preview card
mod menu; // src/menu.rs - interactive mode
mod mirror; // src/mirror/ - page + asset mirroring
mod monitor; // src/monitor.rs - uptime checks
mod net; // src/net/ - HTTP client
mod schedule; // src/schedule.rs - clocks and the polling loop
mod stats; // src/stats.rs - content statistics

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Settings, DEFAULT_INTERVAL_MINUTES};
use detect::ChangeDetector;
use dom::ParsedPage;
use net::{HttpClient, RequestOptions};
use schedule::{interval_minutes, Interrupts, SystemClock};
use std::path::Path;
use tracing::{info, warn};
use url::Url;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_args(&cli.global);
    config::init_logging(&settings.log_level)?;

    tokio::fs::create_dir_all(&settings.work_dir)
        .await
        .with_context(|| format!("could not create {}", settings.work_dir.display()))?;

    let client = settings.http_client()?;
    let interrupts = Interrupts::default();
    listen_for_ctrl_c(interrupts.clone());

    match cli.command {
        Commands::Menu => menu::run_menu(&settings, &client, &interrupts).await,
        command => execute(command, &settings, &client, &interrupts).await,
    }
}

/// Runs one feature; shared by the CLI and the menu
pub(crate) async fn execute(
    command: Commands,
    settings: &Settings,
    client: &HttpClient,
    interrupts: &Interrupts,
) -> Result<()> {
    let options = settings.request_options();

    match command {
        Commands::Mirror { url } => handle_mirror(client, &options, &url, &settings.work_dir).await,
        Commands::Monitor { url, interval } => {
            let interval = interval_minutes(interval, DEFAULT_INTERVAL_MINUTES);
            let cancel = interrupts.arm();
            let checks =
                monitor::monitor_site(client, &options, &url, interval, &SystemClock, &cancel).await;
            interrupts.disarm();
            println!("\n🛑 Monitoring stopped after {checks} check(s)");
            Ok(())
        }
        Commands::Stats { url, json } => handle_stats(client, &options, &url, json).await,
        Commands::Benchmark { url, runs, json } => {
            handle_benchmark(client, &options, &url, runs, json).await
        }
        Commands::Embed { url, json } => {
            handle_embed(client, &options, &url, &settings.work_dir, json).await
        }
        Commands::Watch { url, interval } => {
            let interval = interval_minutes(interval, DEFAULT_INTERVAL_MINUTES);
            let detector = ChangeDetector::new(url, &settings.work_dir);
            println!("👀 Watching {} every {} minute(s)", detector.url(), interval.as_secs() / 60);
            println!("Press Ctrl+C to stop\n");

            let cancel = interrupts.arm();
            let polls =
                detect::watch_site(client, &options, &detector, interval, &SystemClock, &cancel).await;
            interrupts.disarm();
            println!("\n🛑 Change detection stopped after {polls} poll(s)");
            Ok(())
        }
        Commands::Menu => bail!("the menu can only be started from the command line"),
    }
}

/// Spawns the process-wide Ctrl+C listener
///
/// Registering it replaces the default SIGINT behaviour for good, so it has
/// to keep running and decide on every press: stop the armed feature, or
/// exit when nothing is armed.
fn listen_for_ctrl_c(interrupts: Interrupts) {
    tokio::spawn(async move {
        loop {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(%error, "could not listen for Ctrl+C");
                return;
            }
            if interrupts.interrupt() {
                info!("Ctrl+C received, stopping");
            } else {
                eprintln!("\nInterrupted");
                std::process::exit(130);
            }
        }
    });
}

async fn handle_mirror(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    work_dir: &Path,
) -> Result<()> {
    println!("🔍 Mirroring website: {url}");

    let report = mirror::mirror_site(client, options, url, work_dir).await?;

    match &report.index {
        Some(index) => println!("📄 HTML saved to {}", index.display()),
        None => {
            println!("⚠️  No HTML content found on the page");
            return Ok(());
        }
    }

    println!("\n📊 Summary:");
    println!("   ✅ Saved: {}", report.saved().count());
    println!("   ⏭️  Skipped: {}", report.skipped_count());
    println!("   ❌ Failed: {}", report.failed_count());
    println!("   📁 Location: {}", report.root.display());
    Ok(())
}

async fn handle_stats(client: &HttpClient, options: &RequestOptions, url: &Url, json: bool) -> Result<()> {
    let html = client
        .fetch_text(url, options)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let stats = stats::analyze(&ParsedPage::parse(&html), &html, url);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("📊 Content statistics for {url}");
    println!("{}", "=".repeat(50));
    println!("{:<22} {}", "Title", stats.title);
    println!("{:<22} {}", "Description", stats.description);
    println!("{:<22} {}", "Images", stats.images);
    println!(
        "{:<22} {} ({} internal, {} external)",
        "Links", stats.links, stats.internal_links, stats.external_links
    );
    println!("{:<22} {}", "Scripts", stats.scripts);
    println!("{:<22} {}", "Stylesheets", stats.stylesheets);
    println!("{:<22} {} / {} / {}", "Headings H1/H2/H3", stats.h1, stats.h2, stats.h3);
    println!("{:<22} {:.2} KB", "HTML size", stats.html_bytes as f64 / 1024.0);
    Ok(())
}

async fn handle_benchmark(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    runs: usize,
    json: bool,
) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    if !json {
        println!("⏱️  Benchmarking {url} ({runs} runs)\n");
    }

    let summary = benchmark::benchmark(client, options, url, runs, &SystemClock).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{:<6} {:<12} {:<30}", "RUN", "TIME", "RESULT");
    println!("{}", "=".repeat(48));
    for sample in &summary.samples {
        let result = match (&sample.status, &sample.error) {
            (Some(status), _) => format!("HTTP {status}"),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        };
        println!("{:<6} {:<12} {:<30}", sample.run, format!("{} ms", sample.elapsed_ms), result);
    }
    println!();

    match (summary.min_ms, summary.avg_ms, summary.max_ms) {
        (Some(min), Some(avg), Some(max)) => {
            println!("📊 Summary:");
            println!("   Min: {min} ms");
            println!("   Avg: {avg:.2} ms");
            println!("   Max: {max} ms");
        }
        _ => println!("⚠️  No run got a response, nothing to summarize"),
    }
    Ok(())
}

async fn handle_embed(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    work_dir: &Path,
    json: bool,
) -> Result<()> {
    let html = client
        .fetch_text(url, options)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let preview = embed::extract_preview(&ParsedPage::parse(&html), url);
    let path = embed::write_example(&preview, work_dir).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("🖼️  Embed preview for {url}");
    println!("{:<14} {}", "Site", preview.site_name);
    println!("{:<14} {}", "Title", preview.title);
    println!("{:<14} {}", "Description", preview.description);
    println!("{:<14} {}", "Image", preview.image);
    println!("\n{}", embed::render_card(&preview));
    println!("📄 Example page saved to {}", path.display());
    Ok(())
}
