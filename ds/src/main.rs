//! DealScout - acquisition-target analysis from the terminal
//!
//! CLI entry point for batch analysis runs and the interactive TUI.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use scoutapi::{AnalysisApi, HttpAnalysisClient};

use dealscout::batch;
use dealscout::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use dealscout::config::Config;
use dealscout::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dealscout")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("dealscout.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help that shows config and log locations
    let cmd = Cli::command().after_help(generate_after_help());

    // Parse CLI arguments using the modified command
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("DealScout loaded config: api={}", config.api.base_url);

    // Dispatch command
    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Analyze { domain, format }) => {
            debug!(%domain, %format, "main: matched Analyze command");
            cmd_analyze(&config, &domain, format).await
        }
        Some(Command::Ping) => {
            debug!("main: matched Ping command");
            cmd_ping(&config).await
        }
        Some(Command::Logs { follow, lines }) => {
            debug!(follow, lines, "main: matched Logs command");
            cmd_logs(follow, lines).await
        }
        Some(Command::Tui) | None => {
            debug!("main: launching TUI");
            cmd_tui(&config).await
        }
    }
}

/// Build the HTTP API client from config
fn build_client(config: &Config) -> Result<Arc<dyn AnalysisApi>> {
    debug!(base_url = %config.api.base_url, "build_client: called");
    let client = HttpAnalysisClient::new(&config.api.base_url, config.api.timeout())
        .context("Failed to create API client")?;
    Ok(Arc::new(client))
}

/// Run one analysis to completion (batch mode)
async fn cmd_analyze(config: &Config, domain: &str, format: OutputFormat) -> Result<()> {
    debug!(%domain, %format, "cmd_analyze: called");
    let api = build_client(config)?;
    let mut stdout = std::io::stdout();
    batch::run_analysis(api, domain, format, config.poll.interval(), &mut stdout).await
}

/// Check that the analysis backend is reachable
async fn cmd_ping(config: &Config) -> Result<()> {
    debug!("cmd_ping: called");
    let api = build_client(config)?;

    match api.ping().await {
        Ok(status) => {
            debug!(message = %status.message, "cmd_ping: pong received");
            println!("{} Backend is alive and responsive", "✓".green());
            println!("  URL: {}", config.api.base_url.cyan());
            println!("  Message: {}", status.message);
        }
        Err(e) => {
            debug!(error = %e, "cmd_ping: ping failed");
            println!("{} Backend is not responding", "✗".red());
            println!("  URL: {}", config.api.base_url.cyan());
            println!("  Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Launch the interactive TUI
async fn cmd_tui(config: &Config) -> Result<()> {
    debug!("cmd_tui: called");
    let api = build_client(config)?;
    tui::run(api, config).await
}

/// Show logs
async fn cmd_logs(follow: bool, lines: usize) -> Result<()> {
    debug!(follow, lines, "cmd_logs: called");
    let log_path = get_log_path();

    if !log_path.exists() {
        debug!(?log_path, "cmd_logs: log file does not exist");
        println!("No log file found at: {}", log_path.display());
        println!("No analysis has been run yet.");
        return Ok(());
    }

    if follow {
        debug!(?log_path, "cmd_logs: following log file");
        println!("Following log file: {} (Ctrl+C to stop)", log_path.display());
        println!();

        // Use tail -f for following
        let mut child = std::process::Command::new("tail")
            .args(["-f", "-n", &lines.to_string()])
            .arg(&log_path)
            .spawn()
            .context("Failed to run tail -f")?;

        child.wait()?;
    } else {
        debug!(?log_path, lines, "cmd_logs: reading last N lines");
        // Read last N lines
        let file = fs::File::open(&log_path).context("Failed to open log file")?;
        let reader = BufReader::new(file);
        let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

        let start = if all_lines.len() > lines { all_lines.len() - lines } else { 0 };

        for line in &all_lines[start..] {
            println!("{}", line);
        }
    }

    Ok(())
}
