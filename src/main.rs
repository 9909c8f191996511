// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::Config;
use crate::app_controller::{Controller, SnapshotRequest};

mod app_config;
mod app_controller;
mod edgar_client;
mod errors;
mod file_utils;
mod info_table;
mod snapshot_writer;
mod summary;

// @const: Filing-month argument shape
static FILING_MONTH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a 13F holdings snapshot (default command)
    #[command(alias = "snapshot")]
    Snapshot(SnapshotArgs),

    /// Generate shell completions for edgar13f
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Manager name (e.g., 'Berkshire Hathaway')
    #[arg(long)]
    manager: Option<String>,

    /// Manager CIK (digits only)
    #[arg(long)]
    cik: Option<String>,

    /// Filing month YYYY-MM (optional; default latest)
    #[arg(long = "filing-date")]
    filing_date: Option<String>,

    /// Output CSV path
    #[arg(long)]
    out: PathBuf,

    /// Optional summary JSON path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Custom User-Agent for SEC requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// edgar13f - EDGAR 13F Snapshot Builder
///
/// Fetches one 13F-HR holdings report for one investment manager, extracts
/// the information table and writes a CSV snapshot plus an optional JSON
/// summary.
#[derive(Parser, Debug)]
#[command(name = "edgar13f")]
#[command(version = "1.0.0")]
#[command(about = "EDGAR 13F holdings snapshot builder")]
#[command(long_about = "edgar13f retrieves a manager's latest 13F-HR filing from SEC EDGAR and
writes its information table as a CSV snapshot.

EXAMPLES:
    edgar13f --manager 'Berkshire Hathaway' --out holdings.csv
    edgar13f --cik 1067983 --out holdings.csv --summary summary.json
    edgar13f --cik 1067983 --filing-date 2024-05 --out q1.csv
    edgar13f --cik 1067983 --out holdings.csv --user-agent 'me me@example.com'
    edgar13f --log-level debug --cik 1067983 --out holdings.csv
    edgar13f completions bash > edgar13f.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.

FAIR ACCESS:
    SEC.gov requires a User-Agent identifying the requester. Set a real
    contact with --user-agent or in the config file before heavy use.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Manager name (e.g., 'Berkshire Hathaway')
    #[arg(long)]
    manager: Option<String>,

    /// Manager CIK (digits only)
    #[arg(long)]
    cik: Option<String>,

    /// Filing month YYYY-MM (optional; default latest)
    #[arg(long = "filing-date")]
    filing_date: Option<String>,

    /// Output CSV path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Optional summary JSON path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Custom User-Agent for SEC requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "edgar13f", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Snapshot(args)) => run_snapshot(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let out = cli
                .out
                .ok_or_else(|| anyhow!("--out is required when no subcommand is specified"))?;

            let snapshot_args = SnapshotArgs {
                manager: cli.manager,
                cik: cli.cik,
                filing_date: cli.filing_date,
                out,
                summary: cli.summary,
                user_agent: cli.user_agent,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_snapshot(snapshot_args).await
        }
    }
}

async fn run_snapshot(options: SnapshotArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    if let Some(month) = &options.filing_date {
        if !FILING_MONTH_REGEX.is_match(month) {
            return Err(anyhow!("--filing-date must be YYYY-MM, got '{}'", month));
        }
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let config = if file_utils::FileManager::file_exists(config_path) {
        let mut config = Config::from_file(config_path)
            .context(format!("Failed to load config file: {}", config_path))?;

        // Override config with CLI options if provided
        if let Some(user_agent) = &options.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let mut config = Config::default();

        if let Some(user_agent) = &options.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        file_utils::FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Create controller and run the pipeline
    let controller = Controller::with_config(config)?;
    let report = controller
        .run(SnapshotRequest {
            manager: options.manager,
            cik: options.cik,
            filing_month: options.filing_date,
            out_csv: options.out,
            summary_json: options.summary,
        })
        .await?;

    // Final status line so partial data loss is always visible
    println!(
        "Snapshot complete: {} holdings written to {} ({} skipped), accession {}",
        report.rows_written,
        report.out_csv.display(),
        report.skipped,
        report.accession
    );

    Ok(())
}
