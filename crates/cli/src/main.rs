// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dubwatch: follow dubbing jobs from the terminal

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::action::Action;
use config::Config;
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dubwatch", version = env::VERSION, styles = color::styles())]
#[command(about = "Follow dubbing jobs: progress, retries, and where the media lives")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow a job until it finishes (defaults to the saved job)
    Watch {
        /// Job ID; becomes the saved job
        id: Option<String>,
    },
    /// Fetch a job's status once
    Status {
        /// Job ID (defaults to the saved job)
        id: Option<String>,
    },
    /// Ask the service to retry a failed job
    Retry {
        /// Job ID (defaults to the saved job)
        id: Option<String>,
    },
    /// Cancel a job and forget it
    Cancel {
        /// Job ID (defaults to the saved job)
        id: Option<String>,
    },
    /// Print a job's logs, or export them to a file
    Logs {
        /// Job ID (defaults to the saved job)
        id: Option<String>,
        /// Write the logs to a file instead (default: job-<ID>-logs.json)
        #[arg(short, long, value_name = "PATH", num_args = 0..=1)]
        file: Option<Option<PathBuf>>,
    },
    /// Forget the saved job without contacting the service
    Forget,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("error: {}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("error: {e:#}");
        std::process::exit(exit_error::codes::FAILURE);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "config loaded");

    let format = cli.output;
    match cli.command {
        Command::Watch { id } => commands::watch::handle(&config, id, format).await,
        Command::Status { id } => commands::status::handle(&config, id, format).await,
        Command::Retry { id } => commands::action::handle(&config, Action::Retry, id, format).await,
        Command::Cancel { id } => {
            commands::action::handle(&config, Action::Cancel, id, format).await
        }
        Command::Logs { id, file } => commands::logs::handle(&config, id, file, format).await,
        Command::Forget => commands::forget::handle(&config, format),
    }
}

/// Log to stderr so reports on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
