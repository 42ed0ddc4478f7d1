//! DataMirror CLI - Main entry point

use clap::Parser;
use mirror_cli::{commands, Cli, Commands};
use mirror_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Verbose mode surfaces engine progress on the console; otherwise
    // only warnings and errors are shown alongside the JSON output.
    // MIRROR_LOG_LEVEL still wins when set explicitly.
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config = log_config.with_level(LogLevel::Debug);
    } else if std::env::var("MIRROR_LOG_LEVEL").is_err() {
        log_config = log_config.with_level(LogLevel::Warn);
    }

    // The CLI should keep working even if logging cannot initialize.
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::FullLoad {
            table,
            job_id,
            chunk_size,
            compress,
            rows,
        } => commands::load::full_load(table, job_id, chunk_size, compress, rows).await,

        Commands::Incremental {
            table,
            key_column,
            target_table,
            batch_size,
            max_batches,
            job_id,
            rows,
        } => {
            commands::load::incremental(
                table,
                key_column,
                target_table,
                batch_size,
                max_batches,
                job_id,
                rows,
            )
            .await
        },

        Commands::Status { job_id } => commands::status::status(job_id).await,

        Commands::Jobs => commands::status::jobs().await,
    }
}
