//! mysql-live-migrate CLI - chunked copy engine for live MySQL table migrations.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use mysql_live_migrate::{
    create_throttler, Chunker, ColumnIntersection, Config, CopyConfig, DotPrinter, Filter,
    LagProbe, MigrateError, Migration, MigrationConfig, MysqlExecutor, PercentagePrinter, Printer,
    ThrottlerConfig, ThrottlerSpec,
};

#[derive(Parser)]
#[command(name = "mysql-live-migrate")]
#[command(about = "Chunked copy engine for live MySQL table migrations")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the origin table into the destination table
    Run {
        /// Resolve the id range and show the plan without copying
        #[arg(long)]
        dry_run: bool,
    },

    /// Test the database connection
    HealthCheck,
}

/// Result of a copy run.
#[derive(Debug, Clone, Serialize)]
struct CopyReport {
    /// Unique run identifier.
    run_id: String,

    /// Final status.
    status: String,

    /// Total duration in seconds.
    duration_seconds: f64,

    /// When the copy started.
    started_at: DateTime<Utc>,

    /// When the copy completed.
    completed_at: DateTime<Utc>,

    /// Chunks issued.
    chunks: u64,

    /// Rows copied into the destination.
    rows_copied: u64,

    /// Average throughput (rows/second).
    rows_per_second: i64,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run } => {
            let executor = Arc::new(MysqlExecutor::new(&config.database).await?);
            let migration = build_migration(&executor, &config.migration).await?;

            let lag_probe: Arc<dyn LagProbe> = executor.clone();
            let throttler = create_throttler(
                ThrottlerSpec::Name(config.copy.throttler.clone()),
                ThrottlerConfig {
                    stride: config.copy.stride,
                    pause: config.copy.pause(),
                    max_lag: config.copy.max_replica_lag(),
                    lag_probe: Some(lag_probe),
                },
            )?;

            let chunker = Chunker::new(
                migration,
                executor.clone(),
                config.migration.chunker_options(&config.copy),
            )
            .await?
            .with_throttler(throttler)
            .with_printer(build_printer(&config.copy));

            if dry_run {
                match chunker.bounds() {
                    Some((start, limit)) => {
                        let span = (limit - start + 1) as u64;
                        let chunks = span.div_ceil(config.copy.stride);
                        println!("Dry run: would copy ids [{}, {}]", start, limit);
                        println!(
                            "  At most {} chunks of stride {}",
                            chunks, config.copy.stride
                        );
                    }
                    None => println!("Dry run: origin table is empty, nothing to copy"),
                }
                return Ok(());
            }

            let started_at = Utc::now();
            let start = Instant::now();
            let stats = chunker.execute().await?;
            let elapsed = start.elapsed();

            let rows_per_second = if elapsed.as_secs_f64() > 0.0 {
                (stats.rows_copied as f64 / elapsed.as_secs_f64()) as i64
            } else {
                0
            };

            let report = CopyReport {
                run_id: uuid::Uuid::new_v4().to_string(),
                status: "completed".to_string(),
                duration_seconds: elapsed.as_secs_f64(),
                started_at,
                completed_at: Utc::now(),
                chunks: stats.chunks,
                rows_copied: stats.rows_copied,
                rows_per_second,
            };

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\nCopy completed!");
                println!("  Run ID: {}", report.run_id);
                println!("  Duration: {:.2}s", report.duration_seconds);
                println!("  Chunks: {}", report.chunks);
                println!("  Rows: {}", report.rows_copied);
                println!("  Throughput: {} rows/sec", report.rows_per_second);
            }
        }

        Commands::HealthCheck => {
            let start = Instant::now();
            let result = MysqlExecutor::new(&config.database).await;
            let latency_ms = start.elapsed().as_millis();

            match result {
                Ok(executor) => {
                    executor.ping().await?;
                    println!("Health Check Results:");
                    println!("  MySQL: OK ({}ms)", latency_ms);
                    executor.disconnect().await?;
                }
                Err(e) => {
                    println!("Health Check Results:");
                    println!("  MySQL: FAILED ({}ms)", latency_ms);
                    println!("    Error: {}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

/// Assemble the migration descriptor, probing the column intersection from
/// information_schema unless the config lists columns explicitly.
async fn build_migration(
    executor: &MysqlExecutor,
    config: &MigrationConfig,
) -> Result<Migration, MigrateError> {
    let columns = if config.columns.is_empty() {
        let origin_cols = executor.column_names(&config.origin).await?;
        if origin_cols.is_empty() {
            return Err(MigrateError::Config(format!(
                "origin table '{}' does not exist",
                config.origin
            )));
        }
        let destination_cols: HashSet<String> = executor
            .column_names(&config.destination)
            .await?
            .into_iter()
            .collect();
        if destination_cols.is_empty() {
            return Err(MigrateError::Config(format!(
                "destination table '{}' does not exist",
                config.destination
            )));
        }
        // intersection keeps the origin's column order on both sides
        origin_cols
            .into_iter()
            .filter(|c| destination_cols.contains(c))
            .collect()
    } else {
        config.columns.clone()
    };

    let intersection = ColumnIntersection::new(columns)?;
    info!(
        "copying columns: {}",
        intersection.columns().join(", ")
    );

    Ok(Migration::new(&config.origin, &config.destination, intersection)
        .with_filter(Filter::from_clauses(config.filter.clone())))
}

fn build_printer(copy: &CopyConfig) -> Box<dyn Printer> {
    match copy.printer.as_str() {
        "dot" => Box::new(DotPrinter::new()),
        _ => Box::new(PercentagePrinter::new()),
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
