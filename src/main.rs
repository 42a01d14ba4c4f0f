//! urlq main entry point
//!
//! This is the command-line interface for the distributed URL fetcher.

use anyhow::Context;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use urlq::config::{load_config_or_default, validate_worker_count, Config};
use urlq::fetcher::{FetchExecutor, ReqwestFetcher};
use urlq::output::{load_statistics, print_statistics};
use urlq::queue::load_urls;
use urlq::storage::{open_queue, QueueStore, SqliteQueue};
use urlq::worker::{
    process::process_worker_id, spawn_processes, stop_channel, stop_processes, OnEmpty,
    SpawnOptions, Worker, WorkerPool,
};

/// urlq: fetch a queue of URLs with independent workers
///
/// URLs live in a shared SQLite queue. Each worker claims one URL at a
/// time, fetches it, and records the HTTP code or the failure. Actions
/// given together run in this order: stop, erase, load, start workers,
/// stats.
#[derive(Parser, Debug)]
#[command(name = "urlq")]
#[command(version)]
#[command(about = "A distributed-queue URL fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Queue database, overriding the configuration file
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Stop all running worker processes
    #[arg(short, long)]
    stop: bool,

    /// Erase the queue
    #[arg(short, long)]
    erase: bool,

    /// Load URLs from a file, one per line
    #[arg(short, long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Start worker processes that serve the queue until stopped
    #[arg(short, long, value_name = "N", num_args = 0..=1, conflicts_with = "threads")]
    workers: Option<Option<u32>>,

    /// Run workers as tasks in this process until the queue is drained
    #[arg(short, long, value_name = "N", num_args = 0..=1)]
    threads: Option<Option<u32>>,

    /// With --threads, keep polling an empty queue until Ctrl+C
    #[arg(long, requires = "threads")]
    serve: bool,

    /// Print queue statistics
    #[arg(long)]
    stats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run a single worker in this process (used by --workers)
    #[arg(long = "run-worker", hide = true)]
    run_worker: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(database) = &cli.database {
        config.queue.database_path = database.clone();
    }
    let debug = cli.debug || config.worker.debug;

    // Worker processes write into the shared log file
    setup_logging(debug, !cli.run_worker);

    if cli.run_worker {
        return run_worker_process(&config).await;
    }

    if !cli.stop
        && !cli.erase
        && cli.load.is_none()
        && cli.workers.is_none()
        && cli.threads.is_none()
        && !cli.stats
    {
        tracing::warn!("Nothing to do; see --help");
        return Ok(());
    }

    if cli.stop {
        let report = stop_processes(&config.manage.pid_file)
            .context("Failed to stop worker processes")?;
        println!("Stopped {} workers ({} stale PIDs skipped)", report.stopped, report.skipped);
    }

    let queue = open_queue(&config.queue.database_path, config.queue.connect_timeout())
        .with_context(|| {
            format!(
                "Failed to open queue database {}",
                config.queue.database_path.display()
            )
        })?;

    if cli.erase {
        queue.reset().context("Failed to erase the queue")?;
        println!("Queue erased");
    }

    if let Some(path) = &cli.load {
        let report = load_urls(&queue, path)
            .with_context(|| format!("Failed to load URLs from {}", path.display()))?;
        println!(
            "Loaded {} URLs ({} blank lines skipped)",
            report.inserted, report.skipped
        );
    }

    if let Some(count) = cli.workers {
        let count = count.unwrap_or(config.worker.count);
        validate_worker_count(count)?;
        handle_spawn_workers(&cli, &config, count)?;
    }

    if let Some(count) = cli.threads {
        let count = count.unwrap_or(config.worker.count);
        validate_worker_count(count)?;
        handle_threads(&config, queue.clone(), count, cli.serve).await?;
    }

    if cli.stats {
        handle_stats(&config, &queue)?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` takes precedence over the debug switch.
fn setup_logging(debug: bool, ansi: bool) {
    let default_filter = if debug {
        "urlq=debug,info"
    } else {
        "urlq=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the fetch executor backed by the real HTTP client
fn build_executor(config: &Config) -> anyhow::Result<FetchExecutor> {
    let fetcher = ReqwestFetcher::new(&config.fetch).context("Failed to build HTTP client")?;
    Ok(FetchExecutor::new(Arc::new(fetcher)))
}

/// Handles the hidden worker mode: one serve-forever worker until signalled
async fn run_worker_process(config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn QueueStore> = Arc::new(
        open_queue(&config.queue.database_path, config.queue.connect_timeout())
            .context("Failed to open queue database")?,
    );
    let executor = build_executor(config)?;

    let (stop, signal) = stop_channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        stop.stop();
    });

    let worker = Worker::new(
        process_worker_id(),
        store,
        executor,
        OnEmpty::WaitAndRetry(config.worker.grace_period()),
    )
    .with_stop_signal(signal)
    .with_store_retry(config.worker.store_retry());

    let report = worker.run().await;
    tracing::info!(
        "Worker exiting: {} processed ({} done, {} errors)",
        report.processed,
        report.done,
        report.errors
    );
    Ok(())
}

/// Handles --workers: re-executes this binary in worker mode
fn handle_spawn_workers(cli: &Cli, config: &Config, count: u32) -> anyhow::Result<()> {
    let mut forward_args: Vec<OsString> = Vec::new();
    if let Some(path) = &cli.config {
        forward_args.push("--config".into());
        forward_args.push(absolute(path).into_os_string());
    }
    if cli.database.is_some() {
        forward_args.push("--database".into());
        forward_args.push(absolute(&config.queue.database_path).into_os_string());
    }
    if cli.debug {
        forward_args.push("--debug".into());
    }

    let options = SpawnOptions {
        count,
        forward_args,
        pid_file: config.manage.pid_file.clone(),
        log_file: config.manage.log_file.clone(),
        program: None,
    };
    let pids = spawn_processes(&options).context("Failed to start worker processes")?;

    println!(
        "Started {} workers; logging to {}",
        pids.len(),
        config.manage.log_file.display()
    );
    Ok(())
}

/// Handles --threads: in-process workers, drained or served until Ctrl+C
async fn handle_threads(
    config: &Config,
    queue: SqliteQueue,
    count: u32,
    serve: bool,
) -> anyhow::Result<()> {
    let store: Arc<dyn QueueStore> = Arc::new(queue);
    let executor = build_executor(config)?;
    let policy = if serve {
        OnEmpty::WaitAndRetry(config.worker.grace_period())
    } else {
        OnEmpty::Stop
    };

    let pool = WorkerPool::spawn(
        count,
        store,
        executor,
        policy,
        config.worker.store_retry(),
    );

    let stop = pool.stop_handle();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        stop.stop();
    });

    let total = pool.join_total().await?;
    watcher.abort();

    println!(
        "Workers finished: {} processed ({} done, {} errors, {} lost claim races)",
        total.processed, total.done, total.errors, total.lost_races
    );
    Ok(())
}

/// Handles --stats: shows queue statistics
fn handle_stats(config: &Config, queue: &SqliteQueue) -> anyhow::Result<()> {
    println!("Database: {}\n", config.queue.database_path.display());

    let stats = load_statistics(queue).context("Failed to read queue statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Resolves `path` against the current directory for child processes
fn absolute(path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolves when Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping after the current URL");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, stopping after the current URL");
        },
    }
}
