//! Procura - procurement tender and bid backend
//!
//! Organizations publish tenders for services they want performed;
//! other organizations respond with bids, which the tender side then
//! approves or rejects. This binary loads configuration, sets up
//! logging and the database pool, and serves the HTTP API.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use procura::config::{LogFormat, LogTarget, LoggingConfig};
use procura::{api, db, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("procura {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration before logging, so we know the log format
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("Procura starting up");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    let state = AppState::new(config, db);
    let app = api::create_router(state);

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("HTTP server is ready to accept connections");

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}

/// Initialize the logging/tracing infrastructure. Returns the worker
/// guard when a file writer is in play.
fn init_logging(config: &AppConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    let (file_writer, guard) = match log_config.target {
        LogTarget::Console => (None, None),
        LogTarget::File | LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            (Some(writer), Some(guard))
        }
    };

    let mut layers = Vec::new();
    if matches!(log_config.target, LogTarget::Console | LogTarget::Both) {
        layers.push(fmt_layer(&log_config.format, None));
    }
    if let Some(writer) = file_writer {
        layers.push(fmt_layer(&log_config.format, Some(writer)));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    guard
}

/// One formatting layer, writing either to the console or to the given
/// non-blocking file writer.
fn fmt_layer<S>(
    format: &LogFormat,
    writer: Option<NonBlocking>,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    use tracing_subscriber::fmt;

    match (format, writer) {
        (LogFormat::Json, Some(writer)) => {
            Box::new(fmt::layer().json().with_target(true).with_writer(writer))
        }
        (LogFormat::Json, None) => Box::new(fmt::layer().json().with_target(true)),
        (LogFormat::Compact, Some(writer)) => Box::new(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(writer),
        ),
        (LogFormat::Compact, None) => Box::new(fmt::layer().compact().with_target(false)),
        (LogFormat::Pretty, Some(writer)) => Box::new(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(writer),
        ),
        (LogFormat::Pretty, None) => Box::new(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        ),
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(log_config: &LoggingConfig) -> (NonBlocking, WorkerGuard) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Ensure the directory holding the SQLite file exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// Print help message
fn print_help() {
    println!(
        r#"Procura {}

USAGE:
    procura [OPTIONS]

OPTIONS:
    -h, --help      Print this help message
    -V, --version   Print version information

ENVIRONMENT:
    PROCURA_CONFIG  Path to configuration file (default: config.yaml)
    DATABASE_URL    SQLite database URL override
    RUST_LOG        Log filter override

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by PROCURA_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/procura/config.yaml
    5. <user config dir>/procura/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
