use anyhow::{Context, Result};
use art_gallery_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_READ_POOL_SIZE};
use art_gallery_server::server::{self, run_server, RequestsLoggingLevel};
use art_gallery_server::slug::{RussianTransliterator, SlugGenerator, DEFAULT_MAX_SUFFIX_ATTEMPTS};
use art_gallery_server::SqliteGalleryStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite gallery database file. Created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override command line values.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// Numeric suffixes tried when a painting slug is taken.
    #[clap(long, default_value_t = DEFAULT_MAX_SUFFIX_ATTEMPTS)]
    pub slug_max_attempts: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        read_pool_size: cli_args.read_pool_size,
        slug_max_attempts: cli_args.slug_max_attempts,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite gallery database at {:?}...", app_config.db_path);
    let slugs = SlugGenerator::new(Arc::new(RussianTransliterator), app_config.slug_policy);
    let gallery_store = Arc::new(SqliteGalleryStore::new(
        &app_config.db_path,
        app_config.read_pool_size,
        slugs,
    )?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(
        gallery_store,
        app_config.logging_level,
        app_config.port,
        app_config.metrics_port,
    )
    .await
}
