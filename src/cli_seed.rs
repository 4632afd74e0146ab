//! Gallery Seed Tool
//!
//! Fills a gallery database with the demo catalog: three artists, two
//! museums and three paintings, all in one transaction.

use anyhow::{Context, Result};
use art_gallery_server::seed::seed_demo_data;
use art_gallery_server::{SlugGenerator, SqliteGalleryStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-seed")]
#[command(about = "Seed a gallery database with demo data")]
struct Args {
    /// Path to the SQLite gallery database file. Created if missing.
    #[arg(value_name = "DB_PATH")]
    db_path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Seeding gallery database at {}", args.db_path.display());
    let store = SqliteGalleryStore::new(&args.db_path, 1, SlugGenerator::default())?;
    let imported = seed_demo_data(&store).context("Seeding failed, nothing was written")?;

    info!("Database seeded:");
    info!("  - artists: {}", imported.artists);
    info!("  - museums: {}", imported.museums);
    info!("  - paintings: {}", imported.paintings);
    Ok(())
}
