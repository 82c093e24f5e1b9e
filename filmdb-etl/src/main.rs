//! Film ETL (filmdb-etl) - Main entry point
//!
//! Loads MovieLens movies and ratings into SQLite, enriching each movie
//! with OMDb metadata.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use filmdb_common::config::{self, TomlConfig, API_KEY_ENV_VAR, DEFAULT_CACHE_PATH};
use filmdb_common::db::{init_database, run_schema_script};
use filmdb_etl::input::{read_movies, read_ratings};
use filmdb_etl::services::{CachedProvider, LookupCache, MetadataLookup, MetadataProvider, OmdbClient};
use filmdb_etl::workflow::{Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for filmdb-etl
#[derive(Parser, Debug)]
#[command(name = "filmdb-etl")]
#[command(about = "Load MovieLens data into SQLite with OMDb enrichment")]
#[command(version)]
struct Args {
    /// Movies table (movieId,title[,genres])
    #[arg(long, default_value = "movies.csv")]
    movies: PathBuf,

    /// Ratings table (userId,movieId,rating[,timestamp])
    #[arg(long, default_value = "ratings.csv")]
    ratings: PathBuf,

    /// SQLite database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Extra SQL script executed after the built-in schema
    #[arg(long)]
    schema: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lookup cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Query the provider for every row without reading or writing the cache
    #[arg(long)]
    no_cache: bool,

    /// Do not repeat a not-found lookup without the title's year
    #[arg(long)]
    no_year_retry: bool,

    /// OMDb API key
    #[arg(long, env = API_KEY_ENV_VAR, hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = config::load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&toml_config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        "Starting filmdb-etl"
    );

    // Everything that can reject the run is checked before the database
    // is created
    let api_key = config::resolve_api_key(args.api_key.as_deref())?;

    let movies = read_movies(&args.movies)
        .with_context(|| format!("Failed to read {}", args.movies.display()))?;
    let ratings = read_ratings(&args.ratings)
        .with_context(|| format!("Failed to read {}", args.ratings.display()))?;

    let db_path = config::resolve_database_path(args.db.as_deref(), &toml_config);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    if let Some(schema) = args.schema.as_ref().or(toml_config.schema_path.as_ref()) {
        run_schema_script(&pool, schema)
            .await
            .with_context(|| format!("Failed to apply schema {}", schema.display()))?;
    }

    let client = OmdbClient::from_config(api_key, &toml_config.omdb)
        .context("Failed to create OMDb client")?;

    let provider: Box<dyn MetadataProvider> = if args.no_cache {
        info!("Lookup cache disabled");
        Box::new(client)
    } else {
        let cache_path = args
            .cache
            .clone()
            .or_else(|| toml_config.cache_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        let cache = LookupCache::load(&cache_path);
        info!("Lookup cache: {} ({} entries)", cache_path.display(), cache.len());
        Box::new(CachedProvider::new(client, cache))
    };

    let pipeline_config = PipelineConfig {
        retry_without_year: !args.no_year_retry,
    };
    let pipeline = Pipeline::with_config(pool.clone(), MetadataLookup::new(provider), pipeline_config);
    let summary = pipeline.run(&movies, &ratings).await?;

    pool.close().await;

    info!("{}", summary.display_string());
    println!("ETL complete. DB written to: {}", db_path.display());
    Ok(())
}

/// Console logging to stderr, plus an optional log file
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(toml_config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| toml_config.logging.level.as_str().into());

    let file_layer = match &toml_config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}
