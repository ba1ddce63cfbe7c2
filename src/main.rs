use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use next_bruss::{
    build_engine, build_session_store, init_telemetry, router, shutdown_telemetry, AppState,
    DocumentStore, MemoryStore, NextBrussConfig, ShutdownCoordinator, WorkflowMetrics,
};

#[derive(Parser)]
#[command(name = "next-bruss")]
#[command(about = "Status workflow service for deviations, overtime, purchase requests and inventory")]
struct Cli {
    /// Configuration file (defaults to next-bruss.toml or .next-bruss-rc when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the history of one record from the database
    #[cfg(feature = "database")]
    History {
        /// Entity type, e.g. deviations or purchase-requests
        entity: String,
        /// Record identifier
        id: uuid::Uuid,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    NextBrussConfig::load_env_file()?;
    let config = NextBrussConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            tokio::runtime::Runtime::new()?.block_on(async { serve_command(config, bind).await })
        }
        Commands::Config { output } => config_command(&config, output),
        #[cfg(feature = "database")]
        Commands::History { entity, id } => {
            tokio::runtime::Runtime::new()?
                .block_on(async { history_command(&config, &entity, id).await })
        }
    }
}

async fn serve_command(mut config: NextBrussConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    init_telemetry(&config.observability)?;

    let metrics = Arc::new(WorkflowMetrics::new());
    #[cfg_attr(not(feature = "database"), allow(unused_mut))]
    let mut shutdown = ShutdownCoordinator::new().with_metrics(metrics.clone());

    let store: Arc<dyn DocumentStore> = match &config.database {
        #[cfg(feature = "database")]
        Some(database) => {
            let sqlite = next_bruss::store::SqliteStore::connect(
                &database.url,
                database.max_connections,
                database.auto_migrate,
            )
            .await?;
            info!(url = %database.url, "Using SQLite document store");
            shutdown = shutdown.with_database(sqlite.clone());
            Arc::new(sqlite)
        }
        #[cfg(not(feature = "database"))]
        Some(database) => {
            warn!(
                url = %database.url,
                "Database configured but the database feature is disabled; using in-memory store"
            );
            Arc::new(MemoryStore::new())
        }
        None => {
            warn!("No database configured; records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let engine = build_engine(store, &config, metrics);
    let sessions = build_session_store(&config.auth).await?;
    let app = router(AppState::new(engine, sessions, &config.auth.cookie_name));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!(address = %config.server.bind_address, "Next BRUSS listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(ShutdownCoordinator::wait_for_signal())
        .await?;

    shutdown.shutdown_all_services().await?;
    shutdown_telemetry();
    Ok(())
}

fn config_command(config: &NextBrussConfig, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

#[cfg(feature = "database")]
async fn history_command(config: &NextBrussConfig, entity: &str, id: uuid::Uuid) -> Result<()> {
    let kind: next_bruss::EntityKind = entity.parse()?;
    let database = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no [database] section configured"))?;

    let store = next_bruss::store::SqliteStore::connect(
        &database.url,
        database.max_connections,
        database.auto_migrate,
    )
    .await?;
    let entries = store.history(kind.collection(), id).await?;
    store.shutdown().await;

    if entries.is_empty() {
        println!("No history for {}/{}", kind.slug(), id);
    } else {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }
    Ok(())
}
