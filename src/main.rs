mod auth;
mod config;
mod db;
mod middleware;
mod models;
mod observability;
mod routes;
mod services;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    auth::TokenIssuer,
    config::LoadboardConfig,
    db::{DbError, DbPool},
    services::{SeedUser, Services},
};

/// Default config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "loadboard.toml";

/// CLI arguments for the load board server
#[derive(Parser, Debug)]
#[command(version, about = "Freight load board API", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to ./loadboard.toml if it exists,
    /// otherwise built-in defaults are used)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Upsert users from a JSON file, all with the same password
    Seed {
        /// JSON array of `{"email", "role", "user_name"?, "company_name"?}` records
        #[arg(short, long)]
        file: PathBuf,

        /// Password given to every seeded user
        #[arg(long, default_value = "password123")]
        password: String,
    },
    /// Write a default configuration file
    Init {
        /// Output file (defaults to ./loadboard.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub tokens: Arc<TokenIssuer>,
    pub services: Services,
}

impl AppState {
    /// Connect to the configured store, running migrations if enabled.
    pub async fn new(config: LoadboardConfig) -> Result<Self, DbError> {
        let db = DbPool::from_config(&config.database).await?;
        if config.database.run_migrations() {
            db.run_migrations().await?;
            tracing::info!("Database migrations completed");
        }
        Ok(Self::with_db(config, db))
    }

    /// Build state over an already-open store.
    pub fn with_db(config: LoadboardConfig, db: DbPool) -> Self {
        let db = Arc::new(db);
        let tokens = Arc::new(TokenIssuer::from_config(&config.auth));
        let services = Services::new(db.clone(), tokens.clone(), &config);

        Self {
            db,
            tokens,
            services,
        }
    }
}

pub fn build_app(config: &LoadboardConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(routes::health::welcome))
        .route("/health", get(routes::health::health_check))
        .merge(routes::get_api_routes(state.clone(), config));

    app = app.layer(axum::middleware::from_fn(
        middleware::request_id_middleware,
    ));

    // Layers run in reverse order, so CORS sees preflights before anything else
    if let Some(cors_layer) = config.server.cors.layer() {
        app = app.layer(cors_layer);
    }

    app.layer(TimeoutLayer::new(config.server.timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => run_init(output, force),
        Some(Command::Migrate) => run_migrate(args.config.as_deref()).await,
        Some(Command::Seed { file, password }) => {
            run_seed(args.config.as_deref(), &file, &password).await
        }
        Some(Command::Serve) | None => run_server(args.config.as_deref()).await,
    }
}

/// Load configuration, exiting the process on failure.
///
/// An explicit path must exist. Without one, `./loadboard.toml` is used when
/// present and the built-in defaults otherwise.
fn load_config(explicit_config_path: Option<&str>) -> LoadboardConfig {
    let path = match explicit_config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return LoadboardConfig::default();
            }
            default
        }
    };

    match LoadboardConfig::from_file(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn init_observability(config: &LoadboardConfig) {
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Failed to initialize tracing: {e}");
        std::process::exit(1);
    }
}

/// Initialize a new configuration file
fn run_init(output: Option<PathBuf>, force: bool) {
    let output_path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    let contents = match toml::to_string_pretty(&LoadboardConfig::default()) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Failed to render default config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Failed to create directory {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::write(&output_path, contents) {
        eprintln!("Failed to write config file: {e}");
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("To start the server, run:");
    println!("  loadboard serve --config {}", output_path.display());
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_observability(&config);

    if config.database.is_memory() {
        eprintln!("Error: the in-memory store has no schema. Nothing to migrate.");
        std::process::exit(1);
    }

    let pool = match DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    match pool.run_migrations().await {
        Ok(()) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!(error = %e, "Database migrations failed");
            std::process::exit(1);
        }
    }
}

async fn run_seed(explicit_config_path: Option<&str>, file: &std::path::Path, password: &str) {
    let config = load_config(explicit_config_path);
    init_observability(&config);

    if config.database.is_memory() {
        tracing::warn!("Seeding the in-memory store; users are discarded when this command exits");
    }

    let records: Vec<SeedUser> = match std::fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|contents| serde_json::from_str(&contents).map_err(|e| e.to_string()))
    {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Failed to read seed file {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open store");
            std::process::exit(1);
        }
    };

    match state.services.users.seed(records, password).await {
        Ok(report) => tracing::info!(
            seeded = report.seeded,
            skipped = report.skipped,
            "Seeding complete"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            std::process::exit(1);
        }
    }
}

async fn run_server(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_observability(&config);

    tracing::info!(
        database = if config.database.is_memory() { "memory" } else { "sqlite" },
        forecast_requires_auth = config.forecasting.require_auth,
        "Starting load board"
    );

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            std::process::exit(1);
        }
    };

    let app = build_app(&config, state);

    let bind_addr = std::net::SocketAddr::new(config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %bind_addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
