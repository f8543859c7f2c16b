//! # PayLance API Library
//!
//! HTTP server for the PayLance invoice generator.
//!
//! ## Module Organization
//! ```text
//! paylance_api/
//! ├── lib.rs          ◄─── You are here (router, startup)
//! ├── config.rs       ◄─── TOML + environment configuration
//! ├── error.rs        ◄─── API error type for handlers
//! ├── llm.rs          ◄─── Language model client
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── editor.rs   ◄─── Editing session + debounced draft save
//! └── handlers/       ◄─── One file per route group
//! ```
//!
//! ## Routes
//! ```text
//! GET    /health
//! GET    /api/currencies
//! GET    /api/templates
//! POST   /api/generate
//! GET    /api/editor                    POST /api/editor     DELETE /api/editor
//! POST   /api/editor/edits
//! POST   /api/editor/save
//! GET    /api/editor/preview?template=
//! GET    /api/suggestions/clients?q=    GET  /api/suggestions/items?q=
//! GET    /api/invoices?order=
//! GET    /api/invoices/:id              DELETE /api/invoices/:id
//! PATCH  /api/invoices/:id/status
//! POST   /api/invoices/:id/edit
//! GET    /api/invoices/:id/render?template=
//! GET    /api/branding                  PUT  /api/branding
//! GET    /api/stats
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use directories::ProjectDirs;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use handlers::{editor, generate, health, invoices, settings, stats, suggestions};
use llm::AnthropicExtractor;
use paylance_db::{Database, DbConfig};
use state::AppState;

/// Builds the router with every route and middleware.
pub fn build_router(state: AppState) -> Router {
    let editor_routes = Router::new()
        .route(
            "/",
            get(editor::get_session)
                .post(editor::start_session)
                .delete(editor::discard_session),
        )
        .route("/edits", post(editor::apply_edits))
        .route("/save", post(editor::save_session))
        .route("/preview", get(editor::preview_session));

    let invoice_routes = Router::new()
        .route("/", get(invoices::list_invoices))
        .route(
            "/:id",
            get(invoices::get_invoice).delete(invoices::delete_invoice),
        )
        .route("/:id/status", patch(invoices::update_status))
        .route("/:id/edit", post(invoices::edit_invoice))
        .route("/:id/render", get(invoices::render));

    let api_routes = Router::new()
        .route("/currencies", get(settings::list_currencies))
        .route("/templates", get(settings::list_templates))
        .route(
            "/branding",
            get(settings::get_branding).put(settings::update_branding),
        )
        .route("/generate", post(generate::generate_invoice))
        .route("/suggestions/clients", get(suggestions::suggest_clients))
        .route("/suggestions/items", get(suggestions::suggest_items))
        .route("/stats", get(stats::get_stats))
        .nest("/editor", editor_routes)
        .nest("/invoices", invoice_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Runs the API server until Ctrl-C.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: INFO, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • paylance.toml, then PAYLANCE_* environment variables              │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Initialize State ─────────────────────────────────────────────────► │
/// │     • Language model client                                             │
/// │     • Stored draft becomes the open session                             │
/// │                                                                         │
/// │  5. Serve ────────────────────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting PayLance API");

    let config = AppConfig::load_or_default(None);

    let db_path = get_database_path(&config)?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    if config.llm.api_key.is_none() {
        tracing::warn!("No language model API key configured; generation is disabled");
    }
    let extractor = Arc::new(AnthropicExtractor::new(config.llm.clone())?);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::initialize(db.clone(), extractor, config).await?;
    info!("State initialized");

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("PayLance API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=paylance=trace` - Show trace for paylance crates only
/// - Default: INFO, with debug for paylance crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paylance=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.paylance.paylance/paylance.db`
/// - **Windows**: `%APPDATA%\paylance\paylance\data\paylance.db`
/// - **Linux**: `~/.local/share/paylance/paylance.db`
///
/// `db_path` in the config (or `PAYLANCE_DB_PATH`) takes precedence.
fn get_database_path(config: &AppConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "paylance", "paylance")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("paylance.db"))
}
