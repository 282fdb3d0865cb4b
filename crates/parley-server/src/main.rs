//! Parley server binary.
//!
//! Starts an axum HTTP server with structured logging, database initialization,
//! and graceful shutdown on SIGTERM/SIGINT.

use parley_db::SqliteCharacterStore;
use parley_server::{app, build_pipeline, config, AppState};
use parley_types::CharacterStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("PARLEY_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

/// Logs a fatal startup error and exits.
fn fatal(message: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables still apply.
    let dotenv = dotenvy::dotenv();

    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration. Tracing is not up yet, so failures go to stderr.
    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        dotenv = dotenv.is_ok(),
        "resolved startup configuration path"
    );

    if let Err(e) = config.validate() {
        fatal("invalid configuration", &e);
    }

    // Initialize database
    let pool = match parley_db::create_pool(
        &config.database.path,
        parley_db::DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    ) {
        Ok(pool) => pool,
        Err(e) => fatal("failed to create database pool (check database.path in config)", &e),
    };

    {
        let conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => fatal("failed to get database connection for migrations", &e),
        };
        match parley_db::run_migrations(&conn) {
            Ok(applied) if applied > 0 => {
                tracing::info!(count = applied, "applied database migrations")
            }
            Ok(_) => {}
            Err(e) => fatal("failed to run database migrations", &e),
        }
    }

    let characters: Arc<dyn CharacterStore> = Arc::new(SqliteCharacterStore::new(pool));

    let pipeline = match build_pipeline(&config, characters.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => fatal("failed to initialize voice backends", &e),
    };

    tracing::info!(
        region = %config.speech.region,
        languages = ?config.speech.candidate_languages,
        model = %config.llm.model,
        "voice backends ready"
    );

    // Build application
    let app = app(AppState {
        pipeline: Arc::new(pipeline),
        characters,
    });
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting parley server");

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => fatal("failed to bind to address; is another process using this port?", &e),
    };

    // Serve with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        fatal("server error", &e);
    }

    tracing::info!("parley server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
