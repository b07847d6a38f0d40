use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tnc_api::config::ServerConfig;
use tnc_api::router::build_app_router;
use tnc_api::services::{quiz_generator, storage};
use tnc_api::state::AppState;
use tnc_db::DbPool;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let pool = connect_database().await;
    let state = build_state(pool.clone(), &config).await;
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Training management API listening");

    // One signal listener; both the server and the grace timer watch it.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let server = axum::serve(listener, app).with_graceful_shutdown(wait_for(shutdown_rx.clone()));
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    tokio::select! {
        result = server => result.expect("Server error"),
        () = async {
            wait_for(shutdown_rx).await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(?grace, "Shutdown grace period elapsed, dropping remaining connections");
        }
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// `RUST_LOG` filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tnc_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify, and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = tnc_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tnc_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tnc_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");
    pool
}

async fn build_state(pool: DbPool, config: &ServerConfig) -> AppState {
    let storage: Arc<dyn storage::StorageProvider> = storage::from_config(&config.storage)
        .await
        .expect("Failed to initialize object storage")
        .into();
    let quiz_generator: Arc<dyn quiz_generator::QuizGenerator> =
        quiz_generator::from_config(&config.ai).into();
    tracing::info!(
        storage = storage.name(),
        quiz_generator = quiz_generator.mode(),
        "Services initialized"
    );

    AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        quiz_generator,
    }
}

async fn wait_for(mut rx: watch::Receiver<bool>) {
    // A dropped sender also ends the wait.
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
