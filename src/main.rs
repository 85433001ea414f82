use std::{error::Error, time::Duration};

use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use taskboard::{config::AppConfig, create_router, db, store::Stores, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default `info` level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(err) = run().await {
        tracing::error!("Taskboard terminated: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing::info!("Taskboard - Starting...");

    let config = AppConfig::from_env()?;

    let stores = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;
            db::run_migrations(&pool).await?;
            Stores::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store, data is lost on exit");
            Stores::in_memory()
        }
    };

    let addr = config.bind_address();
    let grace = config.shutdown_grace;
    let app = create_router(AppState::new(config, stores));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Taskboard is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                stop_rx.await.ok();
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // Server stopped on its own, which only happens on error
            result??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Shutdown signal received; draining in-flight requests for up to {:?}", grace);
    let _ = stop_tx.send(());

    drain(server, grace).await
}

/// Wait for the server to finish, giving up after `grace`
async fn drain(
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result??;
            tracing::info!("Server stopped");
        }
        Err(_) => tracing::warn!("Grace period elapsed; forcing shutdown"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
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
}
