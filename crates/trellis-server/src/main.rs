mod app;
mod controllers;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trellis::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis=debug,trellis_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var("TRELLIS_CONFIG").unwrap_or_else(|_| "trellis.toml".to_string());
    let config = Config::load(&config_path)?;

    info!(
        config = %config_path,
        templates = %config.templates.dir,
        routes = config.effective_routes().len(),
        "Configuration loaded"
    );

    let dispatcher = app::build_dispatcher(&config)?;
    for route in dispatcher.routes().routes() {
        info!(method = %route.method, pattern = %route.pattern, handler = %route.handler, "Route registered");
    }

    if config.templates.preload {
        match dispatcher.templates().preload(&config.templates.preload_templates) {
            Ok(count) => info!(count, "Templates preloaded"),
            Err(e) => warn!(error = %e, "Template preload incomplete, remaining templates load on first use"),
        }
    }

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Server running");

    axum::serve(listener, app::router(Arc::new(dispatcher)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
