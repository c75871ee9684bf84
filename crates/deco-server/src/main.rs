mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use deco_api::clock::SystemClock;
use deco_api::state::{AppStateInner, Store};
use deco_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deco_server=debug,deco_api=debug,deco_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store = open_store(config.database_uri.as_deref());
    let state = AppStateInner::new(store, Arc::new(SystemClock));

    let app = deco_api::router(state, config.rate_limits)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("DecoMyTree server listening on {}", addr);
    info!(
        "Rate limits per minute: signup {}, login {}, trees {}, messages {}",
        config.rate_limits.signup,
        config.rate_limits.login,
        config.rate_limits.trees,
        config.rate_limits.messages
    );
    if config.rate_limits.trust_proxy_headers {
        warn!("Keying rate limits on X-Forwarded-For / X-Real-IP; only safe behind a rewriting proxy");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolve the store once. Failures leave the server running with every
/// persistence-backed route answering 503.
fn open_store(uri: Option<&str>) -> Store {
    let Some(uri) = uri else {
        warn!("No valid database URI found. Database will NOT work.");
        warn!("Set DECO_DATABASE_URI, or DECO_DB_DIR and DECO_DB_NAME, in your .env file.");
        return Store::Unavailable;
    };

    match Database::open(uri).and_then(|db| db.ping().map(|_| db)) {
        Ok(db) => {
            info!("Connected to database");
            Store::Connected(Arc::new(db))
        }
        Err(e) => {
            error!("Failed to open database: {:#}", e);
            Store::Unavailable
        }
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let list = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{}'", o)))
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
