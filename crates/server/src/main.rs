//! Call Audit Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use call_audit_config::{load_settings, AnalysisRules, Settings};
use call_audit_pipeline::CallProcessor;
use call_audit_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.toml > config/default.toml > defaults
    let env = std::env::var("CALL_AUDIT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Call Audit Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_env = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let rules = match AnalysisRules::load_or_default(&config.analysis.rules_path) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!(error = %e, "Invalid analysis rules");
            std::process::exit(1);
        }
    };

    let metrics_handle = init_metrics();
    if metrics_handle.is_some() {
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let processor = match CallProcessor::with_http_backends(&config, &rules) {
        Ok(processor) => processor,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build pipeline");
            std::process::exit(1);
        }
    };

    let mut state = AppState::new(config.clone(), processor);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }

    // Background cleanup of expired jobs; shuts down with the server.
    let cleanup_shutdown = Arc::clone(&state.jobs).start_cleanup_task();

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address: {}", e))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = cleanup_shutdown.send(true);
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize tracing (console fmt, optional JSON)
fn init_tracing(config: &Settings) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("call_audit={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
