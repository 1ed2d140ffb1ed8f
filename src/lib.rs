pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use std::time::Duration;
use tokio::signal;
use tower_sessions::ExpiredDeletion;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, cmd_create_user, cmd_init_config};
pub use config::Config;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, prometheus_handle).await,

        Commands::CreateUser {
            username,
            password,
            admin,
        } => cmd_create_user(&config, &username, &password, admin).await,

        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            cmd_init_config(&path)
        }
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Bloqueos v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cleanup_interval = Duration::from_secs(config.server.session_cleanup_interval_seconds);

    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let session_store = api::session_store(&state).await?;

    let cleanup_handle = tokio::task::spawn(
        session_store
            .clone()
            .continuously_delete_expired(cleanup_interval),
    );

    let app = api::router_with_session_store(state, session_store)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    cleanup_handle.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
