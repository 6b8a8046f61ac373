use std::{net::SocketAddr, sync::Arc};

use mcp_git_api::{
    build_app, config::Config, github::GitHubClient, github::GitHubProvider, logging, AppState,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    logging::init_logging(config.log_format);

    let github = Arc::new(GitHubClient::new(
        &config.github_token,
        &config.github_api_url,
        &config.github_web_url,
        config.github_timeout,
    )?);

    match github.authenticated_user().await {
        Ok(user) => info!(
            login = user.login.as_deref().unwrap_or("unknown"),
            "github connection verified"
        ),
        Err(err) => warn!(error = %err, "github connection check failed"),
    }

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(
        config.api_token.clone(),
        config.allowed_cidr,
        config.trusted_proxies.clone(),
        github,
        config.base_url.clone(),
        config.environment.clone(),
    );
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        environment = %config.environment,
        base_url = %config.base_url,
        "server starting"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
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
                warn!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received, draining connections");
}
