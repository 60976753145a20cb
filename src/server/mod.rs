pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod router;

use crate::config::AppConfig;
use proxy::ProxyState;
use std::net::SocketAddr;

pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.server_port).parse()?;

    if !config.is_ready() {
        log::warn!(
            "No chat credential configured; set {} or GOOGLE_API_KEY",
            config.chat.key_var
        );
    }
    log::info!(
        "Models: chat={} build={} image={}",
        config.chat.model,
        config.build.model,
        config.image.model
    );

    let app = router::create_router(ProxyState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Axum server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
