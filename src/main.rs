use server::handlers::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod config;
mod core;
mod error;
mod protocol;
mod sampling;
mod server;
mod service;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = config::Config::from_env()?;

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("Starting tabular sampling server");
    info!("Configuration: {:?}", config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = server::app(Arc::new(AppState::new(config)));

    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
