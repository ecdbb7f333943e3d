use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let config = mock_server::MockConfig {
        access_key: std::env::var("MOCK_ACCESS_KEY").unwrap_or_else(|_| mock_server::ACCESS_KEY.to_string()),
        secret_key: std::env::var("MOCK_SECRET_KEY").unwrap_or_else(|_| mock_server::SECRET_KEY.to_string()),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, access_key = %config.access_key, "mock catalog listening");
    axum::serve(listener, mock_server::app_with(config)).await
}
