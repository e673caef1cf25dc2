use sellerdesk_api::config::AppConfig;
use sellerdesk_observability::LogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    sellerdesk_observability::init(&LogConfig::with_format(config.log_format));
    config.warn_insecure_defaults();

    let app = sellerdesk_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
