use anyhow::Context;

use wemakit_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    wemakit_observability::init(&config.log_filter);

    if config.uses_dev_secret() {
        tracing::warn!("WEMAKIT_JWT_SECRET not set; using insecure dev default");
    }

    let app = wemakit_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
