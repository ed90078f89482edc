use anyhow::Context;

use printfleet_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    printfleet_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = printfleet_api::app::build_app_from_config(&config).context("failed to load seed data")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
