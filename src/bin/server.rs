use weekly_digest::{api, core::config::DigestConfig, core::service::DigestService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = DigestConfig::from_env()?;
    let service = DigestService::from_config(&config)?;
    let app = api::router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Digest server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
