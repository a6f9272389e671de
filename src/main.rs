use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use promo_pack::{AppConfig, Collaborators, Orchestrator, OrchestratorSettings, web_pages};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,promo_pack=debug")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let collaborators = Collaborators::from_config(&config).context("invalid configuration")?;
    info!(
        image_provider = ?config.image_provider,
        text_provider = ?config.text_provider,
        locales = config.locales.len(),
        "collaborators configured"
    );

    let orchestrator = Orchestrator::new(collaborators, OrchestratorSettings::from_config(&config));
    let router = web_pages::router(orchestrator, &config.static_dir);

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Promo pack server started at http://{}", bind_address);

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
