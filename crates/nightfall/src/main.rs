use nightfall::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), NightfallError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("NIGHTFALL_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let server = NightfallServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "Nightfall server starting");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
