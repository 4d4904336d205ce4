// Entry point: parse configuration, set up tracing and serve the API.
use anyhow::Context;
use clap::Parser;
use tourism_report::config::Config;
use tourism_report::routes::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let paths = config.data_paths();
    for path in [&paths.arrivals, &paths.expenditure, &paths.japan_monthly, &paths.korea_monthly] {
        // Files are read per request; a missing one only fails its endpoints.
        if !path.exists() {
            tracing::warn!(path = %path.display(), "data file not found");
        }
    }
    tracing::info!(data_dir = %config.data_dir.display(), "data directory");

    let app = router(AppState::new(paths));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("tourism report API listening on {}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
