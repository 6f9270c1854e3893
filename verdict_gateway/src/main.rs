use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdict_gateway::{config, start_app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::get_configuration().expect("failed to load config");
    // ort chatters at debug while sessions are built; keep it at info.
    let default_filter = format!("{},ort=info", config.log_level.as_str());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_level(true))
        .init();

    tracing::info!("Starting verdict gateway");
    start_app(config).await?;

    Ok(())
}
