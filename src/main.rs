use anyhow::Result;
use qahwa_world::{config::Config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qahwa_world=info".parse()?),
        )
        .init();

    info!("Starting Qahwa World site service");

    let config = Config::from_env()?;
    info!(
        "CMS endpoint: {}, site: {}",
        config.cms_graphql_url, config.site_url
    );
    server::serve(config).await
}
