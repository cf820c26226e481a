//! Sitemap binary - writes sitemap.xml from the current CMS content
//!
//! Usage:
//!   cargo run --bin sitemap
//!
//! Required environment variables:
//! - CMS_GRAPHQL_URL
//!
//! Optional:
//! - CMS_AUTH_TOKEN
//! - SITE_URL (defaults to https://qahwaworld.com)
//! - SITEMAP_OUTPUT (defaults to public/sitemap.xml)

use std::path::Path;

use anyhow::Result;
use qahwa_world::{cms::CmsClient, config::Config, sitemap};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qahwa_world=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let cms = CmsClient::from_config(&config);

    info!("Generating sitemap for {}", config.site_url);
    let xml = sitemap::generate_sitemap(&cms, &config.site_url).await?;

    let output = Path::new(&config.sitemap_output);
    sitemap::write_sitemap(output, &xml)?;
    info!("✓ Sitemap written to {}", output.display());

    Ok(())
}
