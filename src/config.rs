use anyhow::{Context, Result};

use crate::routing::redirect::DEFAULT_INTERNAL_PREFIXES;

#[derive(Debug, Clone)]
pub struct Config {
    // Site
    /// Public origin without trailing slash, used for absolute sitemap URLs
    pub site_url: String,
    pub port: u16,

    // Content backend
    pub cms_graphql_url: String,
    pub cms_auth_token: Option<String>,
    /// Articles per listing page
    pub page_size: u32,

    // Newsletter
    pub newsletter_api_url: String,
    /// Newsletter signups are disabled when unset
    pub newsletter_api_key: Option<String>,
    pub newsletter_list_id: u64,

    // Routing
    /// Path prefixes that bypass the edge redirect rule (besides `/api`)
    pub edge_excluded_prefixes: Vec<String>,

    // Sitemap binary
    pub sitemap_output: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            site_url: std::env::var("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://qahwaworld.com".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            cms_graphql_url: std::env::var("CMS_GRAPHQL_URL")
                .context("CMS_GRAPHQL_URL not set")?,
            cms_auth_token: non_empty_var("CMS_AUTH_TOKEN"),
            page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),

            newsletter_api_url: std::env::var("NEWSLETTER_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.brevo.com/v3".to_string()),
            newsletter_api_key: non_empty_var("NEWSLETTER_API_KEY"),
            newsletter_list_id: std::env::var("NEWSLETTER_LIST_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),

            edge_excluded_prefixes: std::env::var("EDGE_EXCLUDED_PREFIXES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| {
                    DEFAULT_INTERNAL_PREFIXES
                        .iter()
                        .map(|p| p.to_string())
                        .collect()
                }),

            sitemap_output: std::env::var("SITEMAP_OUTPUT")
                .unwrap_or_else(|_| "public/sitemap.xml".to_string()),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SITE_URL",
        "PORT",
        "CMS_GRAPHQL_URL",
        "CMS_AUTH_TOKEN",
        "PAGE_SIZE",
        "NEWSLETTER_API_URL",
        "NEWSLETTER_API_KEY",
        "NEWSLETTER_LIST_ID",
        "EDGE_EXCLUDED_PREFIXES",
        "SITEMAP_OUTPUT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_cms_url() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("CMS_GRAPHQL_URL"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("CMS_GRAPHQL_URL", "https://cms.example.com/graphql");

        let config = Config::from_env().unwrap();

        assert_eq!(config.site_url, "https://qahwaworld.com");
        assert_eq!(config.port, 3000);
        assert_eq!(config.page_size, 12);
        assert_eq!(config.newsletter_api_url, "https://api.brevo.com/v3");
        assert!(config.newsletter_api_key.is_none());
        assert!(config.cms_auth_token.is_none());
        assert_eq!(config.newsletter_list_id, 2);
        assert_eq!(
            config.edge_excluded_prefixes,
            vec!["/_internal", "/static", "/assets"]
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("CMS_GRAPHQL_URL", "https://cms.example.com/graphql");
        std::env::set_var("SITE_URL", "https://staging.qahwaworld.com/");
        std::env::set_var("PORT", "8080");
        std::env::set_var("NEWSLETTER_API_KEY", "  ");
        std::env::set_var("NEWSLETTER_LIST_ID", "not-a-number");
        std::env::set_var("EDGE_EXCLUDED_PREFIXES", "/preview, ,/drafts");

        let config = Config::from_env().unwrap();

        assert_eq!(config.site_url, "https://staging.qahwaworld.com");
        assert_eq!(config.port, 8080);
        assert!(config.newsletter_api_key.is_none());
        assert_eq!(config.newsletter_list_id, 2);
        assert_eq!(config.edge_excluded_prefixes, vec!["/preview", "/drafts"]);
        clear_env();
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
