//! `sitemap.xml` generation with per-language alternates.
//!
//! Every localized URL of an entity becomes its own `<url>` entry, and each
//! entry lists all of the entity's alternates as `xhtml:link` elements.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::cms::CmsClient;
use crate::i18n::Language;
use crate::pages::STATIC_PAGE_SLUGS;
use crate::routing::{
    build_article_alternates, build_category_alternates, build_static_alternates,
    AlternatePathMap,
};

/// Articles requested per language.
pub const SITEMAP_ARTICLE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub path: String,
    pub alternates: AlternatePathMap,
    pub last_modified: Option<NaiveDate>,
}

/// One entry per localized path of an entity, each carrying every alternate.
pub fn entries_for(alternates: &AlternatePathMap, last_modified: Option<NaiveDate>) -> Vec<SitemapEntry> {
    alternates
        .values()
        .map(|path| SitemapEntry {
            path: path.clone(),
            alternates: alternates.clone(),
            last_modified,
        })
        .collect()
}

/// Parse a CMS timestamp (RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` or a date).
pub fn parse_modified(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Gather sitemap entries for static pages, categories and articles.
pub async fn collect_entries(cms: &CmsClient) -> Result<Vec<SitemapEntry>> {
    let mut by_path: BTreeMap<String, SitemapEntry> = BTreeMap::new();
    let mut add = |entries: Vec<SitemapEntry>| {
        for entry in entries {
            by_path.entry(entry.path.clone()).or_insert(entry);
        }
    };

    add(entries_for(&build_static_alternates("/"), None));
    for slug in STATIC_PAGE_SLUGS {
        add(entries_for(&build_static_alternates(&format!("/{}", slug)), None));
    }

    let categories = cms
        .categories(Language::default_language())
        .await
        .context("Failed to fetch categories for sitemap")?;
    for category in &categories {
        add(entries_for(
            &build_category_alternates(&category.slug, &category.translations),
            None,
        ));
    }

    let per_language = futures::future::try_join_all(
        Language::all().map(|language| cms.sitemap_articles(language, SITEMAP_ARTICLE_LIMIT)),
    )
    .await
    .context("Failed to fetch articles for sitemap")?;

    let mut article_count = 0;
    for article in per_language.iter().flatten() {
        let Some(category) = article.primary_category() else {
            warn!(slug = %article.slug, "Skipping article without category in sitemap");
            continue;
        };
        let alternates = build_article_alternates(
            &article.all_translations(),
            &category.slug,
            &category.translations,
        );
        let modified = article.modified.as_deref().and_then(parse_modified);
        add(entries_for(&alternates, modified));
        article_count += 1;
    }

    info!(
        "Sitemap: {} categories, {} articles, {} URLs",
        categories.len(),
        article_count,
        by_path.len()
    );

    Ok(by_path.into_values().collect())
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Absolute URL for a root-relative path, percent-encoding each segment.
fn absolute_url(site_url: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    let joined = encoded.join("/");
    let joined = if joined.is_empty() { "/".to_string() } else { joined };
    escape_xml(&format!("{}{}", site_url.trim_end_matches('/'), joined))
}

pub fn render_sitemap(site_url: &str, entries: &[SitemapEntry]) -> String {
    let default_code = Language::default_language().code();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", absolute_url(site_url, &entry.path)));
        if let Some(date) = entry.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date.format("%Y-%m-%d")));
        }
        for (code, path) in &entry.alternates {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                code,
                absolute_url(site_url, path)
            ));
        }
        if let Some(default_path) = entry.alternates.get(default_code) {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"x-default\" href=\"{}\"/>\n",
                absolute_url(site_url, default_path)
            ));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub async fn generate_sitemap(cms: &CmsClient, site_url: &str) -> Result<String> {
    let entries = collect_entries(cms).await?;
    Ok(render_sitemap(site_url, &entries))
}

/// Write the sitemap, creating parent directories as needed.
pub fn write_sitemap(path: &Path, xml: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, xml).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::CategoryTranslation;

    #[test]
    fn test_parse_modified_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 3);
        assert_eq!(parse_modified("2024-05-03T09:30:00"), expected);
        assert_eq!(parse_modified("2024-05-03T09:30:00+03:00"), expected);
        assert_eq!(parse_modified("2024-05-03"), expected);
        assert_eq!(parse_modified("yesterday"), None);
    }

    #[test]
    fn test_entries_for_expands_each_language() {
        let alternates = build_category_alternates("news", &[]);
        let entries = entries_for(&alternates, None);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/ar/news", "/news", "/ru/news"]);
        assert!(entries.iter().all(|e| e.alternates.len() == 3));
    }

    #[test]
    fn test_absolute_url_encodes_segments() {
        assert_eq!(
            absolute_url("https://qahwaworld.com/", "/ar/أخبار"),
            "https://qahwaworld.com/ar/%D8%A3%D8%AE%D8%A8%D8%A7%D8%B1"
        );
        assert_eq!(absolute_url("https://qahwaworld.com", "/"), "https://qahwaworld.com/");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }

    #[test]
    fn test_render_sitemap() {
        let alternates = build_category_alternates(
            "news",
            &[CategoryTranslation::new("novosti", "ru")],
        );
        let mut entries = entries_for(&alternates, NaiveDate::from_ymd_opt(2024, 1, 2));
        entries.truncate(1);

        let xml = render_sitemap("https://qahwaworld.com", &entries);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:xhtml=\"http://www.w3.org/1999/xhtml\""));
        assert!(xml.contains("<loc>https://qahwaworld.com/ar/news</loc>"));
        assert!(xml.contains("<lastmod>2024-01-02</lastmod>"));
        assert!(xml.contains(
            "hreflang=\"ru\" href=\"https://qahwaworld.com/ru/novosti\""
        ));
        assert!(xml.contains(
            "hreflang=\"x-default\" href=\"https://qahwaworld.com/news\""
        ));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_render_without_default_alternate_has_no_x_default() {
        let mut alternates = AlternatePathMap::new();
        alternates.insert("ru", "/ru/news/story".to_string());
        let xml = render_sitemap("https://qahwaworld.com", &entries_for(&alternates, None));
        assert!(!xml.contains("x-default"));
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn test_write_sitemap_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("sitemap.xml");

        write_sitemap(&path, "<urlset/>").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<urlset/>");
    }
}
