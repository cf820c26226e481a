//! Page routing and view models.
//!
//! A canonical path maps to one [`PageRoute`]; [`load_page`] fetches the
//! entity behind it, publishes its alternate paths into the render context
//! and assembles the JSON view consumed by the front end.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::cms::{
    Article, ArticleSummary, Author, Category, CmsClient, CmsError, StaticPage, Tag,
};
use crate::i18n::{Direction, Language, LanguageStrings};
use crate::render::{RenderContext, SwitcherLink};
use crate::routing::{
    build_alternate_paths, AlternatePathMap, AlternateSource, CategoryTranslation,
};

/// Slugs served as static pages rather than categories.
pub const STATIC_PAGE_SLUGS: &[&str] = &[
    "about-us",
    "contact-us",
    "privacy-policy",
    "terms-and-conditions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRoute {
    Home,
    StaticPage(String),
    Tag(String),
    Author(String),
    Category(String),
    Article { category: String, slug: String },
    NotFound,
}

impl PageRoute {
    /// Classify a canonical (unprefixed) path. Segments are percent-decoded.
    pub fn parse(canonical_path: &str) -> PageRoute {
        let segments: Vec<String> = canonical_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();

        match segments.as_slice() {
            [] => PageRoute::Home,
            [kind, slug] if kind == "tag" => PageRoute::Tag(slug.clone()),
            [kind, slug] if kind == "author" => PageRoute::Author(slug.clone()),
            [slug] if STATIC_PAGE_SLUGS.contains(&slug.as_str()) => {
                PageRoute::StaticPage(slug.clone())
            }
            [slug] => PageRoute::Category(slug.clone()),
            [category, slug] => PageRoute::Article {
                category: category.clone(),
                slug: slug.clone(),
            },
            _ => PageRoute::NotFound,
        }
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

/// Listing entry with its localized link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCard {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub path: Option<String>,
}

impl ArticleCard {
    fn list(articles: Vec<ArticleSummary>, language: Language) -> Vec<ArticleCard> {
        articles
            .into_iter()
            .map(|article| ArticleCard {
                path: article.path(language),
                article,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Home { articles: Vec<ArticleCard> },
    Article { article: Article },
    Category { category: Category, articles: Vec<ArticleCard> },
    Tag { tag: Tag, articles: Vec<ArticleCard> },
    Author { author: Author, articles: Vec<ArticleCard> },
    Page { page: StaticPage },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub site_name: &'static str,
    pub language: Language,
    pub direction: Direction,
    pub path: String,
    pub canonical_path: String,
    pub alternates: AlternatePathMap,
    pub switcher: Vec<SwitcherLink>,
    pub content: PageContent,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Cms(#[from] CmsError),
}

/// Fetch and assemble the page for `ctx`.
///
/// Alternate paths are published into the context for the duration of the
/// assembly and cleared again before returning.
pub async fn load_page(
    cms: &CmsClient,
    ctx: &RenderContext,
    page_size: u32,
) -> Result<PageView, PageError> {
    let language = ctx.language();
    let route = PageRoute::parse(&ctx.canonical_path);
    debug!(path = %ctx.path, ?route, language = %language, "Loading page");

    let static_alternates = || {
        build_alternate_paths(AlternateSource::Static {
            canonical_path: &ctx.canonical_path,
        })
    };

    let (content, alternates) = match route {
        PageRoute::Home => {
            let articles = cms.latest_articles(language, page_size).await?;
            (
                PageContent::Home {
                    articles: ArticleCard::list(articles, language),
                },
                static_alternates(),
            )
        }
        PageRoute::Article { category, slug } => {
            let article = cms
                .article_by_slug(&slug)
                .await?
                .filter(|article| article.is_filed_under(&category))
                .ok_or(PageError::NotFound)?;
            let category_translations: &[CategoryTranslation] = article
                .primary_category()
                .map(|c| c.translations.as_slice())
                .unwrap_or_default();
            let alternates = build_alternate_paths(AlternateSource::Article {
                translations: &article.all_translations(),
                category_slug: &category,
                category_translations,
            });
            (PageContent::Article { article }, alternates)
        }
        PageRoute::Category(slug) => {
            let (category, articles) = futures::future::try_join(
                cms.category_by_slug(&slug),
                cms.articles_by_category(&slug, language, page_size),
            )
            .await?;
            let category = category.ok_or(PageError::NotFound)?;
            let alternates = build_alternate_paths(AlternateSource::Category {
                slug: &slug,
                translations: &category.translations,
            });
            (
                PageContent::Category {
                    category,
                    articles: ArticleCard::list(articles, language),
                },
                alternates,
            )
        }
        PageRoute::Tag(slug) => {
            let page = cms
                .tag_by_slug(&slug, language, page_size)
                .await?
                .ok_or(PageError::NotFound)?;
            (
                PageContent::Tag {
                    tag: page.tag,
                    articles: ArticleCard::list(page.articles, language),
                },
                static_alternates(),
            )
        }
        PageRoute::Author(slug) => {
            let page = cms
                .author_by_slug(&slug, language, page_size)
                .await?
                .ok_or(PageError::NotFound)?;
            (
                PageContent::Author {
                    author: page.author,
                    articles: ArticleCard::list(page.articles, language),
                },
                static_alternates(),
            )
        }
        PageRoute::StaticPage(slug) => {
            let page = cms.page_by_slug(&slug).await?.ok_or(PageError::NotFound)?;
            (PageContent::Page { page }, static_alternates())
        }
        PageRoute::NotFound => return Err(PageError::NotFound),
    };

    let _published = ctx.alternates().publish(alternates);

    Ok(PageView {
        site_name: LanguageStrings::for_language(language).site_name,
        language,
        direction: ctx.locale.direction,
        path: ctx.path.clone(),
        canonical_path: ctx.canonical_path.clone(),
        alternates: ctx.alternates().current().unwrap_or_default(),
        switcher: ctx.switcher_links(),
        content,
    })
}
