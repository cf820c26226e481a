//! Client for the headless CMS GraphQL endpoint.
//!
//! Every operation is a single POST of `{ query, variables }`. Transport
//! failures and 5xx responses are retried; GraphQL-level errors are not.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::i18n::Language;
use crate::retry::{with_retry_if, RetryConfig};
use crate::routing::{localize, ArticleTranslation, CategoryTranslation, LanguageRef};

// ==================== Errors ====================

#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("CMS query failed: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("CMS response contained no data")]
    MissingData,

    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CmsError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            CmsError::Transport(_) => true,
            CmsError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

// ==================== Content Types ====================

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// GraphQL connection wrapper (`{ nodes: [...] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Nodes<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// Single-node edge (`{ node: {...} }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub source_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// Category as embedded in articles and listed for the sitemap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Vec<CategoryTranslation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(default)]
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<Avatar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub url: String,
}

/// Article as shown in listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    #[serde(default)]
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<Edge<Image>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Nodes<Category>,
}

impl ArticleSummary {
    /// Localized path of this article under its primary category.
    pub fn path(&self, language: Language) -> Option<String> {
        let category = self.categories.nodes.first()?;
        Some(localize(
            &format!("/{}/{}", category.slug, self.slug),
            language,
        ))
    }
}

/// Full article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<LanguageRef>,
    #[serde(default)]
    pub featured_image: Option<Edge<Image>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Nodes<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Nodes<TagRef>,
    #[serde(default)]
    pub author: Option<Edge<Author>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: Vec<ArticleTranslation>,
}

impl Article {
    pub fn primary_category(&self) -> Option<&Category> {
        self.categories.nodes.first()
    }

    /// `true` when `segment` names one of the article's categories, in any
    /// of their languages.
    pub fn is_filed_under(&self, segment: &str) -> bool {
        self.categories.nodes.iter().any(|category| {
            category.slug == segment
                || category.translations.iter().any(|t| t.slug == segment)
        })
    }

    /// Translations including the article itself.
    ///
    /// The CMS lists only the *other* language versions; the article's own
    /// slug is added so its own language gets an alternate path too.
    pub fn all_translations(&self) -> Vec<ArticleTranslation> {
        let mut all = Vec::with_capacity(self.translations.len() + 1);
        if let Some(language) = &self.language {
            all.push(ArticleTranslation {
                slug: self.slug.clone(),
                language: language.clone(),
            });
        }
        all.extend(self.translations.iter().cloned());
        all
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagPage {
    pub tag: Tag,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorPage {
    pub author: Author,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    #[serde(default)]
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
}

// ==================== Wire Types ====================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<Article>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    #[serde(default, deserialize_with = "null_as_default")]
    posts: Nodes<ArticleSummary>,
}

#[derive(Debug, Deserialize)]
struct SitemapPostsData {
    #[serde(default, deserialize_with = "null_as_default")]
    posts: Nodes<Article>,
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    category: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    #[serde(default, deserialize_with = "null_as_default")]
    categories: Nodes<Category>,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    #[serde(flatten)]
    tag: Tag,
    #[serde(default, deserialize_with = "null_as_default")]
    posts: Nodes<ArticleSummary>,
}

#[derive(Debug, Deserialize)]
struct TagData {
    tag: Option<TagNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    #[serde(flatten)]
    author: Author,
    #[serde(default, deserialize_with = "null_as_default")]
    posts: Nodes<ArticleSummary>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
struct PageData {
    page: Option<StaticPage>,
}

// ==================== Queries ====================

const ARTICLE_CARD_FRAGMENT: &str = r#"
fragment ArticleCard on Post {
  title
  slug
  date
  excerpt
  featuredImage { node { sourceUrl altText } }
  categories { nodes { name slug } }
}"#;

const ARTICLE_BY_SLUG: &str = r#"
query ArticleBySlug($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    title
    slug
    date
    modified
    excerpt
    content
    language { code }
    featuredImage { node { sourceUrl altText } }
    categories { nodes { name slug translations { slug languageCode } } }
    tags { nodes { name slug } }
    author { node { name slug } }
    translations { slug language { code } }
  }
}"#;

const CATEGORY_BY_SLUG: &str = r#"
query CategoryBySlug($slug: ID!) {
  category(id: $slug, idType: SLUG) {
    name
    slug
    description
    translations { slug languageCode }
  }
}"#;

const ARTICLES_BY_CATEGORY: &str = r#"
query ArticlesByCategory($category: String!, $language: LanguageCodeFilterEnum!, $first: Int!) {
  posts(first: $first, where: { categoryName: $category, language: $language }) {
    nodes { ...ArticleCard }
  }
}"#;

const LATEST_ARTICLES: &str = r#"
query LatestArticles($language: LanguageCodeFilterEnum!, $first: Int!) {
  posts(first: $first, where: { language: $language }) {
    nodes { ...ArticleCard }
  }
}"#;

const TAG_BY_SLUG: &str = r#"
query TagBySlug($slug: ID!, $language: LanguageCodeFilterEnum!, $first: Int!) {
  tag(id: $slug, idType: SLUG) {
    name
    slug
    description
    posts(first: $first, where: { language: $language }) {
      nodes { ...ArticleCard }
    }
  }
}"#;

const AUTHOR_BY_SLUG: &str = r#"
query AuthorBySlug($slug: ID!, $language: LanguageCodeFilterEnum!, $first: Int!) {
  user(id: $slug, idType: SLUG) {
    name
    slug
    description
    avatar { url }
    posts(first: $first, where: { language: $language }) {
      nodes { ...ArticleCard }
    }
  }
}"#;

const PAGE_BY_SLUG: &str = r#"
query PageBySlug($slug: ID!) {
  page(id: $slug, idType: URI) {
    title
    slug
    content
    modified
  }
}"#;

const CATEGORIES: &str = r#"
query Categories($language: LanguageCodeFilterEnum!) {
  categories(first: 100, where: { language: $language, hideEmpty: true }) {
    nodes { name slug translations { slug languageCode } }
  }
}"#;

const SITEMAP_ARTICLES: &str = r#"
query SitemapArticles($language: LanguageCodeFilterEnum!, $first: Int!) {
  posts(first: $first, where: { language: $language }) {
    nodes {
      slug
      modified
      language { code }
      categories { nodes { slug translations { slug languageCode } } }
      translations { slug language { code } }
    }
  }
}"#;

fn with_card_fragment(query: &str) -> String {
    format!("{}\n{}", query, ARTICLE_CARD_FRAGMENT)
}

// ==================== Client ====================

#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

impl CmsClient {
    pub fn new(endpoint: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth_token,
            retry: RetryConfig::cms_query(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cms_graphql_url.clone(), config.cms_auth_token.clone())
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run a GraphQL operation and decode its `data` into `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, CmsError> {
        with_retry_if(
            &self.retry,
            operation,
            || self.execute(query, &variables),
            CmsError::is_retryable,
        )
        .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<T, CmsError> {
        let mut request = self.http.post(&self.endpoint).json(&GraphQlRequest {
            query,
            variables: variables.clone(),
        });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse = serde_json::from_str(&body)?;
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();

        match envelope.data {
            Some(Value::Null) | None if !messages.is_empty() => Err(CmsError::GraphQl(messages)),
            Some(Value::Null) | None => Err(CmsError::MissingData),
            Some(data) => {
                if !messages.is_empty() {
                    warn!("CMS returned partial data with errors: {}", messages.join("; "));
                }
                Ok(serde_json::from_value(data)?)
            }
        }
    }

    pub async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, CmsError> {
        debug!(slug, "Fetching article");
        let data: PostData = self
            .query("ArticleBySlug", ARTICLE_BY_SLUG, json!({ "slug": slug }))
            .await?;
        Ok(data.post)
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, CmsError> {
        debug!(slug, "Fetching category");
        let data: CategoryData = self
            .query("CategoryBySlug", CATEGORY_BY_SLUG, json!({ "slug": slug }))
            .await?;
        Ok(data.category)
    }

    pub async fn articles_by_category(
        &self,
        category_slug: &str,
        language: Language,
        first: u32,
    ) -> Result<Vec<ArticleSummary>, CmsError> {
        let data: PostsData = self
            .query(
                "ArticlesByCategory",
                &with_card_fragment(ARTICLES_BY_CATEGORY),
                json!({
                    "category": category_slug,
                    "language": language.graphql_code(),
                    "first": first,
                }),
            )
            .await?;
        Ok(data.posts.nodes)
    }

    pub async fn latest_articles(
        &self,
        language: Language,
        first: u32,
    ) -> Result<Vec<ArticleSummary>, CmsError> {
        let data: PostsData = self
            .query(
                "LatestArticles",
                &with_card_fragment(LATEST_ARTICLES),
                json!({ "language": language.graphql_code(), "first": first }),
            )
            .await?;
        Ok(data.posts.nodes)
    }

    pub async fn tag_by_slug(
        &self,
        slug: &str,
        language: Language,
        first: u32,
    ) -> Result<Option<TagPage>, CmsError> {
        let data: TagData = self
            .query(
                "TagBySlug",
                &with_card_fragment(TAG_BY_SLUG),
                json!({ "slug": slug, "language": language.graphql_code(), "first": first }),
            )
            .await?;
        Ok(data.tag.map(|node| TagPage {
            tag: node.tag,
            articles: node.posts.nodes,
        }))
    }

    pub async fn author_by_slug(
        &self,
        slug: &str,
        language: Language,
        first: u32,
    ) -> Result<Option<AuthorPage>, CmsError> {
        let data: UserData = self
            .query(
                "AuthorBySlug",
                &with_card_fragment(AUTHOR_BY_SLUG),
                json!({ "slug": slug, "language": language.graphql_code(), "first": first }),
            )
            .await?;
        Ok(data.user.map(|node| AuthorPage {
            author: node.author,
            articles: node.posts.nodes,
        }))
    }

    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<StaticPage>, CmsError> {
        let data: PageData = self
            .query("PageBySlug", PAGE_BY_SLUG, json!({ "slug": slug }))
            .await?;
        Ok(data.page)
    }

    pub async fn categories(&self, language: Language) -> Result<Vec<Category>, CmsError> {
        let data: CategoriesData = self
            .query(
                "Categories",
                CATEGORIES,
                json!({ "language": language.graphql_code() }),
            )
            .await?;
        Ok(data.categories.nodes)
    }

    pub async fn sitemap_articles(
        &self,
        language: Language,
        first: u32,
    ) -> Result<Vec<Article>, CmsError> {
        let data: SitemapPostsData = self
            .query(
                "SitemapArticles",
                SITEMAP_ARTICLES,
                json!({ "language": language.graphql_code(), "first": first }),
            )
            .await?;
        Ok(data.posts.nodes)
    }
}
