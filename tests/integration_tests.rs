//! Integration tests for the Qahwa World site service
//!
//! These drive the full router (edge redirect rule, page loading, newsletter
//! and sitemap endpoints) against mocked CMS and newsletter backends.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use qahwa_world::{
    config::Config,
    routing::{build_article_alternates, ArticleTranslation},
    server::{router, AppState},
    sitemap,
};

// ==================== Test Helpers ====================

fn create_test_config(cms_url: &str, newsletter_url: &str) -> Config {
    Config {
        site_url: "https://qahwaworld.com".to_string(),
        port: 0,
        cms_graphql_url: format!("{}/graphql", cms_url),
        cms_auth_token: None,
        page_size: 6,
        newsletter_api_url: newsletter_url.to_string(),
        newsletter_api_key: Some("test-newsletter-key".to_string()),
        newsletter_list_id: 3,
        edge_excluded_prefixes: vec!["/_internal".to_string(), "/static".to_string()],
        sitemap_output: "unused.xml".to_string(),
    }
}

fn app_for(cms: &MockServer, newsletter: &MockServer) -> Router {
    let mut state = AppState::new(create_test_config(&cms.uri(), &newsletter.uri()));
    state.cms = state
        .cms
        .clone()
        .with_retry(qahwa_world::retry::RetryConfig::none());
    state.newsletter = state
        .newsletter
        .clone()
        .with_retry(qahwa_world::retry::RetryConfig::none());
    router(state).expect("router builds")
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mock_graphql(server: &MockServer, operation: &str, data: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains(operation))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

// ==================== Edge Redirect Tests ====================

#[tokio::test]
async fn test_default_locale_prefix_redirects() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;

    for (from, to) in [("/en/news/article-1", "/news/article-1"), ("/en", "/")] {
        let response = get(app_for(&cms, &newsletter), from).await;
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], to);
    }

    assert!(cms.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_excluded_paths_are_not_redirected() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;

    let response = get(app_for(&cms, &newsletter), "/en/cover.webp").await;
    assert_ne!(response.status(), StatusCode::PERMANENT_REDIRECT);
}

// ==================== Page Tests ====================

#[tokio::test]
async fn test_arabic_category_page() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    mock_graphql(
        &cms,
        "CategoryBySlug",
        json!({ "category": {
            "name": "أخبار",
            "slug": "news",
            "translations": [
                { "slug": "news", "languageCode": "en" },
                { "slug": "novosti", "languageCode": "ru" }
            ]
        }}),
    )
    .await;
    mock_graphql(
        &cms,
        "ArticlesByCategory",
        json!({ "posts": { "nodes": [
            { "title": "Qahwa", "slug": "qahwa", "categories": { "nodes": [ { "slug": "news" } ] } }
        ]}}),
    )
    .await;

    let response = get(app_for(&cms, &newsletter), "/ar/news").await;
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    assert_eq!(view["language"], "ar");
    assert_eq!(view["direction"], "rtl");
    assert_eq!(view["canonical_path"], "/news");
    assert_eq!(view["alternates"]["en"], "/news");
    assert_eq!(view["alternates"]["ar"], "/ar/news");
    assert_eq!(view["alternates"]["ru"], "/ru/novosti");
    assert_eq!(view["content"]["kind"], "category");
    assert_eq!(view["content"]["articles"][0]["path"], "/ar/news/qahwa");
    assert_eq!(view["switcher"].as_array().unwrap().len(), 3);
    assert_eq!(view["switcher"][1]["active"], true);
}

#[tokio::test]
async fn test_tag_page_uses_localized_alternates() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    mock_graphql(
        &cms,
        "TagBySlug",
        json!({ "tag": { "name": "Espresso", "slug": "espresso", "posts": { "nodes": [] } } }),
    )
    .await;

    let response = get(app_for(&cms, &newsletter), "/ru/tag/espresso").await;
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    assert_eq!(view["direction"], "ltr");
    assert_eq!(view["alternates"]["en"], "/tag/espresso");
    assert_eq!(view["alternates"]["ar"], "/ar/tag/espresso");
    assert_eq!(view["content"]["tag"]["name"], "Espresso");
}

#[tokio::test]
async fn test_missing_article_returns_localized_404() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    mock_graphql(&cms, "ArticleBySlug", json!({ "post": null })).await;

    let response = get(app_for(&cms, &newsletter), "/ru/news/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["language"], "ru");
    assert_eq!(body["message"], "Страница, которую вы ищете, не найдена.");
}

#[tokio::test]
async fn test_cms_failure_returns_bad_gateway() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&cms)
        .await;

    let response = get(app_for(&cms, &newsletter), "/").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;

    let response = get(app_for(&cms, &newsletter), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

// ==================== Newsletter Tests ====================

#[tokio::test]
async fn test_newsletter_subscribe() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(body_string_contains("\"LANGUAGE\":\"ar\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&newsletter)
        .await;

    let response = post_json(
        app_for(&cms, &newsletter),
        "/api/newsletter",
        json!({ "email": "reader@qahwaworld.com", "language": "AR" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["outcome"], "subscribed");
    assert_eq!(body["message"], "شكراً لاشتراكك! تفقد بريدك الوارد لعددنا القادم.");
}

#[tokio::test]
async fn test_newsletter_invalid_email() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;

    let response = post_json(
        app_for(&cms, &newsletter),
        "/api/newsletter",
        json!({ "email": "nope" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "Please enter a valid email address.");
    assert!(newsletter.received_requests().await.unwrap().is_empty());
}

// ==================== Sitemap Tests ====================

async fn mock_sitemap_content(cms: &MockServer) {
    mock_graphql(
        cms,
        "query Categories",
        json!({ "categories": { "nodes": [
            { "name": "News", "slug": "news", "translations": [ { "slug": "akhbar", "languageCode": "ar" } ] }
        ]}}),
    )
    .await;
    mock_graphql(
        cms,
        "SitemapArticles",
        json!({ "posts": { "nodes": [
            {
                "slug": "crema",
                "modified": "2024-05-03T09:30:00",
                "language": { "code": "EN" },
                "categories": { "nodes": [ { "slug": "news", "translations": [
                    { "slug": "akhbar", "languageCode": "ar" }
                ]}]},
                "translations": [ { "slug": "krima", "language": { "code": "AR" } } ]
            }
        ]}}),
    )
    .await;
}

#[tokio::test]
async fn test_sitemap_endpoint() {
    let cms = MockServer::start().await;
    let newsletter = MockServer::start().await;
    mock_sitemap_content(&cms).await;

    let response = get(app_for(&cms, &newsletter), "/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/xml"));

    let xml = body_text(response).await;
    assert!(xml.contains("<loc>https://qahwaworld.com/</loc>"));
    assert!(xml.contains("<loc>https://qahwaworld.com/ar/akhbar</loc>"));
    assert!(xml.contains("<loc>https://qahwaworld.com/ru/news</loc>"));
    assert!(xml.contains("<loc>https://qahwaworld.com/news/crema</loc>"));
    assert!(xml.contains("<loc>https://qahwaworld.com/ar/akhbar/krima</loc>"));
    assert!(xml.contains("<lastmod>2024-05-03</lastmod>"));
    assert!(xml.contains("<loc>https://qahwaworld.com/ar/about-us</loc>"));
    // Same article is returned for every language; it must appear once.
    assert_eq!(xml.matches("<loc>https://qahwaworld.com/news/crema</loc>").count(), 1);
}

#[tokio::test]
async fn test_sitemap_generate_and_write() {
    let cms = MockServer::start().await;
    mock_sitemap_content(&cms).await;

    let client = qahwa_world::cms::CmsClient::new(format!("{}/graphql", cms.uri()), None);
    let xml = sitemap::generate_sitemap(&client, "https://qahwaworld.com")
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("public/sitemap.xml");
    sitemap::write_sitemap(&output, &xml).unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("hreflang=\"x-default\" href=\"https://qahwaworld.com/news/crema\""));
}

// ==================== Alternate Path Scenarios ====================

#[test]
fn test_article_alternates_from_cms_shape() {
    let translations: Vec<ArticleTranslation> = serde_json::from_value(json!([
        { "slug": "a-en", "language": { "code": "EN" } },
        { "slug": "a-xx", "language": { "code": "XX" } }
    ]))
    .unwrap();

    let paths = build_article_alternates(&translations, "news", &[]);

    assert_eq!(paths.len(), 1);
    assert_eq!(paths["en"], "/news/a-en");
}
