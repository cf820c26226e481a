//! HTTP surface: router, shared state and handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::cms::CmsClient;
use crate::config::Config;
use crate::i18n::{Language, LanguageStrings};
use crate::newsletter::{NewsletterClient, NewsletterError, SubscribeOutcome};
use crate::pages::{load_page, PageError};
use crate::render::RenderContext;
use crate::routing::{edge_redirect, EdgeRedirectRule};
use crate::sitemap;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cms: CmsClient,
    pub newsletter: NewsletterClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            cms: CmsClient::from_config(&config),
            newsletter: NewsletterClient::from_config(&config),
            config: Arc::new(config),
        }
    }
}

/// Build the application router with the edge redirect rule in front of
/// every route.
pub fn router(state: AppState) -> Result<Router> {
    let rule = EdgeRedirectRule::new(state.config.edge_excluded_prefixes.as_slice())
        .context("Invalid EDGE_EXCLUDED_PREFIXES")?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/api/newsletter", post(subscribe))
        .fallback(page)
        .layer(from_fn_with_state(Arc::new(rule), edge_redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config);
    if !state.newsletter.is_configured() {
        info!("NEWSLETTER_API_KEY not set, newsletter signups disabled");
    }
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Handlers ====================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    language: Language,
    message: &'static str,
}

async fn page(State(state): State<AppState>, uri: Uri) -> Response {
    let ctx = RenderContext::for_path(uri.path());
    let language = ctx.language();
    let strings = LanguageStrings::for_language(language);

    match load_page(&state.cms, &ctx, state.config.page_size).await {
        Ok(view) => Json(view).into_response(),
        Err(PageError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                language,
                message: strings.not_found,
            }),
        )
            .into_response(),
        Err(PageError::Cms(e)) => {
            error!(path = %uri.path(), "Failed to load page: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    language,
                    message: strings.content_unavailable,
                }),
            )
                .into_response()
        }
    }
}

async fn sitemap_xml(State(state): State<AppState>) -> Response {
    match sitemap::generate_sitemap(&state.cms, &state.config.site_url).await {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response(),
        Err(e) => {
            error!("Failed to generate sitemap: {:#}", e);
            (StatusCode::BAD_GATEWAY, "sitemap unavailable").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubscribeOutcome>,
}

async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> (StatusCode, Json<SubscribeResponse>) {
    let language = request
        .language
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_default();

    match state.newsletter.subscribe(&request.email, language).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SubscribeResponse {
                ok: true,
                message: outcome.user_message(language),
                outcome: Some(outcome),
            }),
        ),
        Err(e) => {
            let status = match &e {
                NewsletterError::InvalidEmail => StatusCode::UNPROCESSABLE_ENTITY,
                NewsletterError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => {
                    error!("Newsletter subscription failed: {}", e);
                    StatusCode::BAD_GATEWAY
                }
            };
            (
                status,
                Json(SubscribeResponse {
                    ok: false,
                    message: e.user_message(language),
                    outcome: None,
                }),
            )
        }
    }
}
