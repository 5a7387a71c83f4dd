//! HTTP API server implementation

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backends::default_provider;
use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::TranslationRequest;
use crate::core::translator::Translator;
use crate::server::pages::render_index;

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Translator,
    languages: Arc<BTreeMap<String, String>>,
}

impl AppState {
    /// Create application state
    pub fn new(translator: Translator, languages: BTreeMap<String, String>) -> Self {
        Self {
            translator,
            languages: Arc::new(languages),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Models list response
#[derive(Serialize)]
struct ModelsResponse {
    object: String,
    data: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    id: String,
    pair: String,
    source: String,
    target: String,
}

/// Translation request body; every field may be missing or null
#[derive(Debug, Deserialize)]
pub struct TranslatePayload {
    /// Source language code
    pub src_lang: Option<String>,
    /// Target language code
    pub tgt_lang: Option<String>,
    /// Text to translate
    pub text: Option<String>,
}

impl From<TranslatePayload> for TranslationRequest {
    fn from(payload: TranslatePayload) -> Self {
        TranslationRequest::new(
            payload.src_lang.unwrap_or_default(),
            payload.tgt_lang.unwrap_or_default(),
            payload.text.unwrap_or_default(),
        )
    }
}

/// Translation response
#[derive(Serialize)]
pub struct TranslateResponse {
    /// Translated text
    pub translated_text: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Error returned by handlers, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            debug!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            warn!("Translation failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

/// Index page listing supported languages
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.languages))
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Loaded models handler
async fn get_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let data = state
        .translator
        .loaded_models()
        .await
        .into_iter()
        .map(|m| ModelInfo {
            id: m.id,
            pair: m.pair.to_string(),
            source: m.pair.source,
            target: m.pair.target,
        })
        .collect();

    Json(ModelsResponse {
        object: "list".to_string(),
        data,
    })
}

/// Translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslatePayload>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| TranslationError::InvalidRequest {
        message: rejection.body_text(),
    })?;

    let request = TranslationRequest::from(payload);
    let result = state.translator.translate(&request).await?;

    Ok(Json(TranslateResponse {
        translated_text: result.translation,
    }))
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/models", get(get_models))
        .route("/translate", post(translate))
        .with_state(Arc::new(state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Run the HTTP server
pub async fn run_server(config: &TranslatorConfig) -> anyhow::Result<()> {
    // Create translator
    let provider = default_provider(config)?;
    let translator = Translator::from_config(config, provider);

    // Create app state
    let state = AppState::new(translator, config.languages.clone());
    let app = router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Starting server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeProvider;
    use assert_json_diff::assert_json_eq;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(provider: Arc<FakeProvider>) -> Router {
        let config = TranslatorConfig::default();
        let translator = Translator::from_config(&config, provider);
        router(AppState::new(translator, config.languages.clone()))
    }

    async fn post_translate(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/translate")
                    .method("POST")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_ok() {
        let provider = Arc::new(FakeProvider::new());
        let (status, body) = post_translate(
            test_app(provider.clone()),
            r#"{"src_lang": "en", "tgt_lang": "fr", "text": "Good morning. See you later!"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json_eq!(body, json!({"translated_text": "GOOD MORNING. SEE YOU LATER!"}));
        assert_eq!(provider.load_count(), 1);
    }

    #[tokio::test]
    async fn test_same_language_returns_input() {
        let provider = Arc::new(FakeProvider::new());
        let (status, body) = post_translate(
            test_app(provider.clone()),
            r#"{"src_lang": "en", "tgt_lang": "en", "text": "Hello."}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json_eq!(body, json!({"translated_text": "Hello."}));
        assert_eq!(provider.load_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_bad_request() {
        for text in ["\"\"", "\"   \"", "null"] {
            let provider = Arc::new(FakeProvider::new());
            let body = format!(r#"{{"src_lang": "en", "tgt_lang": "fr", "text": {text}}}"#);
            let (status, body) = post_translate(test_app(provider), &body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_json_eq!(body, json!({"error": "No text provided"}));
        }
    }

    #[tokio::test]
    async fn test_missing_language_is_bad_request() {
        let provider = Arc::new(FakeProvider::new());
        let (status, body) =
            post_translate(test_app(provider), r#"{"tgt_lang": "fr", "text": "Hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_json_eq!(body, json!({"error": "Source or target language not provided"}));
    }

    #[tokio::test]
    async fn test_model_load_failure_is_server_error() {
        let provider = Arc::new(FakeProvider::new().failing_for("Helsinki-NLP/opus-mt-en-xx"));
        let app = test_app(provider.clone());

        let (status, body) = post_translate(
            app.clone(),
            r#"{"src_lang": "en", "tgt_lang": "xx", "text": "Hi."}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("repository not found"));

        // nothing cached, so the provider is asked again
        let (status, _) = post_translate(
            app,
            r#"{"src_lang": "en", "tgt_lang": "xx", "text": "Hi."}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(provider.load_count(), 2);
    }

    #[tokio::test]
    async fn test_chunk_failure_is_server_error() {
        let provider = Arc::new(FakeProvider::new().with_fail_marker("Boom"));
        let (status, body) = post_translate(
            test_app(provider),
            r#"{"src_lang": "en", "tgt_lang": "fr", "text": "Fine. Boom."}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("generation blew up"));
        assert!(body.get("translated_text").is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let provider = Arc::new(FakeProvider::new());
        let (status, body) = post_translate(test_app(provider), "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_models_lists_loaded_pairs() {
        let provider = Arc::new(FakeProvider::new());
        let app = test_app(provider);

        post_translate(
            app.clone(),
            r#"{"src_lang": "fr", "tgt_lang": "en", "text": "Bonjour."}"#,
        )
        .await;

        let response = app
            .oneshot(Request::builder().uri("/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_json_eq!(
            body,
            json!({
                "object": "list",
                "data": [{
                    "id": "Helsinki-NLP/opus-mt-fr-en",
                    "pair": "fr-en",
                    "source": "fr",
                    "target": "en"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_index_page_lists_languages() {
        let app = test_app(Arc::new(FakeProvider::new()));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("English"));
        assert!(page.contains("French"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Arc::new(FakeProvider::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "marian-translate");
    }
}
