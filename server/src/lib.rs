use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path as UrlPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use search_core::engine::{DEFAULT_LIMIT, DEFAULT_PAGE};
use search_core::ingest::load_documents;
use search_core::{DocId, Document, IndexStats, IndexStore, MemoryStore, NewDocument, SearchEngine, SearchError, SearchHit, SledStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type SharedEngine = SearchEngine<dyn IndexStore>;

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_page() -> usize { DEFAULT_PAGE }
fn default_limit() -> usize { DEFAULT_LIMIT }

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    /// Seconds spent inside the engine.
    pub search_time: f64,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub id: DocId,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    pub admin_token: Option<String>,
}

/// JSON error body with the status derived from the core error kind.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        let status = match &e {
            SearchError::Validation(_) => StatusCode::BAD_REQUEST,
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::Storage(_) => {
                tracing::warn!(error = %e, "storage fault");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match e {
            SearchError::Validation(msg) => msg,
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

// Malformed or mistyped bodies get the same 400 JSON error as a failed validation.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Open the sled database at `db`, or an in-memory store when no path is given.
pub fn open_store(db: Option<&Path>) -> Result<Arc<dyn IndexStore>> {
    let store: Arc<dyn IndexStore> = match db {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Arc::new(SledStore::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Index the documents under `seed` when the store holds none yet. Returns how many were added.
pub fn seed_if_empty(engine: &SharedEngine, seed: &Path) -> Result<usize> {
    if engine.stats()?.documents > 0 {
        return Ok(0);
    }
    let docs = load_documents(seed)?;
    let mut added = 0usize;
    for doc in docs {
        engine.index_document(doc)?;
        added += 1;
    }
    tracing::info!(added, seed = %seed.display(), "seeded empty index");
    Ok(added)
}

pub fn build_app(engine: SharedEngine) -> Router {
    let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    build_app_with_state(AppState { engine, admin_token })
}

pub fn build_app_with_state(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/search", post(search_handler))
        .route("/api/index", post(index_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, body: Result<Json<SearchRequest>, JsonRejection>) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = body?;
    let query = req.query.unwrap_or_default();
    let res = state.engine.search(&query, req.page, req.limit)?;
    Ok(Json(SearchResponse {
        results: res.results,
        total: res.total,
        page: res.page,
        limit: res.limit,
        search_time: res.elapsed.as_secs_f64(),
    }))
}

pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap, body: Result<Json<IndexRequest>, JsonRejection>) -> Result<Json<IndexResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(req) = body?;
    let doc = NewDocument {
        title: req.title.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        url: req.url,
        category: req.category,
    };
    let id = state.engine.index_document(doc)?;
    tracing::info!(doc_id = id, "document added");
    Ok(Json(IndexResponse { message: "Document added successfully", id }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<IndexStats>, ApiError> {
    Ok(Json(state.engine.stats()?))
}

pub async fn doc_handler(State(state): State<AppState>, UrlPath(doc_id): UrlPath<DocId>) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.engine.document(doc_id)?))
}

// Writes are open unless ADMIN_TOKEN is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(required) = &state.admin_token else { return Ok(()) };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        tracing::warn!("rejected index request with invalid admin token");
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
