use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parking_lot::{Mutex, RwLock};
use search_core::{
    remove_duplicates, Document, DocumentId, DocumentStatus, Error, ExecutionPolicy, NoResultWindow,
    SearchServer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

const ADMIN_TOKEN_HEADER: &str = "X-ADMIN-TOKEN";

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct PolicyParams {
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<Document>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub doc_id: DocumentId,
    pub words: Vec<String>,
    pub status: DocumentStatus,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub document_count: usize,
    pub no_result_requests: usize,
}

#[derive(Serialize)]
pub struct DedupeResponse {
    pub removed: Vec<DocumentId>,
}

/// Body of `POST /documents`; also the line format of seed files.
#[derive(Debug, Deserialize)]
pub struct NewDocument {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<SearchServer>>,
    pub no_result: Arc<Mutex<NoResultWindow>>,
    pub admin_token: Option<String>,
}

/// Build the router, reading `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` from the
/// environment.
pub fn build_app(server: SearchServer) -> Router {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    build_app_with_token(server, admin_token)
}

pub fn build_app_with_token(server: SearchServer, admin_token: Option<String>) -> Router {
    let app_state = AppState {
        engine: Arc::new(RwLock::new(server)),
        no_result: Arc::new(Mutex::new(NoResultWindow::default())),
        admin_token,
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match/:doc_id", get(match_handler))
        .route("/stats", get(stats_handler))
        .route("/documents", post(add_handler))
        .route("/documents/:doc_id", axum::routing::delete(remove_handler))
        .route("/documents/:doc_id/frequencies", get(frequencies_handler))
        .route("/dedupe", post(dedupe_handler))
        .with_state(app_state)
        .layer(cors_layer(allowed_origins()))
        .layer(TraceLayer::new_for_http())
}

/// Origins listed in `CORS_ALLOW_ORIGIN` (comma-separated); any origin when
/// the variable is unset or holds no valid origin.
fn allowed_origins() -> AllowOrigin {
    let origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    }
}

fn cors_layer(origin: AllowOrigin) -> CorsLayer {
    CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any)
}

/// Add every JSONL line of `path` to `server`; rejected documents are logged
/// and skipped.
pub fn load_seed(path: &std::path::Path, server: &mut SearchServer) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut added = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: NewDocument = serde_json::from_str(&line)?;
        match server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            Ok(()) => added += 1,
            Err(e) => tracing::warn!(document_id = doc.id, error = %e, "skipping seed document"),
        }
    }
    Ok(added)
}

fn api_error(err: Error) -> ApiError {
    match err {
        Error::InvalidArgument(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
    }
}

/// Run engine work on tokio's blocking pool; the parallel policy fans out
/// over rayon and must not hold a reactor thread.
async fn on_blocking_pool<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let policy = ExecutionPolicy::from_parallel(params.parallel);
    let engine = Arc::clone(&state.engine);
    let (query, status) = (params.q.clone(), params.status);
    let results = on_blocking_pool(move || {
        engine.read().find_top_documents_with(policy, &query, status)
    })
    .await?
    .map_err(api_error)?;
    state.no_result.lock().record(results.is_empty());
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), results }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocumentId>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let policy = ExecutionPolicy::from_parallel(params.parallel);
    let engine = Arc::clone(&state.engine);
    let (words, status) = on_blocking_pool(move || {
        let engine = engine.read();
        let (words, status) = engine.match_document_with(policy, &params.q, doc_id)?;
        let words: Vec<String> = words.into_iter().map(str::to_string).collect();
        Ok::<_, Error>((words, status))
    })
    .await?
    .map_err(api_error)?;
    Ok(Json(MatchResponse { doc_id, words, status }))
}

pub async fn frequencies_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocumentId>,
) -> Json<BTreeMap<String, f64>> {
    let frequencies = state.engine.read().word_frequencies(doc_id);
    Json(frequencies.into_iter().map(|(term, tf)| (term.to_string(), tf)).collect())
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let document_count = state.engine.read().document_count();
    let no_result_requests = state.no_result.lock().no_result_requests();
    Json(StatsResponse { document_count, no_result_requests })
}

// --- Admin endpoints ---
async fn add_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<NewDocument>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state
        .engine
        .write()
        .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
        .map_err(api_error)?;
    Ok(StatusCode::CREATED)
}

async fn remove_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocumentId>,
    Query(params): Query<PolicyParams>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    let policy = ExecutionPolicy::from_parallel(params.parallel);
    let engine = Arc::clone(&state.engine);
    on_blocking_pool(move || engine.write().remove_document_with(policy, doc_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dedupe_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DedupeResponse>, ApiError> {
    authorize(&state, &headers)?;
    let removed = remove_duplicates(&mut state.engine.write());
    Ok(Json(DedupeResponse { removed }))
}

/// Admin routes are closed unless `ADMIN_TOKEN` is configured and the
/// request carries it in `X-ADMIN-TOKEN`.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err((StatusCode::UNAUTHORIZED, "admin routes are disabled".into()));
    };
    match headers.get(ADMIN_TOKEN_HEADER).map(HeaderValue::to_str) {
        Some(Ok(token)) if token == expected => Ok(()),
        Some(_) => Err((StatusCode::UNAUTHORIZED, "invalid admin token".into())),
        None => Err((StatusCode::UNAUTHORIZED, format!("missing {ADMIN_TOKEN_HEADER} header"))),
    }
}
