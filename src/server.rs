use crate::{
    config::Config,
    errors::{into_response, ValidationError, ValidationResult},
    scenario::loader::ScenarioLoader,
    security::{sanitize, validator::PathValidator},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

const MAX_SEARCH_TERM_LEN: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub validator: Arc<PathValidator>,
    pub loader: Arc<ScenarioLoader>,
}

pub async fn serve(
    cfg: Config,
    validator: PathValidator,
    loader: ScenarioLoader,
) -> anyhow::Result<()> {
    let shared = AppState {
        cfg: Arc::new(cfg),
        validator: Arc::new(validator),
        loader: Arc::new(loader),
    };
    let app = build_router(shared.clone());

    let addr: std::net::SocketAddr =
        format!("{}:{}", shared.cfg.server.bind_addr, shared.cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    use tower_http::trace::TraceLayer;
    Router::new()
        .route("/healthz", get(health))
        .route("/api/browse", get(browse))
        .route("/api/scenario/preview", get(scenario_preview))
        .route("/api/scenario/load", get(scenario_load))
        .route("/api/file", get(file_contents))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status":"ok"})))
}

#[derive(Debug, Deserialize)]
struct BrowseQuery {
    path: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: String,
}

async fn browse(State(state): State<AppState>, Query(q): Query<BrowseQuery>) -> Response {
    let requested = q
        .path
        .unwrap_or_else(|| state.cfg.root.root_dir.display().to_string());
    let search = q
        .search
        .as_deref()
        .map(|s| sanitize::sanitize_search_term(s, MAX_SEARCH_TERM_LEN))
        .unwrap_or_default();
    respond("browse", &requested, || {
        list_directory(&state, &requested, &search)
    })
}

async fn scenario_preview(State(state): State<AppState>, Query(q): Query<PathQuery>) -> Response {
    respond("scenario_preview", &q.path, || {
        let dir = state.validator.validate_directory(&q.path)?;
        let preview = state.loader.preview(&dir)?;
        Ok(json!(preview))
    })
}

async fn scenario_load(State(state): State<AppState>, Query(q): Query<PathQuery>) -> Response {
    respond("scenario_load", &q.path, || {
        let dir = state.validator.validate_directory(&q.path)?;
        let document = state.loader.load(&dir)?;
        Ok(json!(document))
    })
}

async fn file_contents(State(state): State<AppState>, Query(q): Query<PathQuery>) -> Response {
    respond("file", &q.path, || {
        let file = state.validator.validate_file(&q.path, true)?;
        let data = fs::read(&file).map_err(|e| ValidationError::from_io(e, &file))?;
        let b64 = base64::engine::general_purpose::STANDARD.encode(data);
        Ok(json!({"content_b64": b64, "encoding": "base64"}))
    })
}

/// Single response-building seam: runs the operation, emits one audit line
/// per request, and maps failure kinds to transport statuses in one place
/// so the core stays free of HTTP concerns.
fn respond<F>(op: &str, requested: &str, f: F) -> Response
where
    F: FnOnce() -> ValidationResult<serde_json::Value>,
{
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();
    match f() {
        Ok(body) => {
            audit(
                &request_id,
                op,
                requested,
                "allow",
                "ok",
                started.elapsed().as_millis() as u64,
            );
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            audit(
                &request_id,
                op,
                requested,
                "deny",
                e.reason(),
                started.elapsed().as_millis() as u64,
            );
            into_response(e).into_response()
        }
    }
}

fn list_directory(
    state: &AppState,
    requested: &str,
    search: &str,
) -> ValidationResult<serde_json::Value> {
    let validated = state.validator.validate_directory(requested)?;

    let read = fs::read_dir(&validated).map_err(|e| ValidationError::from_io(e, &validated))?;
    let mut items: Vec<_> = read.flatten().collect();
    items.sort_by_key(|e| e.file_name());

    let search_lower = search.to_lowercase();
    let mut contents = Vec::new();
    for entry in items {
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !search_lower.is_empty() && !name.to_lowercase().contains(&search_lower) {
            continue;
        }
        // A probe failure on one entry downgrades it to a plain directory
        // instead of aborting the listing.
        let is_scenario = state.loader.is_valid_scenario(&entry.path());
        contents.push(json!({
            "name": name,
            "path": entry.path().display().to_string(),
            "type": if is_scenario { "scenario" } else { "directory" },
            "is_scenario": is_scenario,
        }));
    }

    // Offer a parent link only while it stays inside the allowed root.
    let parent = validated
        .parent()
        .filter(|p| state.validator.contains(p))
        .map(|p| p.display().to_string());

    let total_items = contents.len();
    Ok(json!({
        "path": validated.display().to_string(),
        "parent": parent,
        "contents": contents,
        "search_term": search,
        "total_items": total_items,
    }))
}

fn audit(request_id: &str, op: &str, path: &str, decision: &str, code: &str, duration_ms: u64) {
    tracing::info!(
        request_id = request_id,
        op = op,
        path = path,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        "audit"
    );
}
