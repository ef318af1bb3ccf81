//! JSON API handlers for library browsing

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marquee_core::library::MediaFile;
use serde::Deserialize;
use serde_json::json;

use crate::server::AppState;

/// Query parameters for library listing.
#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    /// Optional case-insensitive title filter.
    pub q: Option<String>,
}

fn library_item(file: &MediaFile) -> serde_json::Value {
    json!({
        "id": file.id,
        "title": file.title,
        "size": file.size,
    })
}

/// Lists all library entries, optionally filtered by title substring.
pub async fn api_library(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> Json<serde_json::Value> {
    let files = match query.q {
        Some(ref q) if !q.trim().is_empty() => state.library.search(q).await,
        _ => state.library.all().await,
    };

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    let items: Vec<serde_json::Value> = files.iter().map(library_item).collect();

    Json(json!({
        "items": items,
        "total_size": total_size,
    }))
}

/// Returns a single library entry by id, or 404 when unknown.
pub async fn api_library_entry(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.library.find(&id).await {
        Some(file) => Json(library_item(&file)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Media resource {id} not found") })),
        )
            .into_response(),
    }
}
