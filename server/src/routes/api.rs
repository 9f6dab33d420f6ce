use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::ATLAS_CACHE_CONTROL;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let atlas = &state.atlas;
    Json(serde_json::json!({
        "status": "ok",
        "regions": atlas.region_count,
        "labelled_regions": atlas.labelled_regions,
        "skipped_features": atlas.skipped_features,
        "loaded_at": atlas.loaded_at.to_rfc3339(),
    }))
}

/// Serve the pre-serialized region array; revalidates against its ETag.
pub async fn get_regions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let etag = state.atlas.etag.as_str();
    if if_none_match_matches(&headers, etag) {
        return not_modified_response(ATLAS_CACHE_CONTROL, Some(etag));
    }
    json_bytes_response(
        state.atlas.regions_json.clone(),
        ATLAS_CACHE_CONTROL,
        Some(etag),
    )
}

pub async fn get_endonyms(State(state): State<AppState>) -> impl IntoResponse {
    json_bytes_response(state.atlas.endonyms_json.clone(), ATLAS_CACHE_CONTROL, None)
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
