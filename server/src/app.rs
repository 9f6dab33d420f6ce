use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(state.client_dist_dir.as_path())
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/api/regions", axum::routing::get(routes::api::get_regions))
        .route(
            "/api/endonyms",
            axum::routing::get(routes::api::get_endonyms),
        )
        .route("/api/health", axum::routing::get(routes::api::health));

    app.layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

/// Only Trunk's content-hashed bundle outputs are long-lived; everything
/// else in the dist directory (`index.html`) revalidates.
fn cache_control_for_path(path: &str) -> Option<&'static str> {
    is_hashed_bundle_asset(path).then_some(IMMUTABLE_CACHE_CONTROL)
}

/// Matches `<name>-<hex hash>[_bg].{js,wasm,css}`.
fn is_hashed_bundle_asset(path: &str) -> bool {
    let path = Path::new(path);
    let is_bundle = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "wasm" | "js" | "css"));
    is_bundle
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.trim_end_matches("_bg").rsplit_once('-'))
            .is_some_and(|(_, hash)| {
                hash.len() >= 8 && hash.chars().all(|c| c.is_ascii_hexdigit())
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/endonym-map-client-71578f6b278221f3_bg.wasm"),
            Some(IMMUTABLE_CACHE_CONTROL)
        );
        assert_eq!(
            cache_control_for_path("/input-a93762ff3bf6d63a.css"),
            Some(IMMUTABLE_CACHE_CONTROL)
        );
        assert_eq!(
            cache_control_for_path("/endonym-map-client-71578f6b278221f3.js"),
            Some(IMMUTABLE_CACHE_CONTROL)
        );
    }

    #[test]
    fn other_dist_files_get_no_cache_override() {
        assert_eq!(cache_control_for_path("/data/world.geojson"), None);
        assert_eq!(cache_control_for_path("/favicon-a93762ff.ico"), None);
    }

    #[test]
    fn no_cache_header_override_for_html() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
    }

    #[test]
    fn unhashed_bundle_names_are_not_immutable() {
        assert_eq!(cache_control_for_path("/endonym-map-client.js"), None);
        assert_eq!(cache_control_for_path("/style.css"), None);
        assert_eq!(cache_control_for_path("/abcdefgh12.png"), None);
    }
}
