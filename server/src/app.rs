use std::path::{Path, PathBuf};

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::config::{DATA_CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL};
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, dist_dir: PathBuf, data_dir: PathBuf) -> Router {
    let static_assets = Router::new()
        .nest_service("/data", ServeDir::new(data_dir))
        .fallback_service(
            ServeDir::new(dist_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new().route("/api/health", axum::routing::get(routes::api::health));

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

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some(IMMUTABLE_CACHE_CONTROL);
    }

    if path.starts_with("/data/") && path.ends_with(".json") {
        return Some(DATA_CACHE_CONTROL);
    }

    None
}

/// Trunk emits `name-<hash>.ext`; those never change under the same URL.
fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/catchment-client-71578f6b278221f3_bg.wasm"),
            Some(IMMUTABLE_CACHE_CONTROL)
        );
        assert_eq!(
            cache_control_for_path("/index-a93762ff3bf6d63a.css"),
            Some(IMMUTABLE_CACHE_CONTROL)
        );
    }

    #[test]
    fn hour_cache_for_datasets() {
        assert_eq!(
            cache_control_for_path("/data/outlets.points.geo.json"),
            Some(DATA_CACHE_CONTROL)
        );
        assert_eq!(cache_control_for_path("/data/readme.txt"), None);
    }

    #[test]
    fn no_cache_header_override_for_html() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
        assert_eq!(cache_control_for_path("/catchment-client.js"), None);
    }

    #[tokio::test]
    async fn serves_bundled_datasets_with_cache_header() {
        let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data");
        let app = build_app(
            AppState::new(Vec::new()),
            PathBuf::from("no-dist"),
            data_dir,
        );

        let response = app
            .oneshot(
                Request::get("/data/outlets.contours.geo.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(DATA_CACHE_CONTROL.as_bytes())
        );
    }
}
