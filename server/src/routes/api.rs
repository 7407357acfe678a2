use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// Liveness plus the datasets that passed validation at startup.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "datasets": state.datasets.as_slice(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::services::dataset_loader::DatasetSummary;
    use crate::state::AppState;

    fn state() -> AppState {
        AppState::new(vec![DatasetSummary {
            key: "outlets".to_string(),
            title: "Outlet catchments".to_string(),
            contours: 3,
            points: 4,
            groups: 4,
        }])
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = build_app(state(), "no-dist".into(), "no-data".into());
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn health_reports_validated_datasets() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["datasets"][0]["key"], "outlets");
        assert_eq!(body["datasets"][0]["groups"], 4);
        assert!(body["started_at"].as_str().is_some());
    }
}
