use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use providers::noop::NoopProvider;
use providers::qdrant::{QdrantClient, QdrantConfig};
use providers::{EmbeddingBackend, ModelRegistry};
use server::{build_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use suggest_core::config::AppConfig;
use tower::ServiceExt;

fn test_state() -> AppState {
    let config = AppConfig::default();
    let model = config.embeddings.model.clone();
    // Noop embedding provider under the default model; the store points at a
    // port nothing listens on, so any route that reaches it fails fast.
    let registry = ModelRegistry::new(EmbeddingBackend::default(), model.clone())
        .with_provider(&model, Arc::new(NoopProvider));
    let store = QdrantClient::new(QdrantConfig {
        url: "http://127.0.0.1:1".to_string(),
        api_key: None,
    });
    AppState::new(config, Arc::new(registry), store)
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_reports_service_info() {
    let app = build_router(test_state());
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["service"], "search-suggest");
    assert!(body["default_model"].is_string());
}

#[tokio::test]
async fn models_endpoint_lists_the_catalog() {
    let app = build_router(test_state());
    let resp = app
        .oneshot(Request::builder().uri("/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let models = body.as_array().unwrap();
    assert!(!models.is_empty());
    assert!(models.iter().all(|m| m["dimension"].is_u64()));
}

#[tokio::test]
async fn unknown_job_is_a_404() {
    let app = build_router(test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/jobs/no-such-job")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn populate_with_missing_taxonomy_reports_a_failed_job() {
    let state = test_state();
    let app = build_router(state.clone());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/populate")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "taxonomy_file": "/definitely/not/here.txt" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body = body_json(resp).await;
    let job_id = body["job_id"].as_str().unwrap().to_string();

    // The job fails before touching the network; give the task a moment.
    let mut state_json = serde_json::Value::Null;
    for _ in 0..50 {
        if let Some(job) = state.jobs.get(&job_id) {
            state_json = serde_json::to_value(&job).unwrap();
            if state_json["state"] != "running" {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state_json["state"], "failed");
    assert!(state_json["error"]
        .as_str()
        .unwrap()
        .contains("read taxonomy"));
}
