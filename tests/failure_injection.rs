//! Failure injection tests for the gateway.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use genedit::backend::credentials::MISSING_KEY_MESSAGE;
use genedit::http::response::INVALID_KEY_MESSAGE;

mod common;

use common::{fast_policy, refused_addr, spawn_app, start_mock_backend, start_programmable_backend, test_config, EDIT_OK};

#[tokio::test]
async fn test_retry_on_transient_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = start_programmable_backend(move |_| {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, r#"{"detail":"overloaded"}"#.into())
            } else {
                (200, EDIT_OK.into())
            }
        }
    })
    .await;

    let app = spawn_app(test_config(backend.addr)).await;
    let res = app
        .post("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png", "prompt": "make it blue" }))
        .await;

    assert_eq!(res.status(), 200, "Should eventually succeed after retries");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["imageUrl"], "https://cdn.test/edited.png");
    assert_eq!(body["description"], "Edited");

    let requests = backend.model_requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].path, "/fal-ai/nano-banana/edit");
    assert_eq!(requests[0].header("authorization"), Some("Key test-key-1234567890"));
    assert_eq!(requests[0].json()["image_urls"], json!(["https://img.test/a.png"]));
    assert_eq!(requests[0].json()["num_images"], 1);
}

#[tokio::test]
async fn test_rejected_key_is_not_retried() {
    let backend = start_mock_backend(401, r#"{"detail":"bad key"}"#).await;
    let app = spawn_app(test_config(backend.addr)).await;

    let res = app
        .post("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" }))
        .await;

    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["needsSetup"], true);
    assert_eq!(body["error"], INVALID_KEY_MESSAGE);
    assert_eq!(backend.model_requests().len(), 1);
}

#[tokio::test]
async fn test_missing_key_never_reaches_backend() {
    let backend = start_mock_backend(200, EDIT_OK).await;
    let mut config = test_config(backend.addr);
    config.backend.api_key = None;
    let app = spawn_app(config).await;

    for (path, body) in [
        ("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" })),
        ("/api/generate-video", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" })),
        ("/api/time-travel", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" })),
    ] {
        let res = app.post(path, body).await;
        assert_eq!(res.status(), 401, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], MISSING_KEY_MESSAGE);
        assert_eq!(body["needsSetup"], true);
    }

    assert!(backend.model_requests().is_empty());
}

#[tokio::test]
async fn test_attempt_deadline_maps_to_408() {
    let backend = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, EDIT_OK.to_string())
    })
    .await;

    let mut config = test_config(backend.addr);
    config.policies.image_edit = fast_policy(1, 100);
    let app = spawn_app(config).await;

    let res = app
        .post("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" }))
        .await;

    assert_eq!(res.status(), 408);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["isTimeoutError"], true);
    assert!(body["error"].as_str().unwrap().starts_with("Image processing timed out"));
    assert_eq!(backend.model_requests().len(), 2, "Timeouts are retried");
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_503() {
    let mut config = test_config(refused_addr());
    config.policies.video = fast_policy(1, 2_000);
    let app = spawn_app(config).await;

    let res = app
        .post("/api/generate-video", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" }))
        .await;

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["isNetworkError"], true);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Connection to fal.ai failed during video generation"));
}

#[tokio::test]
async fn test_empty_result_is_reported_verbatim() {
    let backend = start_mock_backend(200, r#"{"images":[]}"#).await;
    let app = spawn_app(test_config(backend.addr)).await;

    let res = app
        .post("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" }))
        .await;

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No images generated" }));
    assert_eq!(backend.model_requests().len(), 1);

    let backend = start_mock_backend(200, "{}").await;
    let app = spawn_app(test_config(backend.addr)).await;
    let res = app
        .post("/api/generate-video", json!({ "imageUrl": "https://img.test/a.png", "prompt": "p" }))
        .await;
    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No video generated");
}

#[tokio::test]
async fn test_validation_happens_before_backend() {
    let backend = start_mock_backend(200, EDIT_OK).await;
    let app = spawn_app(test_config(backend.addr)).await;

    let res = app.post("/api/edit-image", json!({ "imageUrl": "https://img.test/a.png" })).await;
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "At least one image URL and prompt are required");

    let res = app.post("/api/generate-video", json!({ "prompt": "p" })).await;
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Image URL and prompt are required");

    let res = app.post("/api/generate-prompts", json!({ "userPrompt": "p" })).await;
    assert_eq!(res.status(), 400);

    let res = app
        .post("/api/generate-prompts", json!({ "userPrompt": "p", "numStages": 11 }))
        .await;
    assert_eq!(res.status(), 400);

    assert!(backend.model_requests().is_empty());
}

#[tokio::test]
async fn test_partial_stage_failure_fails_request() {
    let chat = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": json!({
                    "stages": [
                        { "stage": "Early", "prompt": "p1", "stageNumber": 1 },
                        { "stage": "Middle", "prompt": "p2", "stageNumber": 2 },
                        { "stage": "Late", "prompt": "p3", "stageNumber": 3 }
                    ]
                }).to_string()
            }
        }]
    })
    .to_string();

    let backend = start_programmable_backend(move |req| {
        let chat = chat.clone();
        async move {
            if req.path == "/v1/chat/completions" {
                (200, chat)
            } else if req.json()["prompt"] == "p2" {
                (500, r#"{"detail":"boom"}"#.to_string())
            } else {
                (200, EDIT_OK.to_string())
            }
        }
    })
    .await;

    let app = spawn_app(test_config(backend.addr)).await;
    let res = app
        .post(
            "/api/time-travel",
            json!({ "imageUrl": "https://img.test/a.png", "prompt": "age", "numStages": 3 }),
        )
        .await;

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Some stages failed to generate"), "{error}");
    assert!(error.contains("Stage 2:"), "{error}");
    assert!(!error.contains("Stage 1:"), "{error}");
}
