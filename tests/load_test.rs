//! Load testing for the gateway.

use std::time::{Duration, Instant};

use serde_json::json;

mod common;

use common::{spawn_app, start_programmable_backend, test_config, EDIT_OK};

#[tokio::test]
async fn test_load_performance() {
    // 1. Mock backend with a small, fixed model latency
    let backend = start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        (200, EDIT_OK.to_string())
    })
    .await;

    // 2. Start gateway
    let app = spawn_app(test_config(backend.addr)).await;

    // 3. Run load
    let concurrency = 20;
    let requests_per_task = 10;
    let total_requests = concurrency * requests_per_task;

    let start = Instant::now();
    let mut tasks = Vec::new();
    for task in 0..concurrency {
        let client = app.client.clone();
        let url = app.url("/api/edit-image");
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for n in 0..requests_per_task {
                let body = json!({
                    "imageUrl": format!("https://img.test/{task}/{n}.png"),
                    "prompt": "sharpen"
                });
                let req_start = Instant::now();
                if let Ok(res) = client.post(&url).json(&body).send().await {
                    if res.status().is_success() {
                        latencies.push(req_start.elapsed());
                    }
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    assert_eq!(all_latencies.len(), total_requests, "Every request should succeed");
    assert_eq!(backend.model_requests().len(), total_requests, "No request should be retried");

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p95 = all_latencies[(all_latencies.len() as f64 * 0.95) as usize];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P95 Latency:    {:?}", p95);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");
}
