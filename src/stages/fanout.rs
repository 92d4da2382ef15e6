//! Concurrent execution of stage edits.
//!
//! Every stage runs its own executor call against the same source image.
//! Completions are consumed as they arrive and reassembled by stage number.

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

use crate::backend::service::GenerationService;
use crate::backend::types::{EditMode, EditRequest, EditedImage};
use crate::resilience::{CallError, CallResult};
use crate::stages::types::{StageError, StageImage, StagePrompt, StageResult};

/// Run every stage through `edit`, concurrently.
///
/// All stages are awaited even after one fails; the error then names every
/// failed stage.
pub async fn run_stages<F, Fut>(stages: Vec<StagePrompt>, edit: F) -> StageResult<Vec<StageImage>>
where
    F: Fn(StagePrompt) -> Fut,
    Fut: Future<Output = CallResult<EditedImage>>,
{
    let mut pending: FuturesUnordered<_> = stages
        .into_iter()
        .map(|stage| {
            let call = edit(stage.clone());
            async move { (stage, call.await) }
        })
        .collect();

    let mut completed = Vec::with_capacity(pending.len());
    let mut failures: Vec<(u32, CallError)> = Vec::new();

    while let Some((stage, result)) = pending.next().await {
        match result {
            Ok(image) => {
                tracing::debug!(stage = stage.stage_number, "Stage completed");
                completed.push(StageImage {
                    stage: stage.stage,
                    stage_number: stage.stage_number,
                    prompt: stage.prompt,
                    image_url: image.image_url,
                });
            }
            Err(e) => {
                tracing::warn!(stage = stage.stage_number, error = %e, "Stage failed");
                failures.push((stage.stage_number, e));
            }
        }
    }

    if !failures.is_empty() {
        return Err(StageError::Partial(failures));
    }

    completed.sort_by_key(|image| image.stage_number);
    Ok(completed)
}

/// Edit `image_url` once per stage with the image-edit policy.
pub async fn generate_stage_images(
    service: &GenerationService,
    image_url: &str,
    stages: Vec<StagePrompt>,
) -> StageResult<Vec<StageImage>> {
    run_stages(stages, |stage| {
        let service = service.clone();
        let request = EditRequest {
            image_urls: vec![image_url.to_string()],
            prompt: stage.prompt,
            mode: EditMode::Timetravel,
            mask_url: None,
        };
        async move { service.edit_image(request).await }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stage(n: u32) -> StagePrompt {
        StagePrompt {
            stage: format!("S{n}"),
            prompt: format!("prompt {n}"),
            stage_number: n,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reassembles_by_stage_number() {
        // Later stages finish first.
        let images = run_stages(vec![stage(1), stage(2), stage(3)], |s| async move {
            tokio::time::sleep(Duration::from_secs(10 - u64::from(s.stage_number))).await;
            Ok(EditedImage {
                image_url: format!("https://img/{}", s.stage_number),
                description: String::new(),
            })
        })
        .await
        .unwrap();

        let numbers: Vec<_> = images.iter().map(|i| i.stage_number).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert_eq!(images[0].image_url, "https://img/1");
        assert_eq!(images[2].prompt, "prompt 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stages_run_concurrently() {
        let started = tokio::time::Instant::now();
        run_stages(vec![stage(1), stage(2), stage(3)], |s| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(EditedImage {
                image_url: s.prompt,
                description: String::new(),
            })
        })
        .await
        .unwrap();
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_failures_are_collected() {
        let err = run_stages(vec![stage(1), stage(2), stage(3)], |s| async move {
            if s.stage_number == 2 {
                Err(CallError::other("Backend returned 500"))
            } else {
                Ok(EditedImage {
                    image_url: s.prompt,
                    description: String::new(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Some stages failed to generate: Stage 2: Backend returned 500"
        );
    }
}
