//! Generation service: backend calls wrapped in their retry policies.

use tokio::time::Instant;

use crate::backend::client::GenerativeClient;
use crate::backend::credentials::Credentials;
use crate::backend::types::{
    EditImageInput, EditMode, EditRequest, EditedImage, GeneratedVideo, VideoInput,
    MASKED_EDIT_PREFIX,
};
use crate::config::schema::AppConfig;
use crate::resilience::{CallError, CallResult, RetryExecutor};

pub const NO_IMAGES_MESSAGE: &str = "No images generated";
pub const NO_VIDEO_MESSAGE: &str = "No video generated";

/// Image edit and video generation with retries.
///
/// Missing credentials do not prevent construction; every call then fails
/// with the authentication error without touching the network.
#[derive(Debug, Clone)]
pub struct GenerationService {
    client: Result<GenerativeClient, CallError>,
    image_edit: RetryExecutor,
    video: RetryExecutor,
}

impl GenerationService {
    pub fn new(config: &AppConfig) -> Self {
        let client = Credentials::from_option(config.backend.api_key.as_deref())
            .and_then(|credentials| GenerativeClient::new(&config.backend, credentials));

        if let Err(e) = &client {
            tracing::warn!(error = %e, "Generative backend is not configured");
        }

        Self {
            client,
            image_edit: RetryExecutor::new("image_edit", config.policies.image_edit.clone()),
            video: RetryExecutor::new("video", config.policies.video.clone()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_ok()
    }

    fn client(&self) -> CallResult<&GenerativeClient> {
        self.client.as_ref().map_err(Clone::clone)
    }

    /// Edit (or merge) images. Photoshop mode appends the mask and scopes
    /// the prompt to it.
    pub async fn edit_image(&self, request: EditRequest) -> CallResult<EditedImage> {
        let client = self.client()?.clone();
        let mode = request.mode;
        let input = build_edit_input(request);

        tracing::info!(
            mode = ?mode,
            images = input.image_urls.len(),
            "Starting image edit"
        );

        let output = self
            .image_edit
            .execute(move || {
                let client = client.clone();
                let input = input.clone();
                async move { client.edit_image(&input).await }
            })
            .await?;

        let image = output
            .images
            .into_iter()
            .next()
            .ok_or_else(|| CallError::malformed(NO_IMAGES_MESSAGE))?;

        let description = output
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| mode.default_description().to_string());

        Ok(EditedImage {
            image_url: image.url,
            description,
        })
    }

    /// Animate a still image.
    ///
    /// `generationTime` is measured from `started`, which callers take when
    /// the request arrives.
    pub async fn generate_video(
        &self,
        input: VideoInput,
        started: Instant,
    ) -> CallResult<GeneratedVideo> {
        let client = self.client()?.clone();

        tracing::info!(duration = %input.duration, cfg_scale = input.cfg_scale, "Starting video generation");

        let output = self
            .video
            .execute(move || {
                let client = client.clone();
                let input = input.clone();
                async move { client.generate_video(&input).await }
            })
            .await?;

        let video = output
            .video
            .ok_or_else(|| CallError::malformed(NO_VIDEO_MESSAGE))?;

        let generation_time = format!("{:.1}", started.elapsed().as_secs_f64());
        tracing::info!(generation_time = %generation_time, url = %video.url, "Video generated");

        Ok(GeneratedVideo {
            video_url: video.url,
            generation_time,
        })
    }
}

fn build_edit_input(request: EditRequest) -> EditImageInput {
    let EditRequest {
        mut image_urls,
        mut prompt,
        mode,
        mask_url,
    } = request;

    // Without a mask there are no masked areas to restrict the edit to.
    if let (EditMode::Photoshop, Some(mask)) = (mode, mask_url) {
        image_urls.truncate(1);
        image_urls.push(mask);
        if !prompt.starts_with(MASKED_EDIT_PREFIX) {
            prompt = format!("{MASKED_EDIT_PREFIX}{prompt}");
        }
    }

    EditImageInput {
        prompt,
        image_urls,
        num_images: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::ErrorKind;

    fn request(mode: EditMode, mask_url: Option<&str>) -> EditRequest {
        EditRequest {
            image_urls: vec!["data:image/png;base64,AAAA".into()],
            prompt: "add a hat".into(),
            mode,
            mask_url: mask_url.map(str::to_string),
        }
    }

    #[test]
    fn test_single_input() {
        let input = build_edit_input(request(EditMode::Single, None));
        assert_eq!(input.prompt, "add a hat");
        assert_eq!(input.image_urls.len(), 1);
        assert_eq!(input.num_images, 1);
    }

    #[test]
    fn test_photoshop_input() {
        let input = build_edit_input(request(EditMode::Photoshop, Some("data:image/png;base64,MASK")));
        assert_eq!(input.prompt, "Edit only the masked areas: add a hat");
        assert_eq!(input.image_urls[1], "data:image/png;base64,MASK");

        // Already prefixed prompts are left alone.
        let mut again = request(EditMode::Photoshop, Some("data:image/png;base64,MASK"));
        again.prompt = input.prompt.clone();
        assert_eq!(build_edit_input(again).prompt, input.prompt);
    }

    #[test]
    fn test_photoshop_without_mask_is_plain_edit() {
        let input = build_edit_input(request(EditMode::Photoshop, None));
        assert_eq!(input.prompt, "add a hat");
        assert_eq!(input.image_urls, vec!["data:image/png;base64,AAAA".to_string()]);
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails_fast() {
        let service = GenerationService::new(&AppConfig::default());
        assert!(!service.is_configured());

        let err = service
            .edit_image(request(EditMode::Single, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = service
            .generate_video(VideoInput::new("p", "https://x/a.png"), Instant::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }
}
