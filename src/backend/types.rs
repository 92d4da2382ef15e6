//! Wire types for the generative backend and the completion model.

use serde::{Deserialize, Serialize};

/// Negative prompt sent with every video request.
pub const VIDEO_NEGATIVE_PROMPT: &str = "blur, distort, and low quality";

/// Prefix applied to photoshop-mode prompts.
pub const MASKED_EDIT_PREFIX: &str = "Edit only the masked areas: ";

/// How the caller composed an edit request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Multi,
    Photoshop,
    Timetravel,
    /// Also absorbs unknown modes.
    #[default]
    #[serde(other)]
    Single,
}

impl EditMode {
    /// Description used when the backend supplies none.
    pub fn default_description(&self) -> &'static str {
        match self {
            EditMode::Multi => "Images merged successfully",
            EditMode::Timetravel => "Time progression stage generated",
            EditMode::Single | EditMode::Photoshop => "Image edited successfully",
        }
    }
}

/// Image-edit model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditImageInput {
    pub prompt: String,
    pub image_urls: Vec<String>,
    pub num_images: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Image-edit model output. Fields are optional so that an empty answer
/// decodes and is rejected by the caller, not the parser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditImageOutput {
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Video model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInput {
    pub prompt: String,
    pub image_url: String,
    pub duration: String,
    pub cfg_scale: f32,
    pub negative_prompt: String,
}

impl VideoInput {
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: image_url.into(),
            duration: "5".to_string(),
            cfg_scale: 0.5,
            negative_prompt: VIDEO_NEGATIVE_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoOutput {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

/// Edit request after validation, as handed to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub image_urls: Vec<String>,
    pub prompt: String,
    pub mode: EditMode,
    pub mask_url: Option<String>,
}

/// Successful edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedImage {
    pub image_url: String,
    pub description: String,
}

/// Successful video generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    pub video_url: String,
    /// Seconds, one decimal.
    pub generation_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}
