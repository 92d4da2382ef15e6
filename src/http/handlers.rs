//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tokio::time::Instant;

use crate::backend::credentials::MISSING_KEY_MESSAGE;
use crate::backend::types::{EditRequest, EditedImage, GeneratedVideo, VideoInput};
use crate::drawing::{DrawingSession, ImageSource};
use crate::http::request::{
    present, EditImageBody, GeneratePromptsBody, GenerateVideoBody, MaskBody, TimeTravelBody,
};
use crate::http::response::{ApiError, EDIT_IMAGE_MESSAGES, VIDEO_MESSAGES};
use crate::http::server::AppState;
use crate::resilience::CallError;
use crate::stages::{generate_stage_images, StageError, StageImage, StagePrompt};

/// Stage count used by the time-travel route when the caller names none.
pub const DEFAULT_STAGE_COUNT: u32 = 3;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct StagesResponse<T> {
    pub stages: Vec<T>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text())))
}

pub async fn edit_image(
    State(state): State<AppState>,
    payload: Result<Json<EditImageBody>, JsonRejection>,
) -> ApiResult<EditedImage> {
    let request = body(payload)?;

    let image_urls: Vec<String> = match request.image_urls {
        Some(urls) => urls.into_iter().filter(|u| !u.trim().is_empty()).collect(),
        None => present(request.image_url).into_iter().collect(),
    };
    let prompt = present(request.prompt);

    let (Some(prompt), false) = (prompt, image_urls.is_empty()) else {
        return Err(ApiError::bad_request("At least one image URL and prompt are required"));
    };

    state
        .generation
        .edit_image(EditRequest {
            image_urls,
            prompt,
            mode: request.mode,
            mask_url: present(request.mask_url),
        })
        .await
        .map(Json)
        .map_err(|e| ApiError::from_call(&e, &EDIT_IMAGE_MESSAGES))
}

pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<GenerateVideoBody>, JsonRejection>,
) -> ApiResult<GeneratedVideo> {
    let started = Instant::now();
    let request = body(payload)?;

    let (Some(image_url), Some(prompt)) = (present(request.image_url), present(request.prompt)) else {
        return Err(ApiError::bad_request("Image URL and prompt are required"));
    };

    let mut input = VideoInput::new(prompt, image_url);
    if let Some(duration) = present(request.duration) {
        input.duration = duration;
    }
    if let Some(cfg_scale) = request.cfg_scale {
        input.cfg_scale = cfg_scale;
    }

    state
        .generation
        .generate_video(input, started)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_call(&e, &VIDEO_MESSAGES))
}

pub async fn generate_prompts(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePromptsBody>, JsonRejection>,
) -> ApiResult<StagesResponse<StagePrompt>> {
    let request = body(payload)?;

    let (Some(user_prompt), Some(num_stages)) = (present(request.user_prompt), request.num_stages)
    else {
        return Err(ApiError::bad_request(
            "Missing required parameters: userPrompt, numStages",
        ));
    };

    match state.prompts.generate(&user_prompt, num_stages).await {
        Ok(stages) => Ok(Json(StagesResponse { stages })),
        Err(StageError::InvalidCount(_)) => Err(ApiError::bad_request(format!(
            "numStages must be between 1 and 10 (got {num_stages})"
        ))),
        Err(StageError::Call(e)) if !state.prompts.is_configured() => {
            Err(ApiError::internal(e.message().to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Stage prompt generation failed");
            Err(ApiError::internal("Failed to generate prompts. Please try again."))
        }
    }
}

pub async fn time_travel(
    State(state): State<AppState>,
    payload: Result<Json<TimeTravelBody>, JsonRejection>,
) -> ApiResult<StagesResponse<StageImage>> {
    let request = body(payload)?;

    let (Some(image_url), Some(prompt)) = (present(request.image_url), present(request.prompt)) else {
        return Err(ApiError::bad_request("Image URL and prompt are required"));
    };
    let num_stages = request.num_stages.unwrap_or(DEFAULT_STAGE_COUNT);

    if !state.generation.is_configured() {
        return Err(ApiError::from_call(
            &CallError::authentication(MISSING_KEY_MESSAGE),
            &EDIT_IMAGE_MESSAGES,
        ));
    }

    let stages = state
        .prompts
        .generate_or_fallback(&prompt, num_stages)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::info!(stages = stages.len(), "Generating time progression");

    match generate_stage_images(&state.generation, &image_url, stages).await {
        Ok(stages) => Ok(Json(StagesResponse { stages })),
        Err(e) => {
            tracing::error!(error = %e, "Time progression failed");
            Err(ApiError::internal(e.to_string()))
        }
    }
}

pub async fn mask(
    State(state): State<AppState>,
    payload: Result<Json<MaskBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = body(payload)?;

    let Some(image_url) = present(request.image_url) else {
        return Err(ApiError::bad_request("Image URL is required"));
    };
    let source = match ImageSource::parse(&image_url) {
        ImageSource::Path(_) => {
            return Err(ApiError::bad_request("imageUrl must be an http(s) or data URL"));
        }
        source => source,
    };

    let drawing = &state.drawing;
    let mut session = DrawingSession::load_background(source, drawing.max_width, drawing.max_height)
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    session.set_settings(request.settings);
    let png = session
        .replay(request.events, &request.display)
        .encode_png()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

pub async fn health(State(state): State<AppState>) -> Response {
    let report = state.health.report().await;
    let status = StatusCode::from_u16(report.status.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report)).into_response()
}
