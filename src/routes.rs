use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::bail_api;
use crate::error::{ApiError, ApiResult};
use crate::model::GenerativeModel;
use crate::pipeline::take_notes;
use crate::upload::UploadedAudio;

const AUDIO_FIELD: &str = "audio";

// Room for the multipart boundaries and part headers around the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub const SUCCESS_NOTE: &str = "Transcription and summary generated successfully using Gemini API.";

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn GenerativeModel>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

pub fn create_router(state: AppState) -> Router {
    let audio_router = Router::new()
        .route("/process-audio", post(handle_process_audio))
        .layer(DefaultBodyLimit::max(
            state
                .max_upload_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));

    Router::new()
        .route("/health", get(handle_health))
        .merge(audio_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize, Debug)]
pub struct ProcessAudioResponse {
    pub transcript: String,
    pub summary: String,
    pub success: bool,
    pub note: &'static str,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[axum_macros::debug_handler]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[axum_macros::debug_handler]
#[tracing::instrument(skip_all)]
async fn handle_process_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProcessAudioResponse>> {
    let Ok(multipart) = multipart else {
        bail_api!(StatusCode::BAD_REQUEST, "No audio file provided");
    };
    let Some(audio) = receive_audio(multipart, &state).await? else {
        bail_api!(StatusCode::BAD_REQUEST, "No audio file provided");
    };

    info!(file_name = %audio.file_name, size = audio.size, "Processing audio file");

    // `audio` is dropped, and its staged file removed, on every return below
    let notes = match audio.read().await {
        Ok(bytes) => take_notes(state.model.as_ref(), &bytes, audio.mime_type)
            .await
            .map_err(anyhow::Error::from),
        Err(err) => Err(err.into()),
    };

    match notes {
        Ok(notes) => Ok(Json(ProcessAudioResponse {
            transcript: notes.transcript,
            summary: notes.summary,
            success: true,
            note: SUCCESS_NOTE,
        })),
        Err(err) => {
            error!("Processing error: {err:#}");
            bail_api!(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process audio: {}",
                err
            )
        }
    }
}

/// Stages the single `audio` file part. Other parts are skipped.
async fn receive_audio(
    mut multipart: Multipart,
    state: &AppState,
) -> ApiResult<Option<UploadedAudio>> {
    let mut audio = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        // Browsers send `filename=""` when no file was chosen
        if field.name() != Some(AUDIO_FIELD) || field.file_name().map_or(true, str::is_empty) {
            continue;
        }
        if audio.is_some() {
            bail_api!(StatusCode::BAD_REQUEST, "Unexpected field: {}", AUDIO_FIELD);
        }
        audio = Some(UploadedAudio::stage(field, &state.upload_dir, state.max_upload_bytes).await?);
    }

    Ok(audio)
}
