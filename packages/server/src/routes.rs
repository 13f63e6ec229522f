//! HTTP surface.
//!
//! | route | method | body |
//! |---|---|---|
//! | `/api/tts` | GET | readiness probe |
//! | `/api/tts` | POST | JSON, multipart or urlencoded form → `audio/wav` |
//! | `/api/tts/speaker-similarity` | POST | multipart with a required clip → `audio/wav` |
//! | `/api/tts/info` | GET | models and languages |
//! | `/health` | GET | liveness |

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use voice_clone_domain::{Language, SynthesisRequest, VoiceError};

use crate::error::ApiError;
use crate::service::{AppState, ReferenceSource};

/// Build the application router.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/tts", get(ready).post(text_to_speech))
        .route("/api/tts/speaker-similarity", post(speaker_similarity))
        .route("/api/tts/info", get(server_info))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    model: String,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct InfoResponse {
    models: Vec<String>,
    languages: Vec<&'static str>,
    speakers: Vec<String>,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

/// JSON body of `POST /api/tts`.
#[derive(Debug, Default, Deserialize)]
struct TtsJson {
    #[serde(default)]
    text: String,
    speaker_wav: Option<PathBuf>,
    language: Option<String>,
}

/// URL-encoded body of `POST /api/tts`. Carries no clip.
#[derive(Debug, Default, Deserialize)]
struct TtsForm {
    #[serde(default)]
    text: String,
    language: Option<String>,
}

/// Fields collected from a multipart body.
#[derive(Debug, Default)]
struct TtsMultipart {
    text: String,
    language: Option<String>,
    speaker_wav: Option<ReferenceSource>,
}

async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        model: short_model_name(state.model_name()).to_string(),
        message: "Voice clone TTS server is running",
    })
}

async fn server_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        models: vec![state.model_name().to_string()],
        languages: Language::codes(),
        speakers: Vec::new(),
        status: "ready",
    })
}

async fn health() -> Json<HealthResponse> {
    // The state cannot exist without a loaded model.
    Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
    })
}

async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let (text, language, reference) = match content_type(&request).as_deref() {
        Some("application/json") => {
            let Json(body) = Json::<TtsJson>::from_request(request, &())
                .await
                .map_err(|r| rejected(r.status(), r.body_text()))?;
            let reference = body
                .speaker_wav
                .filter(|p| !p.as_os_str().is_empty())
                .map(ReferenceSource::ServerPath);
            (body.text, body.language, reference)
        }
        Some("multipart/form-data") => {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(multipart_rejection)?;
            let form = read_multipart(multipart).await?;
            (form.text, form.language, form.speaker_wav)
        }
        Some("application/x-www-form-urlencoded") => {
            let Form(body) = Form::<TtsForm>::from_request(request, &())
                .await
                .map_err(|r| rejected(r.status(), r.body_text()))?;
            (body.text, body.language, None)
        }
        other => {
            return Err(VoiceError::InvalidRequest(format!(
                "unsupported content type: {}",
                other.unwrap_or("none")
            ))
            .into());
        }
    };

    let (text, language) = validate(text, language)?;
    let wav = state.speak(text, language, reference).await?;
    Ok(wav_response(wav, "speech.wav"))
}

async fn speaker_similarity(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let form = read_multipart(multipart.map_err(multipart_rejection)?).await?;
    let (text, language) = validate(form.text, form.language)?;
    let wav = state
        .clone_voice(text, language, form.speaker_wav)
        .await?;
    Ok(wav_response(wav, "cloned_speech.wav"))
}

async fn read_multipart(mut multipart: Multipart) -> Result<TtsMultipart, ApiError> {
    let mut form = TtsMultipart::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => {
                form.text = field
                    .text()
                    .await
                    .map_err(|e| rejected(e.status(), format!("text read error: {}", e.body_text())))?;
            }
            "language" => {
                form.language = Some(field.text().await.map_err(|e| {
                    rejected(e.status(), format!("language read error: {}", e.body_text()))
                })?);
            }
            "speaker_wav" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    rejected(e.status(), format!("speaker_wav read error: {}", e.body_text()))
                })?;
                if filename.is_empty() || bytes.is_empty() {
                    debug!("ignoring empty speaker_wav part");
                    continue;
                }
                form.speaker_wav = Some(ReferenceSource::Upload {
                    bytes: bytes.to_vec(),
                    filename,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_rejection(rejection: MultipartRejection) -> ApiError {
    rejected(rejection.status(), rejection.body_text())
}

/// Extractor failures are client errors; an oversized body keeps its 413.
fn rejected(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, message)
    } else {
        VoiceError::InvalidRequest(message).into()
    }
}

/// Text is checked before the language code.
fn validate(text: String, language: Option<String>) -> Result<(String, Language), ApiError> {
    let (text, _, _) = SynthesisRequest::new(text, Language::default(), None)?.into_parts();
    Ok((text, parse_language(language)?))
}

/// Absent or blank means English.
fn parse_language(language: Option<String>) -> Result<Language, ApiError> {
    match language {
        Some(code) if !code.trim().is_empty() => Ok(code.parse()?),
        _ => Ok(Language::default()),
    }
}

/// MIME essence of the request's `Content-Type`, lowercased.
fn content_type(request: &Request) -> Option<String> {
    let value = request.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next()?.trim().to_ascii_lowercase();
    Some(essence)
}

/// `tts_models/multilingual/multi-dataset/xtts_v2` → `xtts_v2`.
fn short_model_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn wav_response(wav: Vec<u8>, filename: &'static str) -> Response {
    let disposition = format!("inline; filename=\"{filename}\"");
    let mut response = wav.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
