//! Request orchestration: pick a reference clip, run the model, encode WAV.
//!
//! Everything that touches audio samples or the model runs on the blocking
//! pool. The concurrency permit travels with the blocking job, so a dropped
//! request never frees a slot while its model call is still running.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info, warn};
use voice_clone_audio::{
    AudioCoercer, StagedReference, conform, encode, find_default_voice, synthesize_default,
};
use voice_clone_domain::{Language, SpeakerReference, SynthesisRequest, VoiceError};

use crate::model::SpeechModel;

/// Reference audio supplied by a caller, before coercion.
#[derive(Debug, Clone)]
pub enum ReferenceSource {
    /// Uploaded bytes with the client's file name (used as a format hint).
    Upload { bytes: Vec<u8>, filename: String },
    /// A file in the voices directory. Relative paths resolve against it.
    /// Read, never deleted.
    ServerPath(PathBuf),
}

impl ReferenceSource {
    fn read(self, voices_dir: &Path) -> Result<(Vec<u8>, String), VoiceError> {
        match self {
            Self::Upload { bytes, filename } => Ok((bytes, filename)),
            Self::ServerPath(path) => {
                let path = confine(&path, voices_dir)?;
                let bytes = std::fs::read(&path).map_err(|e| {
                    VoiceError::Io(format!("cannot read speaker_wav {}: {e}", path.display()))
                })?;
                Ok((bytes, path.display().to_string()))
            }
        }
    }
}

/// Resolve `path` and require it to sit inside `voices_dir`.
fn confine(path: &Path, voices_dir: &Path) -> Result<PathBuf, VoiceError> {
    let outside = || {
        VoiceError::InvalidRequest(format!(
            "speaker_wav must name a file in the voices directory: {}",
            path.display()
        ))
    };
    let root = voices_dir.canonicalize().map_err(|_| outside())?;
    let resolved = root.join(path).canonicalize().map_err(|_| outside())?;
    if resolved.starts_with(&root) && resolved.is_file() {
        Ok(resolved)
    } else {
        Err(outside())
    }
}

/// How a model failure is reported for a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureReport {
    /// Error message passed through untouched.
    Verbatim,
    /// Prefixed with `Voice cloning failed:`.
    CloningFailed,
    /// Advises the caller to upload a reference clip.
    AdviseUpload,
}

impl FailureReport {
    fn wrap(self, err: VoiceError) -> VoiceError {
        match self {
            Self::Verbatim => err,
            Self::CloningFailed => VoiceError::Synthesis(format!("Voice cloning failed: {err}")),
            Self::AdviseUpload => VoiceError::CloningUnavailable(err.to_string()),
        }
    }
}

/// Shared state behind every route. Built once in `main`.
pub struct AppState {
    model: Arc<dyn SpeechModel>,
    coercer: AudioCoercer,
    voices_dir: PathBuf,
    temp_dir: Option<PathBuf>,
    permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        model: Arc<dyn SpeechModel>,
        coercer: AudioCoercer,
        voices_dir: impl Into<PathBuf>,
        max_concurrency: usize,
    ) -> Self {
        let temp_dir = coercer.temp_dir();
        Self {
            model,
            coercer,
            voices_dir: voices_dir.into(),
            temp_dir,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// `POST /api/tts`: clone from the supplied clip, or fall back to a
    /// cached voice, or to the synthesized placeholder.
    pub async fn speak(
        self: &Arc<Self>,
        text: String,
        language: Language,
        reference: Option<ReferenceSource>,
    ) -> Result<Vec<u8>, VoiceError> {
        let request = SynthesisRequest::new(text, language, None)?;
        info!(text = %preview(request.text()), language = %language, "Generating speech");

        let permit = self.acquire().await?;
        let state = Arc::clone(self);
        run_blocking(permit, move || {
            let (text, language, _) = request.into_parts();
            let (reference, report) = match reference {
                Some(source) => {
                    let (bytes, name) = source.read(&state.voices_dir)?;
                    let buffer = state.coercer.coerce(&bytes, &name)?;
                    (SpeakerReference::uploaded(buffer), FailureReport::CloningFailed)
                }
                None => (state.fallback_reference(), FailureReport::AdviseUpload),
            };
            let request = SynthesisRequest::new(text, language, Some(reference))?;
            state.render(request, report)
        })
        .await
    }

    /// `POST /api/tts/speaker-similarity`: the clip is mandatory.
    pub async fn clone_voice(
        self: &Arc<Self>,
        text: String,
        language: Language,
        reference: Option<ReferenceSource>,
    ) -> Result<Vec<u8>, VoiceError> {
        let request = SynthesisRequest::new(text, language, None)?;
        let source = reference.ok_or(VoiceError::MissingSpeakerFile)?;
        info!(text = %preview(request.text()), language = %language, "Voice cloning with uploaded speaker file");

        let permit = self.acquire().await?;
        let state = Arc::clone(self);
        run_blocking(permit, move || {
            let (text, language, _) = request.into_parts();
            let (bytes, name) = source.read(&state.voices_dir)?;
            let buffer = state.coercer.coerce(&bytes, &name)?;
            let request =
                SynthesisRequest::new(text, language, Some(SpeakerReference::uploaded(buffer)))?;
            state.render(request, FailureReport::Verbatim)
        })
        .await
    }

    fn fallback_reference(&self) -> SpeakerReference {
        info!("No speaker reference provided, using default voice");
        match find_default_voice(&self.voices_dir) {
            Some(path) => SpeakerReference::existing_file(path),
            None => {
                info!("Created default speaker audio");
                SpeakerReference::synthesized_default(synthesize_default())
            }
        }
    }

    /// Stage the reference, run the model and encode its output.
    fn render(&self, request: SynthesisRequest, report: FailureReport) -> Result<Vec<u8>, VoiceError> {
        let (text, language, reference) = request.into_parts();
        let reference = reference.ok_or(VoiceError::MissingSpeakerFile)?;
        let origin = reference.origin();

        let staged = StagedReference::stage(reference, self.temp_dir.as_deref())?;
        info!(?origin, path = %staged.path().display(), "Using speaker reference");

        let result = self
            .model
            .synthesize(&text, staged.path(), language)
            .map_err(|e| {
                let e = report.wrap(e);
                error!(?origin, error = %e, "model call failed");
                e
            })?;
        drop(staged);

        let buffer = result.into_buffer();
        if !buffer.is_valid() {
            return Err(VoiceError::InvalidWaveform("model returned no audio".into()));
        }
        if !buffer.is_canonical() {
            warn!(
                sample_rate = buffer.sample_rate(),
                channels = buffer.channels(),
                "model output is not mono 22050 Hz, converting"
            );
        }
        let buffer = conform(buffer)?;

        let wav = encode(buffer.into_samples())?;
        info!(?origin, bytes = wav.len(), "speech generated");
        Ok(wav)
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, VoiceError> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| VoiceError::Io(format!("synthesis queue closed: {e}")))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("model", &self.model.name())
            .field("voices_dir", &self.voices_dir)
            .field("temp_dir", &self.temp_dir)
            .field("available_permits", &self.permits.available_permits())
            .finish()
    }
}

/// Run `work` on the blocking pool, releasing `permit` only when it returns.
async fn run_blocking<T, F>(permit: OwnedSemaphorePermit, work: F) -> Result<T, VoiceError>
where
    F: FnOnce() -> Result<T, VoiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let result = work();
        drop(permit);
        result
    })
    .await
        .map_err(|e| VoiceError::Io(format!("task join error: {e}")))?
}

/// First 50 characters, for log lines.
fn preview(text: &str) -> String {
    match text.char_indices().nth(50) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
