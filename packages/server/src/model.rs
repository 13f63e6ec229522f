//! Speech model backends.
//!
//! The server only needs one operation from a model: turn text plus a
//! reference clip into a waveform. [`SpeechModel`] is that seam; the
//! production backend drives the Coqui `tts` front end as a subprocess.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};
use voice_clone_audio::{ToolLocation, decode};
use voice_clone_domain::{Language, SynthesisResult, VoiceError};

/// A loaded voice-cloning model.
///
/// Calls block for the duration of inference; callers run them on a
/// blocking thread.
pub trait SpeechModel: Send + Sync {
    /// Model identifier reported by the info endpoints.
    fn name(&self) -> &str;

    /// Speak `text` in the voice of the WAV at `reference_wav`.
    fn synthesize(
        &self,
        text: &str,
        reference_wav: &Path,
        language: Language,
    ) -> Result<SynthesisResult, VoiceError>;
}

/// Coqui TTS driven through its command-line front end.
#[derive(Debug, Clone)]
pub struct CoquiCliModel {
    executable: PathBuf,
    model_name: String,
    temp_dir: Option<PathBuf>,
}

impl CoquiCliModel {
    /// Resolve the executable and make sure the model can be loaded.
    ///
    /// Runs `--list_language_idxs` once, which downloads (if needed) and
    /// instantiates the model. Any failure is a [`VoiceError::ModelLoadFailure`].
    pub fn load(
        tts: &ToolLocation,
        model_name: impl Into<String>,
        temp_dir: Option<PathBuf>,
    ) -> Result<Self, VoiceError> {
        let model_name = model_name.into();
        let executable = tts.path().map(Path::to_path_buf).ok_or_else(|| {
            VoiceError::ModelLoadFailure(format!("`{}` executable not found", tts.name()))
        })?;

        info!(model = %model_name, tts = %executable.display(), "Loading TTS model");

        let output = Command::new(&executable)
            .arg("--model_name")
            .arg(&model_name)
            .arg("--list_language_idxs")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VoiceError::ModelLoadFailure(format!("failed to run {}: {e}", executable.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::ModelLoadFailure(format!(
                "{model_name}: {} ({})",
                stderr.trim(),
                output.status
            )));
        }

        let languages = String::from_utf8_lossy(&output.stdout);
        debug!(languages = %languages.trim(), "model reported languages");
        info!(model = %model_name, "TTS model loaded successfully");

        Ok(Self {
            executable,
            model_name,
            temp_dir,
        })
    }

    fn output_file(&self) -> Result<tempfile::NamedTempFile, VoiceError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("voice-clone-out-").suffix(".wav");
        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| VoiceError::Io(format!("failed to create temp file: {e}")))
    }
}

impl SpeechModel for CoquiCliModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn synthesize(
        &self,
        text: &str,
        reference_wav: &Path,
        language: Language,
    ) -> Result<SynthesisResult, VoiceError> {
        let out = self.output_file()?;

        let output = Command::new(&self.executable)
            .arg("--model_name")
            .arg(&self.model_name)
            .arg("--text")
            .arg(text)
            .arg("--speaker_wav")
            .arg(reference_wav)
            .arg("--language_idx")
            .arg(language.code())
            .arg("--out_path")
            .arg(out.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VoiceError::Synthesis(format!("failed to run {}: {e}", self.executable.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Synthesis(stderr.trim().to_string()));
        }

        let bytes = std::fs::read(out.path())?;
        let buffer = decode(&bytes, Some("out.wav"))
            .map_err(|e| VoiceError::Synthesis(format!("model produced unreadable audio: {e}")))?;

        Ok(SynthesisResult {
            sample_rate: buffer.sample_rate(),
            channels: buffer.channels(),
            samples: buffer.into_samples(),
        })
    }
}
