//! Unified error for every stage of a synthesis request.
use thiserror::Error;

/// Failure taxonomy shared by the audio pipeline and the HTTP layer.
///
/// Input-validation variants map to `400`; everything else is reported as a
/// `500` by the server. `ModelLoadFailure` only ever surfaces at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// The request carried no text to speak.
    #[error("Text is required")]
    MissingText,
    /// The endpoint requires a reference clip and none was uploaded.
    #[error("Speaker audio file is required")]
    MissingSpeakerFile,
    /// Language code outside the supported set.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// Malformed JSON or multipart body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The clip cannot be decoded and no conversion tool is available.
    #[error("Audio file format not supported: {0}")]
    UnsupportedFormat(String),
    /// The conversion tool ran but did not yield decodable audio.
    #[error("Failed to convert audio file: {0}")]
    ConversionFailed(String),
    /// Empty or non-finite waveform handed to the encoder.
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),
    /// Synthesis with the placeholder speaker failed.
    #[error(
        "TTS generation failed: {0}. For best results, please upload a voice sample for cloning."
    )]
    CloningUnavailable(String),
    /// The model call failed; message is reported verbatim.
    #[error("{0}")]
    Synthesis(String),
    /// Filesystem failure while staging audio.
    #[error("io: {0}")]
    Io(String),
    /// The model could not be loaded at startup.
    #[error("Failed to initialize TTS model: {0}")]
    ModelLoadFailure(String),
}

impl VoiceError {
    /// Whether the failure is the caller's fault (maps to `400`).
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingText
                | Self::MissingSpeakerFile
                | Self::UnsupportedLanguage(_)
                | Self::InvalidRequest(_)
        )
    }
}

impl From<std::io::Error> for VoiceError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        assert!(VoiceError::MissingText.is_client_error());
        assert!(VoiceError::MissingSpeakerFile.is_client_error());
        assert!(VoiceError::UnsupportedLanguage("xx".into()).is_client_error());
        assert!(!VoiceError::ConversionFailed("boom".into()).is_client_error());
        assert!(!VoiceError::Synthesis("boom".into()).is_client_error());
    }

    #[test]
    fn cloning_unavailable_advises_upload() {
        let msg = VoiceError::CloningUnavailable("model exploded".into()).to_string();
        assert!(msg.starts_with("TTS generation failed: model exploded."));
        assert!(msg.contains("upload a voice sample"));
    }

    #[test]
    fn synthesis_message_is_verbatim() {
        let err = VoiceError::Synthesis("Voice cloning failed: out of memory".into());
        assert_eq!(err.to_string(), "Voice cloning failed: out of memory");
    }
}
