//! Request / result pair for one model invocation.

use crate::audio_buffer::AudioBuffer;
use crate::language::Language;
use crate::speaker_reference::SpeakerReference;
use crate::voice_error::VoiceError;

/// Validated input for one synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    text: String,
    language: Language,
    speaker_reference: Option<SpeakerReference>,
}

impl SynthesisRequest {
    /// Fails with [`VoiceError::MissingText`] when `text` is blank.
    pub fn new(
        text: impl Into<String>,
        language: Language,
        speaker_reference: Option<SpeakerReference>,
    ) -> Result<Self, VoiceError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(VoiceError::MissingText);
        }
        Ok(Self {
            text,
            language,
            speaker_reference,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn speaker_reference(&self) -> Option<&SpeakerReference> {
        self.speaker_reference.as_ref()
    }

    /// Split into parts so the reference can be consumed independently.
    pub fn into_parts(self) -> (String, Language, Option<SpeakerReference>) {
        (self.text, self.language, self.speaker_reference)
    }
}

/// Raw model output. Owned by the encoding step until serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SynthesisResult {
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    pub fn into_buffer(self) -> AudioBuffer {
        AudioBuffer::new(self.samples, self.sample_rate, self.channels)
    }
}
