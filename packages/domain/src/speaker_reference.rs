//! Reference clip whose voice the model imitates.
use std::path::PathBuf;

use serde::Serialize;

use crate::audio_buffer::AudioBuffer;

/// Where a reference clip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceOrigin {
    /// Supplied by the caller with the request.
    Uploaded,
    /// First `.wav` found in the configured voices directory.
    ExistingFile,
    /// Placeholder tone fabricated because nothing else was available.
    SynthesizedDefault,
}

/// The clip itself: decoded samples, or a WAV already on disk that is handed
/// to the model untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceClip {
    Decoded(AudioBuffer),
    OnDisk(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerReference {
    origin: ReferenceOrigin,
    clip: ReferenceClip,
}

impl SpeakerReference {
    pub fn uploaded(buffer: AudioBuffer) -> Self {
        Self {
            origin: ReferenceOrigin::Uploaded,
            clip: ReferenceClip::Decoded(buffer),
        }
    }

    pub fn existing_file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: ReferenceOrigin::ExistingFile,
            clip: ReferenceClip::OnDisk(path.into()),
        }
    }

    pub fn synthesized_default(buffer: AudioBuffer) -> Self {
        Self {
            origin: ReferenceOrigin::SynthesizedDefault,
            clip: ReferenceClip::Decoded(buffer),
        }
    }

    pub fn origin(&self) -> ReferenceOrigin {
        self.origin
    }

    pub fn into_clip(self) -> ReferenceClip {
        self.clip
    }
}
