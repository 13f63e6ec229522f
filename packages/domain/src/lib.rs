//! # Voice Clone Domain
//!
//! Shared domain objects for the voice-clone server.
//!
//! The audio pipeline (`voice_clone_audio`) and the HTTP layer
//! (`voice_clone_server`) both speak in these types, so neither has to depend
//! on the other to agree on what a buffer, a reference clip or a failure is.

pub mod audio_buffer;
pub mod language;
pub mod speaker_reference;
pub mod synthesis;
pub mod voice_error;

// Re-export core types
pub use audio_buffer::{AudioBuffer, CANONICAL_SAMPLE_RATE};
pub use language::Language;
pub use speaker_reference::{ReferenceClip, ReferenceOrigin, SpeakerReference};
pub use synthesis::{SynthesisRequest, SynthesisResult};
pub use voice_error::VoiceError;

/// Prelude module containing commonly used types.
pub mod prelude {
    pub use crate::{
        AudioBuffer, CANONICAL_SAMPLE_RATE, Language, ReferenceClip, ReferenceOrigin,
        SpeakerReference, SynthesisRequest, SynthesisResult, VoiceError,
    };
}
