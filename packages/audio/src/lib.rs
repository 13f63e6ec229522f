//! `voice_clone_audio` – public façade for the speaker-reference pipeline
//!
//! After `use voice_clone_audio::*` you get:
//!   * WAV export with peak normalisation  → `encode()` / `encode_wav()`
//!   * Direct decoding (hound, Symphonia)  → `decode()`
//!   * External container conversion  → `Transcoder`, `ToolLocation`
//!   * FFT resampling and channel down-mix  → `resample()`, `downmix()`
//!   * The full coercion pipeline  → `AudioCoercer`
//!   * Placeholder reference clip  → `synthesize_default()`
//!   * Scoped on-disk staging for the model  → `StagedReference`
//!

// sub-modules --------------------------------------------------------------

pub mod coerce;
pub mod decode;
pub mod default_speaker;
pub mod downmix;
pub mod encoder;
pub mod resample;
pub mod staging;
pub mod transcode;
pub mod voices;

// public re-exports --------------------------------------------------------

pub use coerce::{AudioCoercer, conform};
pub use decode::{DecodeError, decode};
pub use default_speaker::synthesize_default;
pub use downmix::downmix;
pub use encoder::{encode, encode_wav, peak_normalize, write_wav_file};
pub use resample::resample;
pub use staging::StagedReference;
pub use transcode::{ToolLocation, Transcoder};
pub use voices::find_default_voice;

pub use voice_clone_domain::{AudioBuffer, CANONICAL_SAMPLE_RATE, VoiceError};
