//! Speaker-reference coercion: arbitrary upload → mono `f32` @ 22 050 Hz.
//!
//! Stages run in order and stop as soon as the buffer is canonical:
//!
//! 1. direct decode with the container's native reader
//! 2. on failure, external conversion ([`Transcoder`]) and a second decode
//! 3. resample to [`CANONICAL_SAMPLE_RATE`]
//! 4. down-mix to mono
//!
//! Every stage hands its buffer to the next by value; nothing is retained.

use std::path::PathBuf;

use tracing::{debug, info, warn};
use voice_clone_domain::{AudioBuffer, CANONICAL_SAMPLE_RATE, VoiceError};

use crate::decode::decode;
use crate::downmix::downmix;
use crate::resample::resample;
use crate::transcode::{ToolLocation, Transcoder};

#[derive(Debug, Clone)]
pub struct AudioCoercer {
    transcoder: Transcoder,
}

impl AudioCoercer {
    pub fn new(transcoder: Transcoder) -> Self {
        Self { transcoder }
    }

    /// Coercer that can only use the native readers.
    pub fn without_conversion() -> Self {
        Self::new(Transcoder::new(ToolLocation::unavailable("ffmpeg")))
    }

    /// Directory for scoped temporary files, if one was configured.
    pub fn temp_dir(&self) -> Option<PathBuf> {
        self.transcoder.temp_dir().map(PathBuf::from)
    }

    /// Run the full pipeline over an uploaded blob.
    pub fn coerce(&self, input: &[u8], input_name: &str) -> Result<AudioBuffer, VoiceError> {
        let decoded = self.decode_or_convert(input, input_name)?;
        info!(
            input = input_name,
            frames = decoded.frames(),
            sample_rate = decoded.sample_rate(),
            channels = decoded.channels(),
            "read speaker reference"
        );
        conform(decoded)
    }

    fn decode_or_convert(&self, input: &[u8], input_name: &str) -> Result<AudioBuffer, VoiceError> {
        match decode(input, Some(input_name)) {
            Ok(buffer) => Ok(buffer),
            Err(direct) => {
                warn!(input = input_name, error = %direct, "direct decode failed, attempting conversion");
                let converted = self.transcoder.transcode(input, input_name)?;
                decode(&converted, Some("converted.wav")).map_err(|e| {
                    VoiceError::ConversionFailed(format!("converted audio is unreadable: {e}"))
                })
            }
        }
    }
}

/// Stages 3 and 4 only: bring a decoded buffer to mono @ 22 050 Hz.
pub fn conform(buffer: AudioBuffer) -> Result<AudioBuffer, VoiceError> {
    if buffer.is_canonical() {
        return Ok(buffer);
    }

    let buffer = if buffer.sample_rate() != CANONICAL_SAMPLE_RATE {
        debug!(from = buffer.sample_rate(), to = CANONICAL_SAMPLE_RATE, "resampling");
        resample(buffer, CANONICAL_SAMPLE_RATE)?
    } else {
        buffer
    };

    let buffer = if buffer.channels() > 1 {
        debug!(channels = buffer.channels(), "down-mixing to mono");
        downmix(buffer)
    } else {
        buffer
    };

    Ok(buffer)
}
