//! In-memory PCM buffer passed between pipeline stages.

/// Sample rate every reference clip and every response is normalized to.
pub const CANONICAL_SAMPLE_RATE: u32 = 22_050;

/// Interleaved `f32` samples plus their layout.
///
/// `samples.len()` is always a multiple of `channels`; constructors that take
/// raw parts drop a trailing partial frame rather than carry it around.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Build a buffer from interleaved samples.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        if channels > 0 {
            let whole = samples.len() - samples.len() % channels as usize;
            samples.truncate(whole);
        }
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Single-channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// A decoder produced something usable: at least one frame, one channel
    /// and a real sample rate.
    pub fn is_valid(&self) -> bool {
        self.channels > 0 && self.sample_rate > 0 && self.frames() > 0
    }

    /// Mono at [`CANONICAL_SAMPLE_RATE`].
    pub fn is_canonical(&self) -> bool {
        self.channels == 1 && self.sample_rate == CANONICAL_SAMPLE_RATE
    }
}
