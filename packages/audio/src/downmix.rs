//! Channel reduction.

use voice_clone_domain::AudioBuffer;

/// Average every frame's channels into a single mono sample.
pub fn downmix(buffer: AudioBuffer) -> AudioBuffer {
    let channels = buffer.channels() as usize;
    if channels <= 1 {
        return buffer;
    }

    let scale = 1.0 / channels as f32;
    let mono = buffer
        .samples()
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect();
    AudioBuffer::mono(mono, buffer.sample_rate())
}
