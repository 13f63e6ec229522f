//! Single-point audio resampler. Host-side only (rubato is pure-CPU SIMD);
//! callers feed and consume `AudioBuffer`s.
//
// Maintainers: there must be **no other resample helpers** in the tree.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;
use voice_clone_domain::{AudioBuffer, VoiceError};

/// Input block size handed to the FFT resampler.
const CHUNK: usize = 1024;
/// Number of sub-chunks per block (latency / quality trade-off).
const SUB_CHUNKS: usize = 2;

/// Resample every channel of `buffer` to `target_rate`.
///
/// The resampler's group delay is trimmed and the output is cut to
/// `ceil(frames × target / source)` frames, so a 44.1 kHz clip of N frames
/// becomes exactly ⌈N/2⌉ frames at 22.05 kHz.
pub fn resample(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer, VoiceError> {
    let source_rate = buffer.sample_rate();
    if source_rate == target_rate {
        return Ok(buffer);
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(VoiceError::ConversionFailed(format!(
            "cannot resample {source_rate} Hz to {target_rate} Hz"
        )));
    }

    let channels = buffer.channels() as usize;
    let frames = buffer.frames();
    let expected = (frames as u64 * target_rate as u64).div_ceil(source_rate as u64) as usize;
    debug!(source_rate, target_rate, channels, frames, "resampling");

    // ──────────────────────────────────────────────────────────────────────
    // 1. De-interleave
    // ──────────────────────────────────────────────────────────────────────
    let mut planes = vec![Vec::with_capacity(frames); channels];
    for frame in buffer.samples().chunks_exact(channels) {
        for (plane, &s) in planes.iter_mut().zip(frame) {
            plane.push(s);
        }
    }

    // ──────────────────────────────────────────────────────────────────────
    // 2. Chunked FFT resampling, then flush until the delay is covered
    // ──────────────────────────────────────────────────────────────────────
    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        channels,
    )
    .map_err(resample_err)?;
    let delay = resampler.output_delay();

    let mut out = vec![Vec::with_capacity(expected + delay + CHUNK); channels];
    let mut pos = 0;
    while frames - pos >= resampler.input_frames_next() {
        let need = resampler.input_frames_next();
        let block: Vec<&[f32]> = planes.iter().map(|p| &p[pos..pos + need]).collect();
        let produced = resampler.process(&block, None).map_err(resample_err)?;
        append(&mut out, produced);
        pos += need;
    }
    if pos < frames {
        let block: Vec<&[f32]> = planes.iter().map(|p| &p[pos..]).collect();
        let produced = resampler
            .process_partial(Some(block.as_slice()), None)
            .map_err(resample_err)?;
        append(&mut out, produced);
    }
    while out[0].len() < delay + expected {
        let produced = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(resample_err)?;
        if produced[0].is_empty() {
            break;
        }
        append(&mut out, produced);
    }

    // ──────────────────────────────────────────────────────────────────────
    // 3. Trim delay / tail and re-interleave
    // ──────────────────────────────────────────────────────────────────────
    let available = out[0].len().saturating_sub(delay).min(expected);
    let mut interleaved = Vec::with_capacity(available * channels);
    for i in delay..delay + available {
        for plane in &out {
            interleaved.push(plane[i]);
        }
    }

    Ok(AudioBuffer::new(interleaved, target_rate, buffer.channels()))
}

fn append(out: &mut [Vec<f32>], produced: Vec<Vec<f32>>) {
    for (dst, src) in out.iter_mut().zip(produced) {
        dst.extend_from_slice(&src);
    }
}

fn resample_err(e: impl std::fmt::Display) -> VoiceError {
    VoiceError::ConversionFailed(format!("resample: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_clone_domain::CANONICAL_SAMPLE_RATE;

    fn sine(freq: f32, rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    fn rms(x: &[f32]) -> f32 {
        (x.iter().map(|s| s * s).sum::<f32>() / x.len() as f32).sqrt()
    }

    #[test]
    fn same_rate_is_a_no_op() {
        let buf = AudioBuffer::mono(vec![0.1, 0.2, 0.3], CANONICAL_SAMPLE_RATE);
        let out = resample(buf.clone(), CANONICAL_SAMPLE_RATE).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn halves_frame_count_from_44k1() {
        let frames = 44_100;
        let buf = AudioBuffer::mono(sine(440.0, 44_100, frames), 44_100);
        let out = resample(buf, CANONICAL_SAMPLE_RATE).unwrap();

        assert_eq!(out.sample_rate(), CANONICAL_SAMPLE_RATE);
        assert_eq!(out.frames(), frames / 2);

        // the tone survives: compare energy away from the edges
        let middle = &out.samples()[2_000..20_000];
        let ratio = rms(middle) / (0.5 / std::f32::consts::SQRT_2);
        assert!((0.9..1.1).contains(&ratio), "rms ratio {ratio}");
    }

    #[test]
    fn short_clips_still_produce_output() {
        let buf = AudioBuffer::mono(sine(200.0, 48_000, 300), 48_000);
        let out = resample(buf, CANONICAL_SAMPLE_RATE).unwrap();
        // ceil(300 * 22050 / 48000) = 138
        assert_eq!(out.frames(), 138);
    }

    #[test]
    fn keeps_channel_layout() {
        let mut interleaved = Vec::new();
        for s in sine(300.0, 16_000, 8_000) {
            interleaved.push(s);
            interleaved.push(-s);
        }
        let buf = AudioBuffer::new(interleaved, 16_000, 2);
        let out = resample(buf, CANONICAL_SAMPLE_RATE).unwrap();
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 11_025);
        for frame in out.samples().chunks_exact(2) {
            assert!((frame[0] + frame[1]).abs() < 1e-4);
        }
    }
}
