//! WAV export helpers – every waveform is peak-normalised into [-1, 1]
//! before it is quantised to 16-bit PCM.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use voice_clone_domain::{AudioBuffer, CANONICAL_SAMPLE_RATE, VoiceError};

/// Rescale `samples` by `1 / max|x|` when any magnitude exceeds 1.0.
///
/// Returns `true` if the buffer was touched. Waveforms already inside the
/// unit range are left bit-for-bit unchanged.
pub fn peak_normalize(samples: &mut [f32]) -> bool {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= 1.0 {
        return false;
    }
    let gain = 1.0 / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
    true
}

/// Encode a model waveform as mono 16-bit WAV at 22 050 Hz.
pub fn encode(samples: Vec<f32>) -> Result<Vec<u8>, VoiceError> {
    encode_wav(samples, CANONICAL_SAMPLE_RATE)
}

/// Encode `samples` (mono) as a 16-bit PCM WAV byte stream at `sample_rate`.
///
/// Empty or non-finite input is rejected with [`VoiceError::InvalidWaveform`].
pub fn encode_wav(mut samples: Vec<f32>, sample_rate: u32) -> Result<Vec<u8>, VoiceError> {
    validate(&samples)?;
    peak_normalize(&mut samples);

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    write_pcm16(&mut cursor, &samples, sample_rate, 1)?;
    Ok(cursor.into_inner())
}

/// Write `buffer` to `path` as 16-bit PCM, keeping its rate and layout.
pub fn write_wav_file(path: &Path, buffer: &AudioBuffer) -> Result<(), VoiceError> {
    let mut samples = buffer.samples().to_vec();
    validate(&samples)?;
    peak_normalize(&mut samples);

    let file = std::fs::File::create(path)?;
    let mut bw = std::io::BufWriter::with_capacity(1 << 16, file);
    write_pcm16(&mut bw, &samples, buffer.sample_rate(), buffer.channels())?;
    bw.flush()?;
    Ok(())
}

fn validate(samples: &[f32]) -> Result<(), VoiceError> {
    if samples.is_empty() {
        return Err(VoiceError::InvalidWaveform("waveform is empty".into()));
    }
    if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
        return Err(VoiceError::InvalidWaveform(format!(
            "non-finite sample {} at index {idx}",
            samples[idx]
        )));
    }
    Ok(())
}

fn write_pcm16<W: Write + Seek>(
    w: W,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), VoiceError> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(w, spec).map_err(wav_err)?;
    {
        // one pre-sized writer, no per-sample bounds checks
        let mut i16_writer = writer.get_i16_writer(samples.len() as u32);
        for &s in samples {
            i16_writer.write_sample(to_i16(s));
        }
        i16_writer.flush().map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}

#[inline]
fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn wav_err(e: hound::Error) -> VoiceError {
    VoiceError::Io(format!("wav encode: {e}"))
}
