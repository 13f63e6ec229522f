//! Direct decoding: RIFF/WAV through `hound`, everything else Symphonia can
//! probe. Output keeps the source rate and channel layout (interleaved).

use std::io::Cursor;
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use thiserror::Error;
use tracing::debug;
use voice_clone_domain::AudioBuffer;

/* ─────────────────────── error handling ─────────────────────── */

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("container: {0}")]
    Container(#[from] SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("decoded stream has no samples")]
    Empty,
}

/* ─────────────────────── public API ─────────────────────────── */

/// Decode `bytes` into an interleaved `f32` buffer.
///
/// `name_hint` (usually the upload's file name) only steers Symphonia's probe;
/// the container is still detected from its magic bytes.
pub fn decode(bytes: &[u8], name_hint: Option<&str>) -> Result<AudioBuffer, DecodeError> {
    let buffer = if is_riff_wave(bytes) {
        match decode_wav(bytes) {
            Ok(buffer) => buffer,
            // e.g. WAVE_FORMAT_EXTENSIBLE sub-formats hound refuses
            Err(e) => {
                debug!(error = %e, "hound rejected RIFF/WAVE, probing with symphonia");
                decode_container(bytes, name_hint)?
            }
        }
    } else {
        decode_container(bytes, name_hint)?
    };

    if !buffer.is_valid() {
        return Err(DecodeError::Empty);
    }
    Ok(buffer)
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}

fn decode_container(bytes: &[u8], name_hint: Option<&str>) -> Result<AudioBuffer, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = name_hint
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
    {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    // Extract track information before starting packet processing
    // to avoid overlapping borrows
    let (track_id, codec_params) = {
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoTrack)?;
        (track.id, track.codec_params.clone())
    };

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut pcm = Vec::<f32>::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                pcm.extend_from_slice(buf.samples());
            }
            // a corrupt packet is skipped, not fatal
            Err(SymphoniaError::DecodeError(msg)) => {
                debug!(msg, "skipping undecodable packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let channels = u16::try_from(channels).map_err(|_| DecodeError::NoTrack)?;
    Ok(AudioBuffer::new(pcm, sample_rate, channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn wav_bytes(spec: WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut w = WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn decodes_stereo_pcm16_wav() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[16384, -16384, 0, 32767]);
        let buf = decode(&bytes, Some("clip.wav")).unwrap();

        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.sample_rate(), 44_100);
        assert_eq!(buf.frames(), 2);
        assert_eq!(buf.samples()[0], 0.5);
        assert_eq!(buf.samples()[1], -0.5);
    }

    #[test]
    fn header_only_wav_is_empty() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[]);
        assert!(decode(&bytes, None).is_err());
    }

    #[test]
    fn garbage_is_not_decodable() {
        let bytes = b"this is plainly not an audio container ".repeat(64);
        assert!(decode(&bytes, Some("voice.webm")).is_err());
    }
}
