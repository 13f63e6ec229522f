//! End-to-end coercion of uploaded reference clips.

use std::io::Cursor;

use voice_clone_audio::{AudioCoercer, CANONICAL_SAMPLE_RATE, ToolLocation, Transcoder, VoiceError};

fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in samples {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn sine(freq: f32, rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
        .collect()
}

#[test]
fn canonical_wav_is_accepted_as_is() {
    let samples = sine(220.0, CANONICAL_SAMPLE_RATE, 11_025);
    let bytes = wav_bytes(&samples, CANONICAL_SAMPLE_RATE, 1);

    let out = AudioCoercer::without_conversion().coerce(&bytes, "voice.wav").unwrap();

    assert!(out.is_canonical());
    assert_eq!(out.frames(), 11_025);
    for (a, b) in out.samples().iter().zip(&samples) {
        assert!((a - b).abs() < 1e-3);
    }
}

#[test]
fn high_rate_upload_is_resampled() {
    let bytes = wav_bytes(&sine(220.0, 44_100, 44_100), 44_100, 1);

    let out = AudioCoercer::without_conversion().coerce(&bytes, "voice.wav").unwrap();

    assert!(out.is_canonical());
    assert!((out.frames() as i64 - 22_050).abs() <= 1, "frames {}", out.frames());
}

#[test]
fn stereo_upload_is_averaged() {
    let interleaved: Vec<f32> = (0..4_000).flat_map(|_| [0.5f32, -0.25]).collect();
    let bytes = wav_bytes(&interleaved, CANONICAL_SAMPLE_RATE, 2);

    let out = AudioCoercer::without_conversion().coerce(&bytes, "stereo.wav").unwrap();

    assert_eq!(out.channels(), 1);
    assert_eq!(out.frames(), 4_000);
    assert!(out.samples().iter().all(|s| (s - 0.125).abs() < 1e-3));
}

#[test]
fn undecodable_upload_without_ffmpeg_is_unsupported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let coercer = AudioCoercer::new(
        Transcoder::new(ToolLocation::unavailable("ffmpeg")).with_temp_dir(temp_dir.path()),
    );

    let err = coercer
        .coerce(b"definitely not audio, just text", "voice.webm")
        .unwrap_err();

    assert!(matches!(err, VoiceError::UnsupportedFormat(_)), "{err:?}");
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
