//! Placeholder reference clip for requests that bring no voice of their own.
//!
//! A 150 Hz "voice" built from four harmonics under an exponential decay.
//! Cloning quality from it is poor; it only guarantees the model always has a
//! reference speaker.

use voice_clone_domain::{AudioBuffer, CANONICAL_SAMPLE_RATE};

/// Length of the placeholder clip.
pub const DEFAULT_DURATION_SECS: f64 = 2.0;
/// Fundamental frequency (typical male voice).
pub const FUNDAMENTAL_HZ: f64 = 150.0;
/// Weights of harmonics 1..=4.
pub const HARMONIC_WEIGHTS: [f64; 4] = [0.5, 0.3, 0.2, 0.1];
/// Decay rate of the `exp(-rate·t)` envelope.
pub const DECAY_RATE: f64 = 0.5;
/// Peak amplitude after normalisation.
pub const PEAK_AMPLITUDE: f64 = 0.7;

/// Deterministic 2 s mono clip at 22 050 Hz.
///
/// Computed in `f64` and rounded once, so repeated calls are bit-identical.
pub fn synthesize_default() -> AudioBuffer {
    let rate = CANONICAL_SAMPLE_RATE as f64;
    let len = (rate * DEFAULT_DURATION_SECS) as usize;

    let signal: Vec<f64> = (0..len)
        .map(|i| {
            let t = i as f64 / rate;
            let voiced: f64 = HARMONIC_WEIGHTS
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let freq = FUNDAMENTAL_HZ * (k + 1) as f64;
                    w * (2.0 * std::f64::consts::PI * freq * t).sin()
                })
                .sum();
            voiced * (-DECAY_RATE * t).exp()
        })
        .collect();

    let peak = signal.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    let gain = if peak > 0.0 { PEAK_AMPLITUDE / peak } else { 0.0 };

    let samples = signal.into_iter().map(|s| (s * gain) as f32).collect();
    AudioBuffer::mono(samples, CANONICAL_SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_rate() {
        let clip = synthesize_default();
        assert!(clip.is_canonical());
        assert_eq!(clip.frames(), 44_100);
        assert!((clip.duration_secs() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn peak_is_point_seven() {
        let clip = synthesize_default();
        let peak = clip.samples().iter().fold(0.0f32, |a, s| a.max(s.abs()));
        assert!((peak - 0.7).abs() < 1e-6, "peak {peak}");
    }

    #[test]
    fn deterministic() {
        let a = synthesize_default();
        let b = synthesize_default();
        let bits_a: Vec<u32> = a.samples().iter().map(|s| s.to_bits()).collect();
        let bits_b: Vec<u32> = b.samples().iter().map(|s| s.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn envelope_decays() {
        let clip = synthesize_default();
        let s = clip.samples();
        let head = s[..2_205].iter().fold(0.0f32, |a, x| a.max(x.abs()));
        let tail = s[s.len() - 2_205..].iter().fold(0.0f32, |a, x| a.max(x.abs()));
        // exp(-0.5 * ~1.9) ≈ 0.39 of the opening level
        assert!(tail < head * 0.5);
    }

    #[test]
    fn starts_at_silence() {
        assert_eq!(synthesize_default().samples()[0], 0.0);
    }
}
