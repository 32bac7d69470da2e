//! Peak normalisation.

use crate::audio::AudioBuffer;

/// Convert decibels relative to full scale into a linear amplitude.
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Scale `audio` so its peak magnitude equals `10^(target_db / 20)`.
///
/// A silent buffer is returned unchanged.
///
/// ```rust
/// use voice_prep::audio::AudioBuffer;
/// use voice_prep::refine::normalize_peak;
///
/// let quiet = AudioBuffer::new(vec![0.1, -0.2, 0.05], 22_050);
/// let loud = normalize_peak(&quiet, 0.0);
/// assert!((loud.peak() - 1.0).abs() < 1e-6);
/// ```
pub fn normalize_peak(audio: &AudioBuffer, target_db: f32) -> AudioBuffer {
    let peak = audio.peak();
    if peak <= 0.0 {
        return audio.clone();
    }

    // f64 gain: a subnormal f32 peak would overflow an f32 gain to inf.
    let gain = f64::from(db_to_amplitude(target_db)) / f64::from(peak);
    log::debug!(
        "normalize: peak {:.4e} -> {:.4} (gain {:.3e})",
        peak,
        f64::from(peak) * gain,
        gain
    );
    AudioBuffer::new(
        audio
            .samples
            .iter()
            .map(|&s| (f64::from(s) * gain) as f32)
            .collect(),
        audio.sample_rate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_reaches_minus_three_db() {
        let audio = AudioBuffer::new(vec![0.0, 0.25, -0.5, 0.1], 16_000);
        let out = normalize_peak(&audio, -3.0);
        assert!((out.peak() - 0.707_945_8).abs() < 1e-5, "peak = {}", out.peak());
        // relative shape preserved
        assert!((out.samples[1] / out.samples[2] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn loud_input_is_attenuated() {
        let audio = AudioBuffer::new(vec![1.0, -1.0], 16_000);
        let out = normalize_peak(&audio, -6.0);
        assert!((out.peak() - db_to_amplitude(-6.0)).abs() < 1e-6);
    }

    #[test]
    fn silent_buffer_is_untouched() {
        let audio = AudioBuffer::new(vec![0.0; 64], 16_000);
        assert_eq!(normalize_peak(&audio, -3.0), audio);
    }

    #[test]
    fn subnormal_peak_reaches_target() {
        let audio = AudioBuffer::new(vec![1e-40, 0.0, -5e-41], 16_000);
        let out = normalize_peak(&audio, -3.0);
        assert!(out.samples.iter().all(|s| s.is_finite()), "{:?}", out.samples);
        assert!((out.peak() - db_to_amplitude(-3.0)).abs() < 1e-4, "peak = {}", out.peak());
        assert_eq!(out.samples[1], 0.0);
        assert!(out.samples[2] < 0.0);
    }
}
