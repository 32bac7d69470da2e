//! Five-stage refinement of a single reference clip.
//!
//! ```text
//! AudioBuffer
//!   └─▶ normalize_peak       (-3 dBFS)
//!         └─▶ trim_silence   (20 dB below peak)
//!               ├─ empty → Err(UnprocessableAudio { original })
//!               └─▶ SpectralGate::apply
//!                     └─▶ resample            (22 050 Hz)
//!                           └─▶ extract_best_segment (15 s)
//! ```
//!
//! Each stage is a pure function of its input; the processor only fixes the
//! order and the parameters.

use crate::audio::{AudioBuffer, AudioError};
use crate::config::RefinementConfig;

use super::denoise::SpectralGate;
use super::normalize::normalize_peak;
use super::resample::resample;
use super::segment::extract_best_segment;
use super::trim::trim_silence;

// ---------------------------------------------------------------------------
// RefinementProcessor
// ---------------------------------------------------------------------------

/// Applies normalize → trim → denoise → resample → best segment.
///
/// # Example
///
/// ```rust
/// use voice_prep::audio::{AudioBuffer, AudioError};
/// use voice_prep::refine::RefinementProcessor;
///
/// let processor = RefinementProcessor::default();
///
/// let silent = AudioBuffer::new(vec![0.0; 16_000], 16_000);
/// match processor.process(&silent) {
///     Err(AudioError::UnprocessableAudio { original, .. }) => assert_eq!(*original, silent),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
pub struct RefinementProcessor {
    config: RefinementConfig,
    gate: SpectralGate,
}

impl Default for RefinementProcessor {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}

impl RefinementProcessor {
    /// Build a processor from its config section.
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self {
            config: config.clone(),
            gate: SpectralGate::new(config.noise_window_secs),
        }
    }

    /// Settings this processor was built with.
    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Run all five stages on `audio`.
    ///
    /// # Errors
    ///
    /// * [`AudioError::InvalidAudio`]: empty input, zero sample rate or
    ///   non-finite samples.
    /// * [`AudioError::UnprocessableAudio`]: nothing is left after silence
    ///   trimming; carries a copy of `audio` untouched.
    /// * [`AudioError::Resample`]: the resampler failed.
    pub fn process(&self, audio: &AudioBuffer) -> Result<AudioBuffer, AudioError> {
        audio.validate()?;
        let cfg = &self.config;

        // ── 1. Normalize ─────────────────────────────────────────────────
        let normalized = normalize_peak(audio, cfg.target_peak_db);
        log::info!(
            "refine: normalized peak {:.3} -> {:.3}",
            audio.peak(),
            normalized.peak()
        );

        // ── 2. Trim silence ──────────────────────────────────────────────
        let trimmed = trim_silence(&normalized, cfg.silence_threshold_db);
        if trimmed.is_empty() {
            log::warn!("refine: clip is silent after trimming, leaving it unrefined");
            return Err(AudioError::UnprocessableAudio {
                reason: format!(
                    "no sound within {} dB of peak in {:.2}s clip",
                    cfg.silence_threshold_db,
                    audio.duration_secs()
                ),
                original: Box::new(audio.clone()),
            });
        }
        log::info!(
            "refine: trimmed {:.2}s of silence ({:.2}s left)",
            normalized.duration_secs() - trimmed.duration_secs(),
            trimmed.duration_secs()
        );

        // ── 3. Denoise ───────────────────────────────────────────────────
        let denoised = self.gate.apply(&trimmed);
        log::info!("refine: spectral gate applied ({} samples)", denoised.len());

        // ── 4. Resample ──────────────────────────────────────────────────
        let resampled = resample(&denoised, cfg.target_sample_rate)?;
        log::info!(
            "refine: resampled {} Hz -> {} Hz",
            denoised.sample_rate,
            resampled.sample_rate
        );

        // ── 5. Best segment ──────────────────────────────────────────────
        let segment = extract_best_segment(&resampled, cfg.segment_secs);
        log::info!(
            "refine: kept {:.2}s of {:.2}s",
            segment.duration_secs(),
            resampled.duration_secs()
        );

        Ok(segment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::normalize::db_to_amplitude;
    use std::f32::consts::PI;

    const RATE: u32 = 16_000;

    /// `lead` s of silence, `body` s of tone, `tail` s of silence.
    fn padded_tone(lead: f32, body: f32, tail: f32) -> AudioBuffer {
        let lead = (lead * RATE as f32) as usize;
        let body = (body * RATE as f32) as usize;
        let tail = (tail * RATE as f32) as usize;
        let mut samples = vec![0.0_f32; lead];
        samples.extend((0..body).map(|i| (2.0 * PI * 200.0 * i as f32 / RATE as f32).sin() * 0.3));
        samples.extend(vec![0.0; tail]);
        AudioBuffer::new(samples, RATE)
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = RefinementProcessor::default()
            .process(&AudioBuffer::new(Vec::new(), RATE))
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidAudio(_)), "{err}");
    }

    #[test]
    fn zero_rate_is_invalid() {
        let err = RefinementProcessor::default()
            .process(&AudioBuffer::new(vec![0.5; 10], 0))
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidAudio(_)), "{err}");
    }

    #[test]
    fn silent_clip_is_unprocessable_with_original() {
        let silent = AudioBuffer::new(vec![0.0; 8_000], RATE);
        let err = RefinementProcessor::default().process(&silent).unwrap_err();
        assert!(matches!(err, AudioError::UnprocessableAudio { .. }), "{err}");
        assert_eq!(err.into_original(), Some(silent));
    }

    #[test]
    fn subnormal_clip_yields_finite_output() {
        let faint = AudioBuffer::new(vec![1e-40; 32_000], RATE);
        let out = RefinementProcessor::default().process(&faint).unwrap();
        assert_eq!(out.sample_rate, 22_050);
        assert!(out.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn short_clip_is_trimmed_and_resampled() {
        let audio = padded_tone(1.0, 3.0, 1.0);
        let out = RefinementProcessor::default().process(&audio).unwrap();

        assert_eq!(out.sample_rate, 22_050);
        // 3 s of tone survives; padding is gone
        assert!((out.duration_secs() - 3.0).abs() < 0.01, "{}", out.duration_secs());
        assert!(out.peak() > 0.0 && out.peak() <= db_to_amplitude(-3.0) * 1.05);
    }

    #[test]
    fn long_clip_is_cut_to_segment_length() {
        let audio = padded_tone(0.5, 20.0, 0.5);
        let out = RefinementProcessor::default().process(&audio).unwrap();
        assert_eq!(out.sample_rate, 22_050);
        assert_eq!(out.len(), 15 * 22_050);
    }

    #[test]
    fn custom_config_is_respected() {
        let config = RefinementConfig {
            target_sample_rate: 16_000,
            segment_secs: 1.0,
            ..RefinementConfig::default()
        };
        let processor = RefinementProcessor::from_config(&config);
        assert_eq!(processor.config(), &config);

        let out = processor.process(&padded_tone(0.2, 2.0, 0.2)).unwrap();
        assert_eq!(out.sample_rate, 16_000);
        assert_eq!(out.len(), 16_000);
    }
}
