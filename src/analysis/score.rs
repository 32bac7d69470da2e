//! Composite quality score.
//!
//! Each metric is mapped onto `[0, 1]`, multiplied by its weight from
//! [`ScoreWeights`], and the sum is clipped to `[0, 100]`:
//!
//! | Term | Normalisation | Default weight |
//! |------|---------------|----------------|
//! | Duration | `duration / 10 s` | 25 |
//! | SNR | `snr_db / 30 dB` | 25 |
//! | Clarity | `hnr / 3.0` | 25 |
//! | Completeness | `1 - silence_ratio` | 25 |

use crate::config::ScoreWeights;

use super::QualityMetrics;

/// Default weight of the duration term.
pub const DURATION_WEIGHT: f32 = 25.0;
/// Default weight of the SNR term.
pub const SNR_WEIGHT: f32 = 25.0;
/// Default weight of the clarity term.
pub const CLARITY_WEIGHT: f32 = 25.0;
/// Default weight of the completeness term.
pub const COMPLETENESS_WEIGHT: f32 = 25.0;

/// Clip duration that earns the full duration term.
pub const DURATION_FULL_SCALE_SECS: f32 = 10.0;
/// SNR that earns the full SNR term.
pub const SNR_FULL_SCALE_DB: f32 = 30.0;
/// Harmonic-to-noise ratio that earns the full clarity term.
pub const HNR_FULL_SCALE: f32 = 3.0;

/// Lower bound of the composite score.
pub const MIN_SCORE: f32 = 0.0;
/// Upper bound of the composite score.
pub const MAX_SCORE: f32 = 100.0;

fn unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Duration term in `[0, 1]`.
pub fn duration_term(duration_secs: f32) -> f32 {
    unit(duration_secs / DURATION_FULL_SCALE_SECS)
}

/// SNR term in `[0, 1]`.
pub fn snr_term(snr_db: f32) -> f32 {
    unit(snr_db / SNR_FULL_SCALE_DB)
}

/// Clarity term in `[0, 1]`.
pub fn clarity_term(harmonic_noise_ratio: f32) -> f32 {
    unit(harmonic_noise_ratio / HNR_FULL_SCALE)
}

/// Completeness term in `[0, 1]`.
pub fn completeness_term(silence_ratio: f32) -> f32 {
    unit(1.0 - silence_ratio)
}

/// Weighted composite of `metrics`, clipped to `[MIN_SCORE, MAX_SCORE]`.
///
/// ```rust
/// use voice_prep::analysis::{score, QualityMetrics};
/// use voice_prep::config::ScoreWeights;
///
/// let metrics = QualityMetrics {
///     duration_secs: 12.0,
///     snr_db: 45.0,
///     harmonic_noise_ratio: 5.0,
///     silence_ratio: 0.0,
///     ..QualityMetrics::default()
/// };
/// assert_eq!(score::composite(&ScoreWeights::default(), &metrics), 100.0);
/// ```
pub fn composite(weights: &ScoreWeights, metrics: &QualityMetrics) -> f32 {
    let total = weights.duration * duration_term(metrics.duration_secs)
        + weights.snr * snr_term(metrics.snr_db)
        + weights.clarity * clarity_term(metrics.harmonic_noise_ratio)
        + weights.completeness * completeness_term(metrics.silence_ratio);

    if total.is_nan() {
        MIN_SCORE
    } else {
        total.clamp(MIN_SCORE, MAX_SCORE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
