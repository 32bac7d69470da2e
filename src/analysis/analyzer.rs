//! Reference-clip quality analysis.
//!
//! [`QualityAnalyzer`] measures one [`AudioBuffer`] across four groups of
//! descriptors and folds them into a single composite score:
//!
//! | Group | Metrics |
//! |-------|---------|
//! | Signal | peak, RMS mean/std, zero-crossing rate |
//! | Noise | SNR of the remainder against a leading noise window |
//! | Speech | spectral centroid, rolloff, bandwidth, harmonic-to-noise ratio |
//! | Completeness | duration, silence ratio |
//!
//! # Example
//!
//! ```rust
//! use voice_prep::analysis::QualityAnalyzer;
//! use voice_prep::audio::{AudioBuffer, AudioError};
//!
//! let analyzer = QualityAnalyzer::default();
//!
//! let clip = AudioBuffer::new(
//!     (0..16_000).map(|i| (i as f32 * 0.07).sin() * 0.4).collect(),
//!     16_000,
//! );
//! let report = analyzer.analyze(&clip).unwrap();
//! assert!((0.0..=100.0).contains(&report.quality_score));
//!
//! // Empty input is rejected
//! let empty = AudioBuffer::new(Vec::new(), 16_000);
//! assert!(matches!(analyzer.analyze(&empty), Err(AudioError::InvalidAudio(_))));
//! ```

use serde::{Deserialize, Serialize};

use crate::audio::{AudioBuffer, AudioError, Stft};
use crate::config::{AnalysisConfig, ScoreWeights};

use super::metrics::{self, SpectralSummary};
use super::score;

// ---------------------------------------------------------------------------
// QualityMetrics / QualityReport
// ---------------------------------------------------------------------------

/// Raw descriptors measured for one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub sample_rate: u32,
    pub num_samples: usize,
    pub duration_secs: f32,
    pub peak: f32,
    pub rms_mean: f32,
    pub rms_std: f32,
    pub zero_crossing_rate: f32,
    pub spectral_centroid_hz: f32,
    pub spectral_rolloff_hz: f32,
    pub spectral_bandwidth_hz: f32,
    pub snr_db: f32,
    pub harmonic_noise_ratio: f32,
    pub silence_ratio: f32,
}

/// Metrics plus the derived composite score in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub quality_score: f32,
    #[serde(flatten)]
    pub metrics: QualityMetrics,
}

impl QualityReport {
    /// Score `metrics` with `weights`.
    pub fn new(metrics: QualityMetrics, weights: &ScoreWeights) -> Self {
        Self {
            quality_score: score::composite(weights, &metrics),
            metrics,
        }
    }

    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.metrics.duration_secs
    }

    /// Share of near-silent samples.
    pub fn silence_ratio(&self) -> f32 {
        self.metrics.silence_ratio
    }
}

// ---------------------------------------------------------------------------
// QualityAnalyzer
// ---------------------------------------------------------------------------

/// Computes [`QualityReport`]s. Stateless apart from its settings, so one
/// instance can be shared across worker threads.
pub struct QualityAnalyzer {
    /// Leading window (seconds) treated as background noise.
    pub noise_window_secs: f32,
    /// Composite score weights.
    pub weights: ScoreWeights,
    stft: Stft,
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl QualityAnalyzer {
    /// Build an analyzer from its config section.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            noise_window_secs: config.noise_window_secs,
            weights: config.weights,
            stft: Stft::default(),
        }
    }

    /// Measure `audio` and compute its composite score.
    ///
    /// Fails with [`AudioError::InvalidAudio`] for an empty buffer, a zero
    /// sample rate, or non-finite samples.
    pub fn analyze(&self, audio: &AudioBuffer) -> Result<QualityReport, AudioError> {
        audio.validate()?;
        let samples = &audio.samples;

        // 1. Signal
        let peak = audio.peak();
        let (rms_mean, rms_std) = metrics::mean_std(&metrics::frame_rms(samples));
        let zero_crossing_rate = metrics::zero_crossing_rate(samples);

        // 2. Noise
        let noise_len = (self.noise_window_secs.max(0.0) * audio.sample_rate as f32) as usize;
        let snr_db = metrics::leading_snr_db(samples, noise_len);

        // 3. Speech characteristics (single STFT pass)
        let spectral = SpectralSummary::from_frames(
            &self.stft.analyze(samples),
            &self.stft.bin_frequencies(audio.sample_rate),
        );

        // 4. Completeness
        let silence_ratio = metrics::silence_ratio(samples, peak);

        let metrics = QualityMetrics {
            sample_rate: audio.sample_rate,
            num_samples: samples.len(),
            duration_secs: audio.duration_secs(),
            peak,
            rms_mean,
            rms_std,
            zero_crossing_rate,
            spectral_centroid_hz: spectral.centroid_hz,
            spectral_rolloff_hz: spectral.rolloff_hz,
            spectral_bandwidth_hz: spectral.bandwidth_hz,
            snr_db,
            harmonic_noise_ratio: spectral.harmonic_noise_ratio,
            silence_ratio,
        };

        let report = QualityReport::new(metrics, &self.weights);
        log::debug!(
            "quality: score={:.1} duration={:.2}s snr={:.1}dB hnr={:.2} silence={:.2}",
            report.quality_score,
            report.metrics.duration_secs,
            report.metrics.snr_db,
            report.metrics.harmonic_noise_ratio,
            report.metrics.silence_ratio,
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
