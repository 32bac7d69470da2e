//! Signal descriptors feeding the quality report.
//!
//! Time-domain helpers work on raw samples; [`SpectralSummary`] walks the
//! STFT frames once and accumulates every frequency-domain descriptor in
//! that single pass.

use rustfft::num_complex::Complex;

/// Frame length used for the RMS envelope.
pub const RMS_FRAME_LENGTH: usize = 2048;
/// Frame advance used for the RMS envelope.
pub const RMS_HOP_LENGTH: usize = 512;

/// Share of total spectral magnitude below the rolloff frequency.
pub const ROLLOFF_PERCENT: f32 = 0.85;

/// Samples below this fraction of the peak count as silence.
pub const SILENCE_AMPLITUDE_RATIO: f32 = 0.02;

/// SNR reported when the leading noise segment is digitally silent.
pub const SNR_CEILING_DB: f32 = 60.0;

/// Per-frame cap on the harmonic-to-noise ratio of near-pure tones.
pub const HNR_CEILING: f32 = 1_000.0;

/// Frames whose total power is below this are skipped by the spectral pass.
const SILENT_FRAME_POWER: f32 = 1e-10;
/// Added to each power bin before the geometric mean.
const FLATNESS_EPSILON: f32 = 1e-12;

// ---------------------------------------------------------------------------
// Time domain
// ---------------------------------------------------------------------------

/// Root mean square of `samples` (`0.0` when empty).
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// RMS of each analysis frame.
///
/// A buffer shorter than one frame yields a single frame covering all of it.
pub fn frame_rms(samples: &[f32]) -> Vec<f32> {
    if samples.len() <= RMS_FRAME_LENGTH {
        return vec![rms(samples)];
    }
    (0..=(samples.len() - RMS_FRAME_LENGTH) / RMS_HOP_LENGTH)
        .map(|f| {
            let start = f * RMS_HOP_LENGTH;
            rms(&samples[start..start + RMS_FRAME_LENGTH])
        })
        .collect()
}

/// Population mean and standard deviation.
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    (mean, var.sqrt())
}

/// Fraction of adjacent sample pairs whose sign differs.
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / (samples.len() - 1) as f32
}

/// SNR in dB of the remainder against a presumed-silent leading segment.
///
/// The leading segment is `noise_len` samples, capped at half the buffer.
/// A digitally silent lead yields [`SNR_CEILING_DB`]; a silent remainder
/// yields `0.0`.
pub fn leading_snr_db(samples: &[f32], noise_len: usize) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let lead = noise_len.clamp(1, samples.len() / 2);
    let noise = rms(&samples[..lead]);
    let signal = rms(&samples[lead..]);

    if signal <= 0.0 {
        0.0
    } else if noise <= 0.0 {
        SNR_CEILING_DB
    } else {
        (20.0 * (signal / noise).log10()).min(SNR_CEILING_DB)
    }
}

/// Share of samples whose magnitude is below
/// `peak * SILENCE_AMPLITUDE_RATIO` (`1.0` for an all-zero buffer).
pub fn silence_ratio(samples: &[f32], peak: f32) -> f32 {
    if samples.is_empty() || peak <= 0.0 {
        return 1.0;
    }
    let threshold = peak * SILENCE_AMPLITUDE_RATIO;
    let quiet = samples.iter().filter(|s| s.abs() < threshold).count();
    quiet as f32 / samples.len() as f32
}

// ---------------------------------------------------------------------------
// Frequency domain
// ---------------------------------------------------------------------------

/// Per-frame spectral descriptors averaged over the non-silent frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralSummary {
    /// Magnitude-weighted mean frequency (Hz).
    pub centroid_hz: f32,
    /// Frequency below which [`ROLLOFF_PERCENT`] of magnitude lies (Hz).
    pub rolloff_hz: f32,
    /// Magnitude-weighted standard deviation around the centroid (Hz).
    pub bandwidth_hz: f32,
    /// `(1 - flatness) / flatness` of the power spectrum.
    pub harmonic_noise_ratio: f32,
    /// Frames that contributed to the averages.
    pub frames: usize,
}

impl SpectralSummary {
    /// Summarise `frames` (half-spectra) whose bins sit at `freqs`.
    pub fn from_frames(frames: &[Vec<Complex<f32>>], freqs: &[f32]) -> Self {
        let mut acc = Self::default();

        for frame in frames {
            let mags: Vec<f32> = frame.iter().map(|c| c.norm()).collect();
            let power_total: f32 = mags.iter().map(|m| m * m).sum();
            if power_total < SILENT_FRAME_POWER {
                continue;
            }
            let mag_total: f32 = mags.iter().sum();

            let centroid = mags.iter().zip(freqs).map(|(m, f)| m * f).sum::<f32>() / mag_total;
            let spread = mags
                .iter()
                .zip(freqs)
                .map(|(m, f)| m * (f - centroid) * (f - centroid))
                .sum::<f32>()
                / mag_total;

            let target = ROLLOFF_PERCENT * mag_total;
            let mut cumulative = 0.0_f32;
            let rolloff = mags
                .iter()
                .zip(freqs)
                .find_map(|(m, f)| {
                    cumulative += m;
                    (cumulative >= target).then_some(*f)
                })
                .unwrap_or_else(|| freqs.last().copied().unwrap_or(0.0));

            let n = mags.len() as f32;
            let log_mean = mags
                .iter()
                .map(|m| (m * m + FLATNESS_EPSILON).ln())
                .sum::<f32>()
                / n;
            let arith_mean = mags.iter().map(|m| m * m + FLATNESS_EPSILON).sum::<f32>() / n;
            let flatness = (log_mean.exp() / arith_mean).clamp(f32::MIN_POSITIVE, 1.0);

            acc.centroid_hz += centroid;
            acc.bandwidth_hz += spread.sqrt();
            acc.rolloff_hz += rolloff;
            acc.harmonic_noise_ratio += ((1.0 - flatness) / flatness).min(HNR_CEILING);
            acc.frames += 1;
        }

        if acc.frames > 0 {
            let n = acc.frames as f32;
            acc.centroid_hz /= n;
            acc.bandwidth_hz /= n;
            acc.rolloff_hz /= n;
            acc.harmonic_noise_ratio /= n;
        }
        acc
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Stft;
    use std::f32::consts::PI;

    fn tone(len: usize, freq: f32, rate: f32, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / rate).sin() * amp)
            .collect()
    }

    /// Deterministic pseudo-noise in `[-amp, amp]` (64-bit LCG).
    fn noise(len: usize, amp: f32) -> Vec<f32> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 40) as f32 / (1u64 << 24) as f32 * 2.0 - 1.0) * amp
            })
            .collect()
    }

    #[test]
    fn rms_of_constant() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn frame_rms_short_buffer_is_single_frame() {
        assert_eq!(frame_rms(&[0.3; 100]).len(), 1);
    }

    #[test]
    fn frame_rms_counts_frames() {
        // (4096 - 2048) / 512 + 1 = 5 frames
        assert_eq!(frame_rms(&[0.1; 4_096]).len(), 5);
    }

    #[test]
    fn mean_std_of_values() {
        let (mean, std) = mean_std(&[1.0, 3.0]);
        assert!((mean - 2.0).abs() < 1e-6);
        assert!((std - 1.0).abs() < 1e-6);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn zcr_of_alternating_signal_is_one() {
        let alt: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert!((zero_crossing_rate(&alt) - 1.0).abs() < 1e-6);
        assert_eq!(zero_crossing_rate(&[0.5; 50]), 0.0);
        assert_eq!(zero_crossing_rate(&[0.5]), 0.0);
    }

    #[test]
    fn snr_silent_lead_hits_ceiling() {
        let mut s = vec![0.0_f32; 1_000];
        s.extend(vec![0.5_f32; 1_000]);
        assert_eq!(leading_snr_db(&s, 1_000), SNR_CEILING_DB);
    }

    #[test]
    fn snr_of_known_ratio() {
        let mut s = vec![0.01_f32; 1_000];
        s.extend(vec![0.1_f32; 3_000]);
        // 20 * log10(0.1 / 0.01) = 20 dB
        assert!((leading_snr_db(&s, 1_000) - 20.0).abs() < 1e-3);
    }

    #[test]
    fn snr_lead_capped_at_half() {
        let mut s = vec![0.01_f32; 50];
        s.extend(vec![0.1_f32; 50]);
        // Requested lead of 10 000 samples is capped at 50
        assert!((leading_snr_db(&s, 10_000) - 20.0).abs() < 1e-3);
    }

    #[test]
    fn snr_silent_remainder_is_zero() {
        let mut s = vec![0.2_f32; 10];
        s.extend(vec![0.0_f32; 10]);
        assert_eq!(leading_snr_db(&s, 10), 0.0);
    }

    #[test]
    fn silence_ratio_counts_quiet_samples() {
        let mut s = vec![0.0_f32; 30];
        s.extend(vec![0.5_f32; 70]);
        assert!((silence_ratio(&s, 0.5) - 0.3).abs() < 1e-6);
        assert_eq!(silence_ratio(&[0.0; 10], 0.0), 1.0);
    }

    #[test]
    fn tone_has_narrow_spectrum_and_high_hnr() {
        let rate = 16_000;
        let stft = Stft::default();
        let frames = stft.analyze(&tone(16_000, 1_000.0, rate as f32, 0.5));
        let summary = SpectralSummary::from_frames(&frames, &stft.bin_frequencies(rate));

        assert!(summary.frames > 0);
        assert!((summary.centroid_hz - 1_000.0).abs() < 150.0, "{summary:?}");
        assert!(summary.rolloff_hz < 1_500.0, "{summary:?}");
        assert!(summary.harmonic_noise_ratio > 3.0, "{summary:?}");
    }

    #[test]
    fn noise_has_wide_spectrum_and_low_hnr() {
        let rate = 16_000;
        let stft = Stft::default();
        let frames = stft.analyze(&noise(16_000, 0.5));
        let summary = SpectralSummary::from_frames(&frames, &stft.bin_frequencies(rate));

        assert!(summary.centroid_hz > 3_000.0, "{summary:?}");
        assert!(summary.bandwidth_hz > 1_500.0, "{summary:?}");
        assert!(summary.harmonic_noise_ratio < 3.0, "{summary:?}");
    }

    #[test]
    fn silent_frames_are_skipped() {
        let stft = Stft::default();
        let frames = stft.analyze(&[0.0; 4_000]);
        let summary = SpectralSummary::from_frames(&frames, &stft.bin_frequencies(16_000));
        assert_eq!(summary, SpectralSummary::default());
    }
}
