//! Spectral-gate noise reduction.
//!
//! ## Algorithm
//!
//! 1. STFT with [`FFT_SIZE`]/[`HOP_LENGTH`] Hann framing.
//! 2. Per-bin noise floor: the median magnitude over the frames that fall
//!    inside the leading noise window. When that window holds no frames, or
//!    covers every frame, the 10th percentile over all frames is used.
//! 3. Bins whose magnitude does not exceed `GATE_RATIO × floor` are scaled
//!    by [`ATTENUATION`]; phase is kept.
//! 4. Inverse STFT by weighted overlap-add, cut to the input length.
//!
//! [`FFT_SIZE`]: crate::audio::FFT_SIZE
//! [`HOP_LENGTH`]: crate::audio::HOP_LENGTH

use crate::audio::{AudioBuffer, Stft};

/// A bin is kept when its magnitude exceeds this multiple of the floor.
pub const GATE_RATIO: f32 = 2.0;
/// Gain applied to gated bins.
pub const ATTENUATION: f32 = 0.1;
/// Percentile used for the fallback noise floor.
pub const FALLBACK_PERCENTILE: f32 = 10.0;

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn median(values: &mut [f32]) -> f32 {
    percentile(values, 50.0)
}

/// Linear-interpolated percentile (`q` in `[0, 100]`). Sorts `values`.
fn percentile(values: &mut [f32], q: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let pos = (q / 100.0).clamp(0.0, 1.0) * (values.len() - 1) as f32;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f32;
    values[lo] + (values[hi] - values[lo]) * frac
}

/// Per-bin noise floor from a magnitude matrix (`frames × bins`).
pub fn noise_floor(magnitudes: &[Vec<f32>], noise_frames: usize) -> Vec<f32> {
    let Some(first) = magnitudes.first() else {
        return Vec::new();
    };
    let n_bins = first.len();
    let use_window = noise_frames > 0 && noise_frames < magnitudes.len();

    (0..n_bins)
        .map(|k| {
            if use_window {
                let mut column: Vec<f32> = magnitudes[..noise_frames].iter().map(|f| f[k]).collect();
                median(&mut column)
            } else {
                let mut column: Vec<f32> = magnitudes.iter().map(|f| f[k]).collect();
                percentile(&mut column, FALLBACK_PERCENTILE)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SpectralGate
// ---------------------------------------------------------------------------

/// Spectral gate bound to one STFT plan.
pub struct SpectralGate {
    stft: Stft,
    /// Leading window (seconds) used to estimate the noise floor.
    pub noise_window_secs: f32,
}

impl SpectralGate {
    pub fn new(noise_window_secs: f32) -> Self {
        Self {
            stft: Stft::default(),
            noise_window_secs,
        }
    }

    /// Number of leading frames treated as noise at `sample_rate`.
    fn noise_frames(&self, sample_rate: u32) -> usize {
        (self.noise_window_secs.max(0.0) * sample_rate as f32 / self.stft.hop() as f32) as usize
    }

    /// Denoise `audio`. The output has the same length and sample rate.
    pub fn apply(&self, audio: &AudioBuffer) -> AudioBuffer {
        if audio.is_empty() {
            return audio.clone();
        }

        let mut frames = self.stft.analyze(&audio.samples);
        let magnitudes: Vec<Vec<f32>> = frames
            .iter()
            .map(|f| f.iter().map(|c| c.norm()).collect())
            .collect();

        let noise_frames = self.noise_frames(audio.sample_rate);
        let floor = noise_floor(&magnitudes, noise_frames);

        let mut gated = 0usize;
        for (frame, mags) in frames.iter_mut().zip(&magnitudes) {
            for ((bin, &mag), &fl) in frame.iter_mut().zip(mags).zip(&floor) {
                if mag <= GATE_RATIO * fl {
                    *bin *= ATTENUATION;
                    gated += 1;
                }
            }
        }

        let total_bins = frames.len() * self.stft.n_bins();
        log::debug!(
            "denoise: {}/{} bins gated ({} noise frames)",
            gated,
            total_bins,
            noise_frames
        );

        AudioBuffer::new(
            self.stft.synthesize(&frames, audio.len()),
            audio.sample_rate,
        )
    }
}

/// Convenience wrapper: build a [`SpectralGate`] and apply it once.
pub fn spectral_gate(audio: &AudioBuffer, noise_window_secs: f32) -> AudioBuffer {
    SpectralGate::new(noise_window_secs).apply(audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
