//! Short-time Fourier analysis and weighted overlap-add resynthesis.
//!
//! Both the quality analyzer (spectral descriptors) and the spectral-gate
//! denoiser work on the same framing: a periodic Hann window of
//! [`FFT_SIZE`] samples advanced by [`HOP_LENGTH`], with the signal
//! zero-padded by half a window on each side so every input sample is
//! covered by full-weight frames.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Analysis window length in samples.
pub const FFT_SIZE: usize = 2048;
/// Frame advance in samples.
pub const HOP_LENGTH: usize = 512;

/// Window-sum values below this are treated as uncovered during overlap-add.
const WINDOW_SUM_EPSILON: f32 = 1e-8;

// ---------------------------------------------------------------------------
// Stft
// ---------------------------------------------------------------------------

/// Planned forward/inverse FFT pair plus the analysis window.
pub struct Stft {
    n_fft: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    /// Plan an STFT with the given window and hop sizes.
    ///
    /// # Panics
    ///
    /// Panics if `n_fft` or `hop` is zero, or `hop > n_fft`.
    pub fn new(n_fft: usize, hop: usize) -> Self {
        assert!(n_fft > 0 && hop > 0 && hop <= n_fft, "invalid STFT geometry");

        let mut planner = FftPlanner::<f32>::new();
        let window = (0..n_fft)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n_fft as f32).cos()))
            .collect();

        Self {
            n_fft,
            hop,
            window,
            forward: planner.plan_fft_forward(n_fft),
            inverse: planner.plan_fft_inverse(n_fft),
        }
    }

    /// Number of non-redundant frequency bins per frame (`n_fft / 2 + 1`).
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Frame advance in samples.
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Centre frequency in Hz of every bin at `sample_rate`.
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f32> {
        (0..self.n_bins())
            .map(|k| k as f32 * sample_rate as f32 / self.n_fft as f32)
            .collect()
    }

    /// Number of frames [`analyze`](Self::analyze) produces for `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        let padded = len + self.n_fft;
        (padded - self.n_fft).div_ceil(self.hop) + 1
    }

    /// Zero-padded copy of `samples` spanning exactly `frame_count` frames.
    fn pad(&self, samples: &[f32]) -> Vec<f32> {
        let frames = self.frame_count(samples.len());
        let total = (frames - 1) * self.hop + self.n_fft;
        let lead = self.n_fft / 2;

        let mut padded = vec![0.0_f32; total];
        padded[lead..lead + samples.len()].copy_from_slice(samples);
        padded
    }

    /// Complex half-spectrum (`n_bins` values) of each frame.
    pub fn analyze(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let padded = self.pad(samples);
        let frames = self.frame_count(samples.len());
        let n_bins = self.n_bins();

        let mut scratch = vec![Complex::new(0.0, 0.0); self.forward.get_inplace_scratch_len()];
        (0..frames)
            .map(|f| {
                let start = f * self.hop;
                let mut buf: Vec<Complex<f32>> = padded[start..start + self.n_fft]
                    .iter()
                    .zip(&self.window)
                    .map(|(&s, &w)| Complex::new(s * w, 0.0))
                    .collect();
                self.forward.process_with_scratch(&mut buf, &mut scratch);
                buf.truncate(n_bins);
                buf
            })
            .collect()
    }

    /// Rebuild `len` samples from half-spectra produced by
    /// [`analyze`](Self::analyze) (possibly modified).
    ///
    /// Frames are windowed again and overlap-added; the result is divided by
    /// the summed squared window so unmodified spectra reconstruct the input.
    pub fn synthesize(&self, frames: &[Vec<Complex<f32>>], len: usize) -> Vec<f32> {
        if frames.is_empty() {
            return vec![0.0; len];
        }

        let total = (frames.len() - 1) * self.hop + self.n_fft;
        let mut output = vec![0.0_f32; total];
        let mut window_sum = vec![0.0_f32; total];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.inverse.get_inplace_scratch_len()];
        let scale = 1.0 / self.n_fft as f32;

        for (f, half) in frames.iter().enumerate() {
            let mut full = vec![Complex::new(0.0, 0.0); self.n_fft];
            full[..half.len()].copy_from_slice(half);
            for k in 1..self.n_fft - half.len() + 1 {
                full[self.n_fft - k] = half[k].conj();
            }
            self.inverse.process_with_scratch(&mut full, &mut scratch);

            let start = f * self.hop;
            for (i, (c, &w)) in full.iter().zip(&self.window).enumerate() {
                output[start + i] += c.re * scale * w;
                window_sum[start + i] += w * w;
            }
        }

        for (out, &ws) in output.iter_mut().zip(&window_sum) {
            if ws > WINDOW_SUM_EPSILON {
                *out /= ws;
            }
        }

        let lead = self.n_fft / 2;
        let end = (lead + len).min(output.len());
        let mut result = output[lead..end].to_vec();
        result.resize(len, 0.0);
        result
    }
}

impl Default for Stft {
    fn default() -> Self {
        Self::new(FFT_SIZE, HOP_LENGTH)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
