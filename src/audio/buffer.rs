//! In-memory waveform and WAV persistence.
//!
//! Every stage in this crate consumes an [`AudioBuffer`] by reference and
//! returns a fresh one, so a buffer is never mutated once built.
//!
//! # Example
//!
//! ```rust
//! use voice_prep::audio::AudioBuffer;
//!
//! let buf = AudioBuffer::new(vec![0.0_f32; 22_050], 22_050);
//! assert!((buf.duration_secs() - 1.0).abs() < 1e-6);
//! assert_eq!(buf.peak(), 0.0);
//! ```

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::AudioError;

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// Mono `f32` samples in `[-1.0, 1.0]` plus their sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Mono samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap `samples` recorded at `sample_rate` Hz.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds; `0.0` when the sample rate is zero.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// Returns `true` when every sample is exactly zero (or there are none).
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// Check the invariants every analysis and refinement stage relies on:
    /// at least one sample, a non-zero sample rate, finite samples only.
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidAudio("sample rate must be > 0".into()));
        }
        if self.samples.is_empty() {
            return Err(AudioError::InvalidAudio("buffer is empty".into()));
        }
        if let Some(pos) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(AudioError::InvalidAudio(format!(
                "non-finite sample at index {pos}"
            )));
        }
        Ok(())
    }

    /// Copy of `samples[start..end]` at the same sample rate.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > self.len()`.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        Self::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// Load a WAV file, down-mixing to mono and scaling integer PCM to
    /// `[-1.0, 1.0]`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Self::new(
            downmix(&interleaved, spec.channels),
            spec.sample_rate,
        ))
    }

    /// Write the buffer as a mono 16-bit PCM WAV file.
    ///
    /// Samples outside `[-1.0, 1.0]` are clamped before quantisation.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        for &sample in &self.samples {
            let quantised = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(quantised)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// downmix
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// * `channels == 1` returns the samples unchanged.
/// * `channels == 0` returns an empty vector.
/// * A trailing partial frame is dropped.
///
/// ```rust
/// use voice_prep::audio::downmix;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
