//! Best-segment extraction.
//!
//! Slides a window of the target length across the buffer one sample at a
//! time and keeps the window with the greatest energy (sum of squares).
//! Window energies come from a running prefix sum in `f64`, so the search
//! is linear in the buffer length.

use crate::audio::AudioBuffer;

/// Relative tolerance under which two window energies count as equal.
pub const ENERGY_TIE_TOLERANCE: f64 = 1e-9;

/// Start offset of the highest-energy window of `window` samples.
///
/// Ties go to the earliest window. Returns `0` when `window` is zero or not
/// shorter than `samples`.
pub fn best_segment_offset(samples: &[f32], window: usize) -> usize {
    if window == 0 || window >= samples.len() {
        return 0;
    }

    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0_f64);
    let mut acc = 0.0_f64;
    for &s in samples {
        acc += f64::from(s) * f64::from(s);
        prefix.push(acc);
    }

    let mut best_offset = 0;
    let mut best_energy = prefix[window];
    for start in 1..=samples.len() - window {
        let energy = prefix[start + window] - prefix[start];
        let margin = ENERGY_TIE_TOLERANCE * best_energy.abs().max(f64::MIN_POSITIVE);
        if energy > best_energy + margin {
            best_energy = energy;
            best_offset = start;
        }
    }
    best_offset
}

/// Cut the most energetic `segment_secs` of `audio`.
///
/// Buffers no longer than the target are returned unchanged.
///
/// ```rust
/// use voice_prep::audio::AudioBuffer;
/// use voice_prep::refine::extract_best_segment;
///
/// let mut samples = vec![0.01_f32; 300];
/// samples[200..250].fill(0.8);
/// let audio = AudioBuffer::new(samples, 100);
///
/// let best = extract_best_segment(&audio, 1.0);
/// assert_eq!(best.len(), 100);
/// assert!(best.samples.iter().filter(|&&s| s == 0.8).count() == 50);
/// ```
pub fn extract_best_segment(audio: &AudioBuffer, segment_secs: f32) -> AudioBuffer {
    let window = (segment_secs.max(0.0) * audio.sample_rate as f32).round() as usize;
    if window == 0 || audio.len() <= window {
        return audio.clone();
    }

    let offset = best_segment_offset(&audio.samples, window);
    log::debug!(
        "segment: {:.2}s window at {:.2}s of {:.2}s",
        window as f32 / audio.sample_rate as f32,
        offset as f32 / audio.sample_rate as f32,
        audio.duration_secs()
    );
    audio.slice(offset, offset + window)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
