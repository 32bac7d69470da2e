//! Leading and trailing silence removal.
//!
//! A sample counts as sound when its magnitude reaches
//! `peak · 10^(-threshold_db / 20)`, where `peak` is the buffer's own peak.
//! Everything before the first such sample and after the last one is
//! dropped. Because the kept range contains the peak, trimming twice gives
//! the same result as trimming once.

use crate::audio::AudioBuffer;

use super::normalize::db_to_amplitude;

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

/// Half-open `[start, end)` range of `samples` that survives trimming at
/// `threshold_db` below peak. `None` when nothing reaches the threshold
/// (empty or all-zero input).
pub fn sound_bounds(samples: &[f32], threshold_db: f32) -> Option<(usize, usize)> {
    let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    if peak <= 0.0 {
        return None;
    }

    let floor = peak * db_to_amplitude(-threshold_db.abs());
    let is_sound = |s: &f32| s.abs() >= floor;

    let start = samples.iter().position(is_sound)?;
    let end = samples.iter().rposition(is_sound)? + 1;
    Some((start, end))
}

/// Trim silence from both ends of `audio`.
///
/// Returns an empty buffer (same sample rate) when `audio` is all zeros.
///
/// # Example
///
/// ```rust
/// use voice_prep::audio::AudioBuffer;
/// use voice_prep::refine::trim_silence;
///
/// let mut samples = vec![0.0_f32; 480];
/// samples.extend(vec![0.5_f32; 480]);
/// samples.extend(vec![0.001_f32; 480]);
///
/// let trimmed = trim_silence(&AudioBuffer::new(samples, 16_000), 20.0);
/// assert_eq!(trimmed.len(), 480); // only the loud middle section
/// ```
pub fn trim_silence(audio: &AudioBuffer, threshold_db: f32) -> AudioBuffer {
    match sound_bounds(&audio.samples, threshold_db) {
        Some((start, end)) => {
            let removed = audio.len() - (end - start);
            if removed > 0 && audio.sample_rate > 0 {
                log::debug!(
                    "trim: removed {:.3}s ({} lead, {} tail samples)",
                    removed as f32 / audio.sample_rate as f32,
                    start,
                    audio.len() - end
                );
            }
            audio.slice(start, end)
        }
        None => AudioBuffer::new(Vec::new(), audio.sample_rate),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_signal(silent_pre: usize, voice: usize, silent_post: usize) -> AudioBuffer {
        let mut v = vec![0.0_f32; silent_pre];
        v.extend((0..voice).map(|i| if i % 2 == 0 { 0.5 } else { -0.4 }));
        v.extend(vec![0.0_f32; silent_post]);
        AudioBuffer::new(v, 16_000)
    }

    #[test]
    fn trims_leading_and_trailing_silence() {
        let trimmed = trim_silence(&make_signal(480, 480, 480), 20.0);
        assert_eq!(trimmed.len(), 480);
        assert_eq!(trimmed.samples[0], 0.5);
    }

    #[test]
    fn quiet_tail_below_threshold_is_dropped() {
        // 0.04 is 21.9 dB below 0.5; 0.06 is 18.4 dB below
        let audio = AudioBuffer::new(vec![0.04, 0.06, 0.5, 0.06, 0.04, 0.04], 16_000);
        let trimmed = trim_silence(&audio, 20.0);
        assert_eq!(trimmed.samples, vec![0.06, 0.5, 0.06]);
    }

    #[test]
    fn inner_silence_is_kept() {
        let mut samples = vec![0.5_f32; 10];
        samples.extend(vec![0.0; 100]);
        samples.extend(vec![0.5; 10]);
        let trimmed = trim_silence(&AudioBuffer::new(samples, 16_000), 20.0);
        assert_eq!(trimmed.len(), 120);
    }

    #[test]
    fn all_silence_returns_empty() {
        let trimmed = trim_silence(&AudioBuffer::new(vec![0.0; 1440], 16_000), 20.0);
        assert!(trimmed.is_empty());
        assert_eq!(trimmed.sample_rate, 16_000);
    }

    #[test]
    fn no_silence_returns_full_signal() {
        let audio = make_signal(0, 960, 0);
        assert_eq!(trim_silence(&audio, 20.0), audio);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(sound_bounds(&[], 20.0).is_none());
    }

    #[test]
    fn trimming_is_idempotent() {
        let samples: Vec<f32> = (0..4_000)
            .map(|i| {
                let env = (i as f32 / 4_000.0 * std::f32::consts::PI).sin().powi(4);
                (i as f32 * 0.3).sin() * env
            })
            .collect();
        let once = trim_silence(&AudioBuffer::new(samples, 16_000), 20.0);
        let twice = trim_silence(&once, 20.0);
        assert!(once.len() < 4_000);
        assert_eq!(once, twice);
    }
}
