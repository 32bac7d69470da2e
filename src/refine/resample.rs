//! Band-limited sample-rate conversion.
//!
//! Uses rubato's `SincFixedIn` with a Blackman-Harris windowed sinc. The
//! output is time-aligned with the input and exactly
//! `round(len · target / source)` samples long; the tail is flushed by
//! feeding zeros past the end of the input.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::audio::{AudioBuffer, AudioError};

/// Input frames fed to rubato per call.
const CHUNK_SIZE: usize = 1024;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Output length for `len` input samples converted by `ratio`.
pub fn expected_len(len: usize, ratio: f64) -> usize {
    (len as f64 * ratio).round() as usize
}

/// Resample `audio` to `target_rate`.
///
/// * Equal rates return a clone with no processing.
/// * An empty buffer returns an empty buffer at `target_rate`.
/// * A zero target rate fails with [`AudioError::Resample`].
///
/// # Example
///
/// ```rust
/// use voice_prep::audio::AudioBuffer;
/// use voice_prep::refine::resample;
///
/// let audio = AudioBuffer::new(vec![0.0; 44_100], 44_100);
/// let out = resample(&audio, 22_050).unwrap();
/// assert_eq!(out.sample_rate, 22_050);
/// assert_eq!(out.len(), 22_050);
/// ```
pub fn resample(audio: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer, AudioError> {
    if audio.sample_rate == target_rate {
        return Ok(audio.clone());
    }
    if target_rate == 0 || audio.sample_rate == 0 {
        return Err(AudioError::Resample(format!(
            "cannot resample {} Hz -> {} Hz",
            audio.sample_rate, target_rate
        )));
    }
    if audio.is_empty() {
        return Ok(AudioBuffer::new(Vec::new(), target_rate));
    }

    let ratio = target_rate as f64 / audio.sample_rate as f64;
    let expected = expected_len(audio.len(), ratio);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);
    let mut pos = 0;

    // Keep feeding (zeros past the end) until the tail is flushed.
    while output.len() < expected {
        let end = (pos + CHUNK_SIZE).min(audio.len());
        let mut chunk = if pos < end {
            audio.samples[pos..end].to_vec()
        } else {
            Vec::new()
        };
        chunk.resize(CHUNK_SIZE, 0.0);
        let input = vec![chunk];

        let result = resampler
            .process(&input, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        let produced = result.first().map_or(0, Vec::len);
        if produced == 0 && pos >= audio.len() {
            break;
        }
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
        pos += CHUNK_SIZE;
    }

    output.truncate(expected);
    output.resize(expected, 0.0);
    let samples = output;

    log::debug!(
        "resample: {} Hz -> {} Hz ({} -> {} samples)",
        audio.sample_rate,
        target_rate,
        audio.len(),
        samples.len()
    );
    Ok(AudioBuffer::new(samples, target_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(len: usize, freq: f32, rate: u32) -> AudioBuffer {
        AudioBuffer::new(
            (0..len)
                .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin() * 0.5)
                .collect(),
            rate,
        )
    }

    #[test]
    fn same_rate_is_noop() {
        let audio = tone(1_000, 440.0, 22_050);
        let out = resample(&audio, 22_050).unwrap();
        assert_eq!(out, audio);
    }

    #[test]
    fn empty_input() {
        let out = resample(&AudioBuffer::new(Vec::new(), 48_000), 22_050).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate, 22_050);
    }

    #[test]
    fn zero_target_rate_is_an_error() {
        let err = resample(&tone(100, 440.0, 16_000), 0).unwrap_err();
        assert!(matches!(err, AudioError::Resample(_)), "{err}");
    }

    #[test]
    fn output_length_is_rounded_ratio() {
        let cases = [(48_000, 22_050, 4_800), (16_000, 22_050, 1_600), (44_100, 22_050, 12_345)];
        for (from, to, len) in cases {
            let out = resample(&tone(len, 440.0, from), to).unwrap();
            let want = expected_len(len, to as f64 / from as f64);
            assert_eq!(out.len(), want, "{from} -> {to}");
        }
    }

    #[test]
    fn round_trip_preserves_length_within_one_sample() {
        let original = tone(22_050, 440.0, 22_050);
        let down = resample(&original, 16_000).unwrap();
        let back = resample(&down, 22_050).unwrap();
        assert!(
            back.len().abs_diff(original.len()) <= 1,
            "{} vs {}",
            back.len(),
            original.len()
        );
    }

    #[test]
    fn tone_is_time_aligned() {
        // The tone should line up with a freshly generated one at the
        // target rate.
        let out = resample(&tone(48_000, 100.0, 48_000), 22_050).unwrap();
        let reference = tone(out.len(), 100.0, 22_050);
        let mid = out.len() / 2;
        let err: f32 = out.samples[mid..mid + 1_000]
            .iter()
            .zip(&reference.samples[mid..mid + 1_000])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max);
        assert!(err < 0.05, "max error {err}");
    }

    #[test]
    fn impulse_keeps_its_position() {
        for (from, to) in [(48_000, 22_050), (16_000, 22_050), (22_050, 16_000)] {
            let mut samples = vec![0.0; from as usize];
            samples[from as usize / 2] = 1.0;
            let out = resample(&AudioBuffer::new(samples, from), to).unwrap();

            let (peak_at, _) = out
                .samples
                .iter()
                .enumerate()
                .fold((0, 0.0_f32), |best, (i, s)| {
                    if s.abs() > best.1 {
                        (i, s.abs())
                    } else {
                        best
                    }
                });
            let want = (from / 2) as f64 * to as f64 / from as f64;
            assert!(
                (peak_at as f64 - want).abs() <= 2.0,
                "{from} -> {to}: impulse at {peak_at}, want ~{want}"
            );
        }
    }
}
