//! Error type shared by the analysis and refinement stages.

use thiserror::Error;

use super::AudioBuffer;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Reason an audio buffer could not be analysed, refined or persisted.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The buffer is empty, has a zero sample rate, or holds non-finite
    /// samples.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// Refinement cannot continue (e.g. nothing is left after trimming).
    ///
    /// `original` is the caller's input buffer, untouched, so the caller can
    /// still fall back to the unrefined audio.
    #[error("unprocessable audio: {reason}")]
    UnprocessableAudio {
        reason: String,
        original: Box<AudioBuffer>,
    },

    /// The resampler could not be constructed or failed mid-stream.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// Reading or writing the WAV container failed.
    #[error("WAV I/O failed: {0}")]
    Wav(#[from] hound::Error),
}

impl AudioError {
    /// Take the unrefined input back out of an
    /// [`UnprocessableAudio`](AudioError::UnprocessableAudio) error.
    pub fn into_original(self) -> Option<AudioBuffer> {
        match self {
            AudioError::UnprocessableAudio { original, .. } => Some(*original),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprocessable_returns_original() {
        let original = AudioBuffer::new(vec![0.0; 4], 16_000);
        let err = AudioError::UnprocessableAudio {
            reason: "silent".into(),
            original: Box::new(original.clone()),
        };
        assert_eq!(err.to_string(), "unprocessable audio: silent");
        assert_eq!(err.into_original(), Some(original));
    }

    #[test]
    fn other_variants_have_no_original() {
        let err = AudioError::InvalidAudio("empty buffer".into());
        assert!(err.to_string().contains("empty buffer"));
        assert!(err.into_original().is_none());
    }
}
