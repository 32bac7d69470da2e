//! Retry wrapper: re-issues failed synthesis calls after a fixed delay.
//!
//! Hosted cloning services cold-start and queue, so a first call often
//! fails with a timeout or a 5xx. [`RetryingSynthesizer`] makes up to
//! `max_attempts` calls in total and sleeps `delay` between them. Errors
//! that cannot succeed on retry ([`SynthesisError::InvalidEmotion`]) are
//! returned immediately.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::SynthesisConfig;

use super::client::{SynthesisError, SynthesisRequest, VoiceSynthesizer};

// ---------------------------------------------------------------------------
// RetryingSynthesizer
// ---------------------------------------------------------------------------

/// Wraps any [`VoiceSynthesizer`] with fixed-delay retries.
///
/// # Example
/// ```rust
/// use voice_prep::config::SynthesisConfig;
/// use voice_prep::synth::{HttpSynthesizer, RetryingSynthesizer};
///
/// let config = SynthesisConfig::default();
/// let inner = HttpSynthesizer::from_config(&config, None);
/// let synth = RetryingSynthesizer::from_config(inner, &config);
/// assert_eq!(synth.max_attempts(), 3);
/// ```
pub struct RetryingSynthesizer<S: VoiceSynthesizer> {
    inner: S,
    max_attempts: u32,
    delay: Duration,
}

impl<S: VoiceSynthesizer> RetryingSynthesizer<S> {
    /// Wrap `inner`. `max_attempts` is clamped to at least 1.
    pub fn new(inner: S, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Wrap `inner` with the retry settings from `config`.
    pub fn from_config(inner: S, config: &SynthesisConfig) -> Self {
        Self::new(
            inner,
            config.max_retries,
            Duration::from_secs(config.retry_delay_secs),
        )
    }

    /// Total attempts per request.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Return a reference to the wrapped synthesizer.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: VoiceSynthesizer> VoiceSynthesizer for RetryingSynthesizer<S> {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        let mut attempt = 1;
        loop {
            match self.inner.synthesize(request).await {
                Ok(audio) => return Ok(audio),
                Err(err) if !err.is_retryable() || attempt >= self.max_attempts => {
                    return Err(err);
                }
                Err(err) => {
                    log::warn!(
                        "synth: attempt {}/{} failed ({err}), retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
