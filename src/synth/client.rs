//! Core `VoiceSynthesizer` trait and `HttpSynthesizer` implementation.
//!
//! `HttpSynthesizer` uploads the reference WAV to `{base_url}/synthesize`
//! and returns the generated WAV bytes. All connection details come from
//! [`SynthesisConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::config::SynthesisConfig;

use super::emotion::EmotionControl;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can occur while cloning a voice.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered successfully but sent no audio.
    #[error("service returned an empty response")]
    EmptyResponse,

    /// The emotion weights or strength are out of range.
    #[error("invalid emotion control: {0}")]
    InvalidEmotion(String),
}

impl SynthesisError {
    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SynthesisError::InvalidEmotion(_))
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisRequest
// ---------------------------------------------------------------------------

/// One cloning job: reference audio, what to say, and how to say it.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Complete WAV file of the reference voice.
    pub reference_wav: Vec<u8>,
    /// Text to speak.
    pub text: String,
    /// Emotion steering.
    pub emotion: EmotionControl,
}

// ---------------------------------------------------------------------------
// VoiceSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for voice-cloning backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn VoiceSynthesizer>`).
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// Generate speech for `request`, returning WAV bytes.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError>;
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Talks to a hosted cloning service over HTTP.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    config: SynthesisConfig,
    token: Option<String>,
}

impl HttpSynthesizer {
    /// Build a client from config and an already-resolved token.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`. If the builder fails a default client is used.
    pub fn from_config(config: &SynthesisConfig, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Endpoint URL for synthesis.
    pub fn endpoint(&self) -> String {
        format!("{}/synthesize", self.config.base_url.trim_end_matches('/'))
    }

    /// Query parameters describing `request`.
    pub fn query_params(&self, request: &SynthesisRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("text".to_string(), request.text.clone()),
            ("language".to_string(), self.config.language.clone()),
            (
                "emo_control_method".to_string(),
                request.emotion.method_label().to_string(),
            ),
            (
                "max_text_tokens".to_string(),
                self.config.max_text_tokens.to_string(),
            ),
        ];

        if let EmotionControl::Vectors { weights, strength } = &request.emotion {
            params.push(("emotion_weight".to_string(), strength.to_string()));
            for (name, weight) in weights.entries() {
                params.push((format!("vec_{name}"), weight.to_string()));
            }
        }
        params
    }

    /// Assemble the HTTP request without sending it.
    ///
    /// The `Authorization: Bearer <token>` header is attached only for a non-empty
    /// token.
    pub fn build_request(
        &self,
        request: &SynthesisRequest,
    ) -> Result<reqwest::Request, SynthesisError> {
        let mut req = self
            .client
            .post(self.endpoint())
            .query(&self.query_params(request))
            .header(CONTENT_TYPE, "audio/wav")
            .body(request.reference_wav.clone());

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req.build()?)
    }
}

#[async_trait]
impl VoiceSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        request.emotion.validate()?;

        let http_request = self.build_request(request)?;
        log::debug!(
            "synth: POST {} ({} reference bytes, {} chars)",
            http_request.url().path(),
            request.reference_wav.len(),
            request.text.chars().count()
        );

        let response = self.client.execute(http_request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
