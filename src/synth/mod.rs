//! Voice-cloning boundary.
//!
//! This module provides:
//! * [`VoiceSynthesizer`]: async trait implemented by all cloning backends.
//! * [`HttpSynthesizer`]: uploads the reference WAV to a hosted service.
//! * [`RetryingSynthesizer`]: wraps any synthesizer with fixed-delay retries.
//! * [`EmotionControl`] / [`EmotionVector`]: emotion steering and presets.
//! * [`SynthesisError`]: error variants for synthesis calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_prep::config::AppConfig;
//! use voice_prep::synth::{
//!     EmotionControl, HttpSynthesizer, RetryingSynthesizer, SynthesisRequest, VoiceSynthesizer,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default().synthesis;
//!     let token = config.resolve_token();
//!     let synth = RetryingSynthesizer::from_config(
//!         HttpSynthesizer::from_config(&config, token),
//!         &config,
//!     );
//!
//!     let request = SynthesisRequest {
//!         reference_wav: std::fs::read("refined_top1_clip.wav").unwrap(),
//!         text: "Hello from a cloned voice.".into(),
//!         emotion: EmotionControl::preset("happy", config.emotion_strength).unwrap(),
//!     };
//!     let wav = synth.synthesize(&request).await.unwrap();
//!     std::fs::write("sample_01_happy.wav", wav).unwrap();
//! }
//! ```

pub mod client;
pub mod emotion;
pub mod retry;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{HttpSynthesizer, SynthesisError, SynthesisRequest, VoiceSynthesizer};
pub use emotion::{EmotionControl, EmotionVector};
pub use retry::RetryingSynthesizer;
