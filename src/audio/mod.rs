//! Audio primitives: in-memory buffers, WAV I/O, STFT framing.
//!
//! # Pipeline
//!
//! ```text
//! WAV file → AudioBuffer::load (downmix, scale) → analysis / refine
//!          → AudioBuffer::save (16-bit PCM)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voice_prep::audio::AudioBuffer;
//!
//! let clip = AudioBuffer::load("reference.wav").unwrap();
//! println!("{} samples @ {} Hz", clip.len(), clip.sample_rate);
//! clip.save("copy.wav").unwrap();
//! ```

pub mod buffer;
pub mod error;
pub mod spectrum;

pub use buffer::{downmix, AudioBuffer};
pub use error::AudioError;
pub use spectrum::{Stft, FFT_SIZE, HOP_LENGTH};
