//! Reference-audio preparation for voice cloning.
//!
//! * [`analysis`]: quality scoring, filtering and ranking.
//! * [`audio`]: in-memory buffers, WAV I/O, STFT.
//! * [`refine`]: five-stage refinement of selected clips.
//! * [`synth`]: boundary to an external voice-cloning service.
//! * [`pipeline`]: directory-level batch jobs.
//! * [`config`]: TOML settings and platform paths.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod pipeline;
pub mod refine;
pub mod synth;
