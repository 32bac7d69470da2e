//! Refinement of selected reference clips.
//!
//! | Stage | Function |
//! |-------|----------|
//! | 1. Normalize | [`normalize_peak`] |
//! | 2. Trim silence | [`trim_silence`] |
//! | 3. Denoise | [`spectral_gate`] / [`SpectralGate`] |
//! | 4. Resample | [`resample`] |
//! | 5. Best segment | [`extract_best_segment`] |
//!
//! [`RefinementProcessor`] runs the stages in this order with the values from
//! [`RefinementConfig`](crate::config::RefinementConfig).

pub mod denoise;
pub mod normalize;
pub mod processor;
pub mod resample;
pub mod segment;
pub mod trim;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use denoise::{spectral_gate, SpectralGate};
pub use normalize::{db_to_amplitude, normalize_peak};
pub use processor::RefinementProcessor;
pub use resample::resample;
pub use segment::{best_segment_offset, extract_best_segment};
pub use trim::trim_silence;
