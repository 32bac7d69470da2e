//! Quality analysis of reference clips.
//!
//! This module provides:
//! * [`QualityAnalyzer`]: measures a buffer and produces a [`QualityReport`].
//! * [`score`]: composite score formula and its named weights.
//! * [`metrics`]: time- and frequency-domain descriptors.
//! * [`filter_ranked`] / [`select_for_refinement`]: threshold filtering
//!   and stable descending ranking.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_prep::analysis::{filter_ranked, QualityAnalyzer};
//! use voice_prep::audio::AudioBuffer;
//! use voice_prep::config::AppConfig;
//!
//! let config = AppConfig::default();
//! let analyzer = QualityAnalyzer::from_config(&config.analysis);
//!
//! let clip = AudioBuffer::load("sample.wav").unwrap();
//! let report = analyzer.analyze(&clip).unwrap();
//!
//! let kept = filter_ranked(vec![(clip, report)], &config.filter.thresholds);
//! println!("{} clip(s) kept", kept.len());
//! ```

pub mod analyzer;
pub mod filter;
pub mod metrics;
pub mod score;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use analyzer::{QualityAnalyzer, QualityMetrics, QualityReport};
pub use filter::{filter_ranked, rank, select_for_refinement};
pub use metrics::SpectralSummary;
