//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for analysis,
//! filtering, refinement and synthesis, `AppPaths` for cross-platform data
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AnalysisConfig, AppConfig, FilterConfig, FilterThresholds, RefinementConfig, ScoreWeights,
    SynthesisConfig,
};
