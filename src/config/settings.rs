//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to worker
//! threads by value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::analysis::score;

// ---------------------------------------------------------------------------
// ScoreWeights
// ---------------------------------------------------------------------------

/// Points each normalized metric contributes to the composite quality score.
///
/// The defaults split 100 points evenly across the four components; any
/// non-negative weights are accepted and the composite is clipped to
/// `[0, 100]` regardless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight of the duration term (full marks at 10 s).
    pub duration: f32,
    /// Weight of the SNR term (full marks at 30 dB).
    pub snr: f32,
    /// Weight of the clarity (harmonic-to-noise) term.
    pub clarity: f32,
    /// Weight of the completeness (`1 - silence_ratio`) term.
    pub completeness: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            duration: score::DURATION_WEIGHT,
            snr: score::SNR_WEIGHT,
            clarity: score::CLARITY_WEIGHT,
            completeness: score::COMPLETENESS_WEIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Settings for the quality analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Length in seconds of the leading segment assumed to hold only
    /// background noise when estimating SNR.
    pub noise_window_secs: f32,
    /// Composite score weights.
    pub weights: ScoreWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            noise_window_secs: 0.5,
            weights: ScoreWeights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterThresholds
// ---------------------------------------------------------------------------

/// Thresholds a clip must meet to be kept by the quality filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    /// Minimum composite score (inclusive).
    pub min_score: f32,
    /// Minimum duration in seconds (inclusive).
    pub min_duration_secs: f32,
    /// Maximum silence ratio (inclusive).
    pub max_silence_ratio: f32,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_score: 60.0,
            min_duration_secs: 5.0,
            max_silence_ratio: 0.4,
        }
    }
}

/// Filter thresholds plus how many clips go on to refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Thresholds applied to every analysed clip.
    pub thresholds: FilterThresholds,
    /// Maximum number of clips refined; also the size of the fallback set
    /// when no clip passes the thresholds.
    pub top_n: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            thresholds: FilterThresholds::default(),
            top_n: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// RefinementConfig
// ---------------------------------------------------------------------------

/// Parameters of the five-stage refinement chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    /// Peak level after normalisation, in dBFS (e.g. `-3.0`).
    pub target_peak_db: f32,
    /// Samples quieter than this many dB below peak are trimmed from the
    /// ends.
    pub silence_threshold_db: f32,
    /// Leading window in seconds used to estimate the noise floor.
    pub noise_window_secs: f32,
    /// Output sample rate in Hz.
    pub target_sample_rate: u32,
    /// Duration in seconds of the extracted best segment.
    pub segment_secs: f32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            target_peak_db: -3.0,
            silence_threshold_db: 20.0,
            noise_window_secs: 0.5,
            target_sample_rate: 22_050,
            segment_secs: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisConfig
// ---------------------------------------------------------------------------

/// Connection settings for the external voice-cloning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Base URL of the service; requests go to `{base_url}/synthesize`.
    pub base_url: String,
    /// Bearer token. `None` falls back to `HF_TOKEN` /
    /// `HUGGINGFACE_HUB_TOKEN` at startup.
    pub api_token: Option<String>,
    /// Language code sent with every request.
    pub language: String,
    /// Maximum seconds to wait for one synthesis response.
    pub timeout_secs: u64,
    /// Total attempts per request (1 = no retry).
    pub max_retries: u32,
    /// Seconds to wait between attempts.
    pub retry_delay_secs: u64,
    /// Overall strength applied to emotion vectors (0.0 – 1.0).
    pub emotion_strength: f32,
    /// Maximum text tokens per generated segment.
    pub max_text_tokens: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".into(),
            api_token: None,
            language: "en".into(),
            timeout_secs: 300,
            max_retries: 3,
            retry_delay_secs: 30,
            emotion_strength: 0.8,
            max_text_tokens: 120,
        }
    }
}

impl SynthesisConfig {
    /// Environment variables consulted, in order, when `api_token` is unset.
    pub const TOKEN_ENV_VARS: [&'static str; 2] = ["HF_TOKEN", "HUGGINGFACE_HUB_TOKEN"];

    /// The configured token, or the first non-empty token environment
    /// variable.
    pub fn resolve_token(&self) -> Option<String> {
        self.resolve_token_with(|name| std::env::var(name).ok())
    }

    /// [`resolve_token`](Self::resolve_token) with an injectable lookup.
    pub fn resolve_token_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                Self::TOKEN_ENV_VARS
                    .iter()
                    .filter_map(|name| lookup(name))
                    .find(|t| !t.is_empty())
            })
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_prep::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Quality analyzer settings.
    pub analysis: AnalysisConfig,
    /// Quality filter settings.
    pub filter: FilterConfig,
    /// Refinement chain settings.
    pub refinement: RefinementConfig,
    /// Voice-cloning service settings.
    pub synthesis: SynthesisConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
