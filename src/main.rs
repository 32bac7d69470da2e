//! Command-line entry point: voice-prep.
//!
//! # Startup sequence
//!
//! 1. Parse arguments.
//! 2. Initialise logging (`RUST_LOG`, default `info`).
//! 3. Load [`AppConfig`] (`--config FILE`, else the platform settings file).
//! 4. Create the [`tokio`] runtime.
//! 5. Run the selected subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use voice_prep::{
    analysis::{filter_ranked, rank, select_for_refinement, QualityAnalyzer, QualityReport},
    config::{AppConfig, AppPaths},
    pipeline::{
        analyze_paths, clone_batch, list_wav_files, refine_file, refine_selected, write_report,
    },
    refine::RefinementProcessor,
    synth::{EmotionControl, HttpSynthesizer, RetryingSynthesizer},
};

/// Entries printed by `analyze` after ranking.
const TOP_LISTED: usize = 10;
/// Report written next to the analysed clips when `--report` is omitted.
const DEFAULT_REPORT_NAME: &str = "quality_report.json";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(author, version, about = "Score, refine and clone voice reference clips")]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every WAV in a directory and write a JSON report
    Analyze {
        /// Directory of candidate clips
        dir: PathBuf,
        /// Report path (default: <DIR>/quality_report.json)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Refine a single clip
    Refine {
        /// Input WAV
        input: PathBuf,
        /// Output WAV
        output: PathBuf,
    },

    /// Analyze, select and refine the best clips of a directory
    Prepare {
        /// Directory of candidate clips
        dir: PathBuf,
        /// Output directory for refined clips
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the quality report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Synthesize texts in a cloned voice, once per emotion
    Clone {
        /// Reference WAV of the voice to clone
        #[arg(long)]
        reference: PathBuf,
        /// Text to speak (repeatable)
        #[arg(long, required = true)]
        text: Vec<String>,
        /// Emotion preset (repeatable; default: all presets)
        #[arg(long)]
        emotion: Vec<String>,
        /// Output directory for generated samples
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn analyze_dir(config: &AppConfig, dir: &Path) -> Result<Vec<(PathBuf, QualityReport)>> {
    let files = list_wav_files(dir)?;
    if files.is_empty() {
        bail!("no WAV files found in {}", dir.display());
    }
    log::info!("analyzing {} clips in {}", files.len(), dir.display());

    let analyzer = Arc::new(QualityAnalyzer::from_config(&config.analysis));
    Ok(analyze_paths(analyzer, files).await)
}

fn log_ranking(reports: &[(PathBuf, QualityReport)]) {
    let ranked = rank(reports.to_vec());
    log::info!("top {} by quality score:", TOP_LISTED.min(ranked.len()));
    for (i, (path, report)) in ranked.iter().take(TOP_LISTED).enumerate() {
        log::info!(
            "  {:2}. {:<40} score {:5.1}  {:5.1}s  snr {:5.1} dB  silence {:.2}",
            i + 1,
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            report.quality_score,
            report.duration_secs(),
            report.metrics.snr_db,
            report.silence_ratio()
        );
    }
}

async fn run_analyze(config: &AppConfig, dir: &Path, report: Option<PathBuf>) -> Result<()> {
    let reports = analyze_dir(config, dir).await?;
    log_ranking(&reports);

    let kept = filter_ranked(reports.clone(), &config.filter.thresholds);
    log::info!("{} of {} clips pass the quality filter", kept.len(), reports.len());

    let report_path = report.unwrap_or_else(|| dir.join(DEFAULT_REPORT_NAME));
    write_report(&report_path, &reports)
}

async fn run_prepare(
    config: &AppConfig,
    dir: &Path,
    out: PathBuf,
    report: Option<PathBuf>,
) -> Result<()> {
    let reports = analyze_dir(config, dir).await?;
    if let Some(path) = report {
        write_report(&path, &reports)?;
    }

    let selected =
        select_for_refinement(reports, &config.filter.thresholds, config.filter.top_n);
    log::info!("refining {} clips into {}", selected.len(), out.display());

    let processor = Arc::new(RefinementProcessor::from_config(&config.refinement));
    let written = refine_selected(processor, &selected, &out).await;
    log::info!("{} refined clips written", written.len());
    Ok(())
}

async fn run_clone(
    config: &AppConfig,
    reference: &Path,
    texts: &[String],
    emotion_names: Vec<String>,
    out: PathBuf,
) -> Result<()> {
    let names = if emotion_names.is_empty() {
        EmotionControl::PRESET_NAMES.iter().map(|n| n.to_string()).collect()
    } else {
        emotion_names
    };

    let strength = config.synthesis.emotion_strength;
    let emotions = names
        .into_iter()
        .map(|name| match EmotionControl::preset(&name, strength) {
            Some(control) => Ok((name.to_ascii_lowercase(), control)),
            None => bail!(
                "unknown emotion '{name}' (expected one of {})",
                EmotionControl::PRESET_NAMES.join(", ")
            ),
        })
        .collect::<Result<Vec<_>>>()?;

    let token = config.synthesis.resolve_token();
    if token.is_none() {
        log::warn!("no API token configured; sending unauthenticated requests");
    }
    let synth = RetryingSynthesizer::from_config(
        HttpSynthesizer::from_config(&config.synthesis, token),
        &config.synthesis,
    );

    let written = clone_batch(&synth, reference, texts, &emotions, &out).await?;
    log::info!(
        "{} of {} samples generated in {}",
        written.len(),
        texts.len() * emotions.len(),
        out.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Arguments
    let cli = Cli::parse();

    // 2. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 3. Configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e:#}); using defaults");
            AppConfig::default()
        }),
    };
    let paths = AppPaths::new();

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Dispatch
    rt.block_on(async {
        match cli.command {
            Command::Analyze { dir, report } => run_analyze(&config, &dir, report).await,
            Command::Refine { input, output } => {
                let processor = RefinementProcessor::from_config(&config.refinement);
                let outcome = tokio::task::spawn_blocking(move || {
                    refine_file(&processor, &input, &output).map(|o| (o, output))
                })
                .await
                .context("refine task failed")??;
                log::info!("{} written ({:?})", outcome.1.display(), outcome.0);
                Ok(())
            }
            Command::Prepare { dir, out, report } => {
                let out = out.unwrap_or_else(|| paths.refined_dir.clone());
                run_prepare(&config, &dir, out, report).await
            }
            Command::Clone {
                reference,
                text,
                emotion,
                out,
            } => {
                let out = out.unwrap_or_else(|| paths.samples_dir.clone());
                run_clone(&config, &reference, &text, emotion, out).await
            }
        }
    })
}
