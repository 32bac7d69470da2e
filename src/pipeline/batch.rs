//! Directory-level batch jobs: analyze, refine, clone.
//!
//! Per-file work is CPU-bound, so each file is handed to
//! `tokio::task::spawn_blocking`. Handles are awaited in submission order,
//! which keeps results in input order without any shared state. A file
//! that fails is logged and skipped; it never aborts the batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::{QualityAnalyzer, QualityReport};
use crate::audio::{AudioBuffer, AudioError};
use crate::refine::RefinementProcessor;
use crate::synth::{EmotionControl, SynthesisRequest, VoiceSynthesizer};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// `.wav` files (any case) directly inside `dir`, sorted by path.
pub fn list_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_wav(path))
        .collect();
    files.sort();
    Ok(files)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string())
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Load and score every file in `paths`, in order. Unreadable or invalid
/// files are logged and left out.
pub async fn analyze_paths(
    analyzer: Arc<QualityAnalyzer>,
    paths: Vec<PathBuf>,
) -> Vec<(PathBuf, QualityReport)> {
    let total = paths.len();
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let analyzer = Arc::clone(&analyzer);
            tokio::task::spawn_blocking(move || {
                let result = AudioBuffer::load(&path).and_then(|audio| analyzer.analyze(&audio));
                (path, result)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(total);
    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok((path, Ok(report))) => {
                log::info!(
                    "analyze [{}/{}] {}: score {:.1}",
                    i + 1,
                    total,
                    file_name(&path),
                    report.quality_score
                );
                reports.push((path, report));
            }
            Ok((path, Err(e))) => {
                log::warn!("analyze [{}/{}] {}: skipped ({e})", i + 1, total, file_name(&path));
            }
            Err(e) => log::warn!("analyze [{}/{}]: task failed: {e}", i + 1, total),
        }
    }
    reports
}

/// Write `reports` as pretty JSON mapping file name to report.
pub fn write_report(path: &Path, reports: &[(PathBuf, QualityReport)]) -> Result<()> {
    let map: BTreeMap<String, &QualityReport> = reports
        .iter()
        .map(|(file, report)| (file_name(file), report))
        .collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&map).context("failed to serialise report")?;
    std::fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("report: {} entries written to {}", map.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Refinement
// ---------------------------------------------------------------------------

/// What happened to one refined file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    /// All five stages ran.
    Refined,
    /// Nothing survived trimming; the input was saved unchanged.
    KeptOriginal,
}

/// Refine `input` and save the result to `output`.
///
/// An unprocessable clip is written out unrefined so downstream steps
/// still have a reference.
pub fn refine_file(
    processor: &RefinementProcessor,
    input: &Path,
    output: &Path,
) -> Result<RefineOutcome> {
    let audio = AudioBuffer::load(input).with_context(|| format!("cannot load {}", input.display()))?;

    let (refined, outcome) = match processor.process(&audio) {
        Ok(refined) => (refined, RefineOutcome::Refined),
        Err(AudioError::UnprocessableAudio { reason, original }) => {
            log::warn!("refine {}: {reason}; keeping original", file_name(input));
            (*original, RefineOutcome::KeptOriginal)
        }
        Err(e) => {
            return Err(e).with_context(|| format!("cannot refine {}", input.display()));
        }
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    refined
        .save(output)
        .with_context(|| format!("cannot write {}", output.display()))?;
    Ok(outcome)
}

/// Output name for the clip ranked `rank` (1-based).
pub fn refined_name(rank: usize, source: &Path) -> String {
    format!("refined_top{rank}_{}.wav", file_stem(source))
}

/// Refine the ranked `selected` clips into `out_dir`, returning the written
/// paths in rank order.
pub async fn refine_selected(
    processor: Arc<RefinementProcessor>,
    selected: &[(PathBuf, QualityReport)],
    out_dir: &Path,
) -> Vec<PathBuf> {
    let handles: Vec<_> = selected
        .iter()
        .enumerate()
        .map(|(i, (input, _))| {
            let processor = Arc::clone(&processor);
            let input = input.clone();
            let output = out_dir.join(refined_name(i + 1, &input));
            tokio::task::spawn_blocking(move || {
                let result = refine_file(&processor, &input, &output);
                (input, output, result)
            })
        })
        .collect();

    let mut written = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((input, output, Ok(outcome))) => {
                log::info!(
                    "refine {} -> {} ({:?})",
                    file_name(&input),
                    file_name(&output),
                    outcome
                );
                written.push(output);
            }
            Ok((input, _, Err(e))) => log::warn!("refine {}: skipped ({e:#})", file_name(&input)),
            Err(e) => log::warn!("refine: task failed: {e}"),
        }
    }
    written
}

// ---------------------------------------------------------------------------
// Cloning
// ---------------------------------------------------------------------------

/// Output name for text `index` (1-based) spoken with `emotion`.
pub fn sample_name(index: usize, emotion: &str) -> String {
    format!("sample_{index:02}_{emotion}.wav")
}

/// Synthesize every text with every named emotion, sequentially.
///
/// Failed requests are logged and skipped. Returns the written paths.
pub async fn clone_batch(
    synth: &dyn VoiceSynthesizer,
    reference: &Path,
    texts: &[String],
    emotions: &[(String, EmotionControl)],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let reference_wav = tokio::fs::read(reference)
        .await
        .with_context(|| format!("cannot read reference {}", reference.display()))?;
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (i, text) in texts.iter().enumerate() {
        for (name, emotion) in emotions {
            let output = out_dir.join(sample_name(i + 1, name));
            let request = SynthesisRequest {
                reference_wav: reference_wav.clone(),
                text: text.clone(),
                emotion: emotion.clone(),
            };

            let started = std::time::Instant::now();
            match synth.synthesize(&request).await {
                Ok(wav) => {
                    tokio::fs::write(&output, &wav)
                        .await
                        .with_context(|| format!("cannot write {}", output.display()))?;
                    log::info!(
                        "clone {}: {} bytes in {:.1}s",
                        file_name(&output),
                        wav.len(),
                        started.elapsed().as_secs_f32()
                    );
                    written.push(output);
                }
                Err(e) => log::warn!("clone {}: failed ({e})", file_name(&output)),
            }
        }
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::SynthesisError;
    use async_trait::async_trait;
    use std::f32::consts::PI;

    const RATE: u32 = 16_000;

    fn write_tone(path: &Path, secs: f32, amp: f32) {
        let len = (secs * RATE as f32) as usize;
        let samples = (0..len)
            .map(|i| (2.0 * PI * 220.0 * i as f32 / RATE as f32).sin() * amp)
            .collect();
        AudioBuffer::new(samples, RATE).save(path).unwrap();
    }

    #[test]
    fn lists_only_wav_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(&dir.path().join("b.wav"), 0.1, 0.3);
        write_tone(&dir.path().join("a.WAV"), 0.1, 0.3);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested.wav")).unwrap();

        let files = list_wav_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["a.WAV", "b.wav"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_wav_files(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn analysis_keeps_order_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = dir.path().join("a.wav");
        let bad = dir.path().join("b.wav");
        let good_c = dir.path().join("c.wav");
        write_tone(&good_a, 1.0, 0.5);
        std::fs::write(&bad, b"not a wav").unwrap();
        write_tone(&good_c, 2.0, 0.5);

        let reports = analyze_paths(
            Arc::new(QualityAnalyzer::default()),
            vec![good_a.clone(), bad, good_c.clone()],
        )
        .await;

        let paths: Vec<_> = reports.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(paths, vec![good_a, good_c]);
        assert!(reports[1].1.duration_secs() > reports[0].1.duration_secs());
    }

    #[tokio::test]
    async fn report_maps_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        write_tone(&clip, 0.5, 0.5);
        let reports = analyze_paths(Arc::new(QualityAnalyzer::default()), vec![clip]).await;

        let out = dir.path().join("reports").join("quality.json");
        write_report(&out, &reports).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(json["clip.wav"]["quality_score"].is_number());
        assert!(json["clip.wav"]["silence_ratio"].is_number());
    }

    #[test]
    fn output_names() {
        assert_eq!(refined_name(2, Path::new("/x/take_07.wav")), "refined_top2_take_07.wav");
        assert_eq!(sample_name(3, "happy"), "sample_03_happy.wav");
    }

    #[test]
    fn silent_file_is_kept_unrefined() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("silent.wav");
        AudioBuffer::new(vec![0.0; 4_000], RATE).save(&input).unwrap();

        let output = dir.path().join("out").join("silent_refined.wav");
        let outcome = refine_file(&RefinementProcessor::default(), &input, &output).unwrap();
        assert_eq!(outcome, RefineOutcome::KeptOriginal);

        let saved = AudioBuffer::load(&output).unwrap();
        assert_eq!(saved.sample_rate, RATE);
        assert_eq!(saved.len(), 4_000);
    }

    #[tokio::test]
    async fn refine_selected_writes_ranked_names() {
        let dir = tempfile::tempdir().unwrap();
        let loud = dir.path().join("loud.wav");
        let soft = dir.path().join("soft.wav");
        write_tone(&loud, 1.0, 0.5);
        write_tone(&soft, 1.0, 0.1);

        let report = QualityAnalyzer::default()
            .analyze(&AudioBuffer::load(&loud).unwrap())
            .unwrap();
        let selected = vec![(soft, report.clone()), (loud, report)];
        let out_dir = dir.path().join("refined");

        let written =
            refine_selected(Arc::new(RefinementProcessor::default()), &selected, &out_dir).await;
        let names: Vec<_> = written.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["refined_top1_soft.wav", "refined_top2_loud.wav"]);

        let refined = AudioBuffer::load(&written[0]).unwrap();
        assert_eq!(refined.sample_rate, 22_050);
    }

    /// Echoes the text length as a tiny payload; fails on "boom".
    struct FakeSynth;

    #[async_trait]
    impl VoiceSynthesizer for FakeSynth {
        async fn synthesize(&self, req: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
            if req.text == "boom" {
                Err(SynthesisError::EmptyResponse)
            } else {
                Ok(vec![req.text.len() as u8])
            }
        }
    }

    #[tokio::test]
    async fn clone_batch_names_each_combination() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.wav");
        write_tone(&reference, 0.2, 0.5);

        let texts = vec!["hello".to_string(), "boom".to_string(), "bye".to_string()];
        let emotions: Vec<(String, EmotionControl)> = ["natural", "calm"]
            .iter()
            .map(|n| (n.to_string(), EmotionControl::preset(n, 0.8).unwrap()))
            .collect();
        let out_dir = dir.path().join("samples");

        let written = clone_batch(&FakeSynth, &reference, &texts, &emotions, &out_dir)
            .await
            .unwrap();
        let names: Vec<_> = written.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            [
                "sample_01_natural.wav",
                "sample_01_calm.wav",
                "sample_03_natural.wav",
                "sample_03_calm.wav"
            ]
        );
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn clone_batch_requires_reference() {
        let dir = tempfile::tempdir().unwrap();
        let err = clone_batch(
            &FakeSynth,
            &dir.path().join("missing.wav"),
            &["hi".to_string()],
            &[],
            dir.path(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("missing.wav"));
    }
}
