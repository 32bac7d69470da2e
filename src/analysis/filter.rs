//! Threshold filtering and ranking of analysed clips.
//!
//! Items are any `(T, QualityReport)` pair: an in-memory [`AudioBuffer`],
//! a file path, or both.
//!
//! [`AudioBuffer`]: crate::audio::AudioBuffer

use std::cmp::Ordering;

use crate::config::FilterThresholds;

use super::QualityReport;

impl FilterThresholds {
    /// Returns `true` when `report` meets all three thresholds.
    pub fn accepts(&self, report: &QualityReport) -> bool {
        report.quality_score >= self.min_score
            && report.duration_secs() >= self.min_duration_secs
            && report.silence_ratio() <= self.max_silence_ratio
    }
}

/// Sort by descending composite score. Stable: equal scores keep input order
/// (`0.0` and `-0.0` compare equal).
pub fn rank<T>(mut items: Vec<(T, QualityReport)>) -> Vec<(T, QualityReport)> {
    items.sort_by(|a, b| {
        b.1.quality_score
            .partial_cmp(&a.1.quality_score)
            .unwrap_or(Ordering::Equal)
    });
    items
}

/// Keep the items whose reports pass `thresholds`, best first.
///
/// ```rust
/// use voice_prep::analysis::{filter_ranked, QualityMetrics, QualityReport};
/// use voice_prep::config::FilterThresholds;
///
/// let report = |score: f32, secs: f32| QualityReport {
///     quality_score: score,
///     metrics: QualityMetrics { duration_secs: secs, ..QualityMetrics::default() },
/// };
/// let items = vec![("a", report(70.0, 8.0)), ("b", report(90.0, 2.0)), ("c", report(95.0, 6.0))];
///
/// let kept = filter_ranked(items, &FilterThresholds::default());
/// let names: Vec<_> = kept.iter().map(|(name, _)| *name).collect();
/// assert_eq!(names, ["c", "a"]); // "b" is too short
/// ```
pub fn filter_ranked<T>(
    items: Vec<(T, QualityReport)>,
    thresholds: &FilterThresholds,
) -> Vec<(T, QualityReport)> {
    let total = items.len();
    let kept: Vec<_> = items
        .into_iter()
        .filter(|(_, report)| thresholds.accepts(report))
        .collect();
    log::info!("filter: {}/{} clips pass {:?}", kept.len(), total, thresholds);
    rank(kept)
}

/// Choose the clips to refine: those passing `thresholds`, or, when none
/// do, the best `top_n` overall. At most `top_n` items are returned.
pub fn select_for_refinement<T>(
    items: Vec<(T, QualityReport)>,
    thresholds: &FilterThresholds,
    top_n: usize,
) -> Vec<(T, QualityReport)> {
    let (passing, failing): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|(_, report)| thresholds.accepts(report));

    let mut chosen = if passing.is_empty() {
        log::warn!("filter: no clip passed the thresholds; using the top {top_n} by score");
        rank(failing)
    } else {
        log::info!("filter: {} clips pass {:?}", passing.len(), thresholds);
        rank(passing)
    };
    chosen.truncate(top_n);
    chosen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QualityMetrics;

    fn report(score: f32, duration: f32, silence: f32) -> QualityReport {
        QualityReport {
            quality_score: score,
            metrics: QualityMetrics {
                duration_secs: duration,
                silence_ratio: silence,
                ..QualityMetrics::default()
            },
        }
    }

    #[test]
    fn eighteen_passing_clips_keep_descending_order() {
        let scores = [
            100.0, 100.0, 95.0, 95.0, 90.0, 85.0, 85.0, 85.0, 85.0, 80.0, 80.0, 75.0, 75.0, 70.0,
            70.0, 65.0, 60.0, 60.0,
        ];
        let items: Vec<(usize, QualityReport)> = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (i, report(s, 5.0 + i as f32, 0.4 - i as f32 * 0.01)))
            .collect();

        let thresholds = FilterThresholds {
            min_score: 60.0,
            min_duration_secs: 5.0,
            max_silence_ratio: 0.4,
        };
        let kept = filter_ranked(items, &thresholds);

        assert_eq!(kept.len(), 18);
        let out_scores: Vec<f32> = kept.iter().map(|(_, r)| r.quality_score).collect();
        assert_eq!(out_scores, scores);
        let order: Vec<usize> = kept.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, (0..18).collect::<Vec<_>>());
    }

    #[test]
    fn signed_zero_scores_tie() {
        let items = vec![
            ("pos", report(0.0, 6.0, 0.1)),
            ("neg", report(-0.0, 6.0, 0.1)),
            ("pos2", report(0.0, 6.0, 0.1)),
        ];
        let names: Vec<_> = rank(items).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["pos", "neg", "pos2"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![
            ("low", report(70.0, 6.0, 0.1)),
            ("first", report(90.0, 6.0, 0.1)),
            ("second", report(90.0, 6.0, 0.1)),
            ("third", report(90.0, 6.0, 0.1)),
        ];
        let names: Vec<_> = filter_ranked(items, &FilterThresholds::default())
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["first", "second", "third", "low"]);
    }

    #[test]
    fn each_threshold_rejects() {
        let th = FilterThresholds::default();
        assert!(th.accepts(&report(60.0, 5.0, 0.4)));
        assert!(!th.accepts(&report(59.9, 5.0, 0.4)));
        assert!(!th.accepts(&report(60.0, 4.9, 0.4)));
        assert!(!th.accepts(&report(60.0, 5.0, 0.41)));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let kept = filter_ranked(Vec::<((), QualityReport)>::new(), &FilterThresholds::default());
        assert!(kept.is_empty());
    }

    #[test]
    fn selection_falls_back_to_top_n() {
        let items: Vec<(usize, QualityReport)> = (0..8)
            .map(|i| (i, report(10.0 * i as f32, 1.0, 0.9)))
            .collect();
        let chosen = select_for_refinement(items, &FilterThresholds::default(), 5);
        let order: Vec<usize> = chosen.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, [7, 6, 5, 4, 3]);
    }

    #[test]
    fn selection_caps_passing_set() {
        let items: Vec<(usize, QualityReport)> = (0..8)
            .map(|i| (i, report(60.0 + i as f32, 8.0, 0.1)))
            .collect();
        let chosen = select_for_refinement(items, &FilterThresholds::default(), 3);
        let order: Vec<usize> = chosen.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, [7, 6, 5]);
    }

    #[test]
    fn selection_prefers_passing_over_higher_failing() {
        let items = vec![
            ("short-but-loud", report(99.0, 2.0, 0.0)),
            ("passing", report(65.0, 8.0, 0.1)),
        ];
        let chosen = select_for_refinement(items, &FilterThresholds::default(), 5);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].0, "passing");
    }
}
