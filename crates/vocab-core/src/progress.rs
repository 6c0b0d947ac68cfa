//! Batch analysis progress snapshots and the values derived from them.

use serde::{Deserialize, Serialize};

/// Share of the overall bar reserved for the extraction phase.
const EXTRACTION_SHARE: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Idle,
    Extracting,
    Analyzing,
    Completed,
    Error,
}

impl BatchStatus {
    /// Whether the backend is still working and the job should keep being polled.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Extracting | Self::Analyzing)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionProgress {
    pub total_words: u32,
    pub extracted_words: u32,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisProgress {
    pub total_words: u32,
    pub completed_words: u32,
    pub failed_words: u32,
    pub current_word: Option<String>,
    pub current_batch: u32,
    pub total_batches: u32,
    pub elapsed_seconds: f64,
}

impl AnalysisProgress {
    pub fn processed_words(&self) -> u32 {
        self.completed_words.saturating_add(self.failed_words)
    }
}

/// Snapshot reported by `get_batch_analysis_progress`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchAnalysisProgress {
    pub status: BatchStatus,
    pub extraction_progress: Option<ExtractionProgress>,
    pub analysis_progress: Option<AnalysisProgress>,
    #[serde(alias = "error")]
    pub error_message: Option<String>,
}

impl BatchAnalysisProgress {
    pub fn overall_percentage(&self) -> f64 {
        overall_percentage(self)
    }

    pub fn phase_text(&self) -> String {
        phase_text(self)
    }

    pub fn estimated_remaining_seconds(&self) -> Option<f64> {
        estimated_remaining_seconds(self)
    }
}

fn ratio(done: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(done) / f64::from(total)).clamp(0.0, 1.0)
}

/// Overall completion in percent.
///
/// Extraction fills 0 to 10, analysis fills 10 to 100. `completed` is always 100 and `idle` is
/// always 0. An `error` snapshot keeps the position of the phase it failed in.
pub fn overall_percentage(progress: &BatchAnalysisProgress) -> f64 {
    let extraction = || {
        progress
            .extraction_progress
            .as_ref()
            .map(|p| ratio(p.extracted_words, p.total_words) * EXTRACTION_SHARE)
            .unwrap_or(0.0)
    };
    let analysis = || {
        progress.analysis_progress.as_ref().map(|p| {
            EXTRACTION_SHARE
                + ratio(p.processed_words(), p.total_words) * (100.0 - EXTRACTION_SHARE)
        })
    };

    match progress.status {
        BatchStatus::Idle => 0.0,
        BatchStatus::Completed => 100.0,
        BatchStatus::Extracting => extraction(),
        BatchStatus::Analyzing => analysis().unwrap_or(EXTRACTION_SHARE),
        BatchStatus::Error => analysis().unwrap_or_else(extraction),
    }
}

/// Human-readable phase label with counts.
pub fn phase_text(progress: &BatchAnalysisProgress) -> String {
    match progress.status {
        BatchStatus::Idle => "Waiting to start".to_string(),
        BatchStatus::Extracting => match progress.extraction_progress.as_ref() {
            Some(p) => format!("Extracting words ({}/{})", p.extracted_words, p.total_words),
            None => "Extracting words".to_string(),
        },
        BatchStatus::Analyzing => match progress.analysis_progress.as_ref() {
            Some(p) => {
                let mut text = format!(
                    "Analyzing words ({}/{})",
                    p.processed_words(),
                    p.total_words
                );
                if p.total_batches > 0 {
                    text.push_str(&format!(
                        ", batch {}/{}",
                        p.current_batch, p.total_batches
                    ));
                }
                if let Some(word) = p.current_word.as_deref().filter(|w| !w.is_empty()) {
                    text.push_str(&format!(": {word}"));
                }
                text
            }
            None => "Analyzing words".to_string(),
        },
        BatchStatus::Completed => match progress.analysis_progress.as_ref() {
            Some(p) if p.failed_words > 0 => format!(
                "Analysis complete ({} analyzed, {} failed)",
                p.completed_words, p.failed_words
            ),
            Some(p) => format!("Analysis complete ({} analyzed)", p.completed_words),
            None => "Analysis complete".to_string(),
        },
        BatchStatus::Error => match progress.error_message.as_deref() {
            Some(message) if !message.is_empty() => format!("Analysis failed: {message}"),
            _ => "Analysis failed".to_string(),
        },
    }
}

/// Remaining seconds, extrapolated from the average time per processed word.
///
/// `None` unless analysis is running and at least one word has been processed.
pub fn estimated_remaining_seconds(progress: &BatchAnalysisProgress) -> Option<f64> {
    if progress.status != BatchStatus::Analyzing {
        return None;
    }
    let analysis = progress.analysis_progress.as_ref()?;
    let analyzed = analysis.processed_words();
    if analyzed == 0 {
        return None;
    }
    let remaining_words = f64::from(analysis.total_words.saturating_sub(analyzed));
    let per_word = analysis.elapsed_seconds.max(0.0) / f64::from(analyzed);
    let estimate = remaining_words * per_word;
    estimate.is_finite().then_some(estimate)
}

/// Render an estimate for display: `unknown`, `42s`, `3m 5s` or `1h 2m`.
pub fn format_remaining(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds else {
        return "unknown".to_string();
    };
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracting(total: u32, extracted: u32) -> BatchAnalysisProgress {
        BatchAnalysisProgress {
            status: BatchStatus::Extracting,
            extraction_progress: Some(ExtractionProgress {
                total_words: total,
                extracted_words: extracted,
                elapsed_seconds: 1.0,
            }),
            ..Default::default()
        }
    }

    fn analyzing(total: u32, completed: u32, failed: u32, elapsed: f64) -> BatchAnalysisProgress {
        BatchAnalysisProgress {
            status: BatchStatus::Analyzing,
            analysis_progress: Some(AnalysisProgress {
                total_words: total,
                completed_words: completed,
                failed_words: failed,
                current_word: Some("lucid".into()),
                current_batch: 2,
                total_batches: 5,
                elapsed_seconds: elapsed,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn extraction_contributes_first_ten_percent() {
        assert_eq!(overall_percentage(&extracting(10, 5)), 5.0);
        assert_eq!(overall_percentage(&extracting(0, 0)), 0.0);
    }

    #[test]
    fn analysis_fills_remaining_ninety_percent() {
        assert_eq!(overall_percentage(&analyzing(10, 3, 1, 4.0)), 46.0);
        assert_eq!(overall_percentage(&analyzing(10, 10, 0, 4.0)), 100.0);
    }

    #[test]
    fn idle_and_completed_are_pinned() {
        assert_eq!(overall_percentage(&BatchAnalysisProgress::default()), 0.0);
        let mut done = analyzing(10, 2, 0, 1.0);
        done.status = BatchStatus::Completed;
        assert_eq!(overall_percentage(&done), 100.0);
    }

    #[test]
    fn percentage_never_decreases_across_a_run() {
        let run = vec![
            BatchAnalysisProgress::default(),
            extracting(20, 0),
            extracting(20, 10),
            extracting(20, 20),
            analyzing(20, 0, 0, 0.0),
            analyzing(20, 5, 1, 3.0),
            analyzing(20, 19, 1, 9.0),
            BatchAnalysisProgress {
                status: BatchStatus::Completed,
                ..Default::default()
            },
        ];
        let values: Vec<f64> = run.iter().map(overall_percentage).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&100.0));
    }

    #[test]
    fn remaining_time_unknown_until_first_word() {
        assert_eq!(estimated_remaining_seconds(&analyzing(10, 0, 0, 5.0)), None);
        assert_eq!(estimated_remaining_seconds(&extracting(10, 5)), None);
        assert_eq!(format_remaining(None), "unknown");
    }

    #[test]
    fn remaining_time_extrapolates_average() {
        let estimate = estimated_remaining_seconds(&analyzing(10, 3, 1, 8.0)).unwrap();
        assert_eq!(estimate, 12.0);
        assert_eq!(estimated_remaining_seconds(&analyzing(4, 4, 0, 8.0)), Some(0.0));
    }

    #[test]
    fn formats_remaining_durations() {
        assert_eq!(format_remaining(Some(42.4)), "42s");
        assert_eq!(format_remaining(Some(185.0)), "3m 5s");
        assert_eq!(format_remaining(Some(3720.0)), "1h 2m");
    }

    #[test]
    fn phase_text_includes_counts_and_batches() {
        assert_eq!(phase_text(&extracting(10, 5)), "Extracting words (5/10)");
        assert_eq!(
            phase_text(&analyzing(10, 3, 1, 1.0)),
            "Analyzing words (4/10), batch 2/5: lucid"
        );
        let failed = BatchAnalysisProgress {
            status: BatchStatus::Error,
            error_message: Some("quota exceeded".into()),
            ..Default::default()
        };
        assert_eq!(phase_text(&failed), "Analysis failed: quota exceeded");
    }

    #[test]
    fn decodes_backend_snapshot() {
        let snapshot: BatchAnalysisProgress = serde_json::from_value(json!({
            "status": "analyzing",
            "analysisProgress": {
                "totalWords": 10,
                "completedWords": 3,
                "failedWords": 1,
                "currentWord": "apt",
                "currentBatch": 1,
                "totalBatches": 2,
                "elapsedSeconds": 2.5
            }
        }))
        .unwrap();
        assert_eq!(snapshot.status, BatchStatus::Analyzing);
        assert_eq!(snapshot.overall_percentage(), 46.0);
    }
}
