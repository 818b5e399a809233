//! Score and completion metrics, recomputed from the fixture.
//!
//! The fixture is the sole arithmetic source: whatever the model asserted
//! about scores never reaches these functions. This is the defense against a
//! model hallucinating plausible but wrong summary statistics.

use crate::contract::ScoreMetrics;
use crate::fixture::QuizFixture;

use super::round2;

/// Average and median score percentage plus average completion percentage
/// over the fixture roster.
///
/// A student with `max_score` 0 scores 0 percent; a quiz with no questions
/// yields 0 percent completion. An empty roster yields all-zero metrics.
pub fn score_metrics(fixture: &QuizFixture) -> ScoreMetrics {
    let question_count = fixture.questions.len();

    let mut score_percentages: Vec<f64> = fixture
        .students
        .iter()
        .map(|record| {
            if record.max_score == 0.0 {
                0.0
            } else {
                record.score / record.max_score * 100.0
            }
        })
        .collect();

    let completion_percentages: Vec<f64> = fixture
        .students
        .iter()
        .map(|record| {
            if question_count == 0 {
                0.0
            } else {
                record.attempted_question_ids.len() as f64 / question_count as f64 * 100.0
            }
        })
        .collect();

    let average_score = round2(mean(&score_percentages));
    let average_completion = round2(mean(&completion_percentages));

    score_percentages.sort_by(|a, b| a.total_cmp(b));
    let median_score = round2(median_of_sorted(&score_percentages));

    ScoreMetrics {
        average_score,
        median_score,
        average_completion,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Middle value of an ascending-sorted slice; mean of the two middle values
/// for even lengths, 0 for empty input.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
