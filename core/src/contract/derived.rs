//! Typed shape of the derived classroom analytics, plus the bounds table the
//! self-check stage validates it against.
//!
//! Derived values are owned by this crate and never mutated after
//! construction. The model contributes only qualitative facts; every number
//! here is recomputed from the fixture or counted from validated output.

use serde::{Deserialize, Serialize};

use super::{MisconceptionKind, RiskLevel};

/// Classroom-level aggregates computed from validated output and the fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAnalysis {
    /// One entry per risk level, declared order, counts may be zero
    pub risk_distribution: Vec<RiskSlice>,

    /// Score and completion aggregates, fixture arithmetic only
    pub score_metrics: ScoreMetrics,

    /// Concept-level hotspots, sorted by affected-student count descending
    pub concept_heatmap: Vec<ConceptHotspot>,

    /// One entry per misconception kind, canonical order
    pub error_breakdown: Vec<KindSlice>,
}

/// Student count and share for one risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSlice {
    /// Risk level this slice counts
    pub level: RiskLevel,

    /// Number of students classified at this level
    pub students: u32,

    /// Share of all analyzed students, percent, 2 decimals
    pub percentage: f64,
}

/// Score and completion aggregates over the fixture roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetrics {
    /// Mean score percentage across the roster, 2 decimals
    pub average_score: f64,

    /// Median score percentage across the roster, 2 decimals
    pub median_score: f64,

    /// Mean completion percentage across the roster, 2 decimals
    pub average_completion: f64,
}

/// Aggregate view of one concept across all students' misconceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptHotspot {
    /// Trimmed concept label
    pub concept: String,

    /// Distinct students reporting this concept
    pub students_affected: u32,

    /// Sorted union of question IDs cited across the group
    pub question_ids: Vec<String>,

    /// Most frequent misconception kind; canonical order breaks ties
    pub dominant_kind: MisconceptionKind,
}

/// Misconception count and share for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSlice {
    /// Misconception kind this slice counts
    pub kind: MisconceptionKind,

    /// Misconceptions of this kind across all students
    pub count: u32,

    /// Share of all misconceptions, percent, 2 decimals
    pub percentage: f64,
}

/// Bounds the derived-analysis self-check enforces.
///
/// Built once by the pipeline and held read-only; a value, not a singleton.
/// Violations indicate a bug in the analytics builders, never bad model
/// output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedContract {
    /// Upper bound on any count field
    pub max_count: u32,

    /// Inclusive percentage range applied to every percentage field
    pub percentage_range: (f64, f64),

    /// Heatmap concept label length bounds, chars
    pub concept_len: (usize, usize),

    /// Heatmap question-ID list length bounds
    pub question_list_len: (usize, usize),
}

impl Default for DerivedContract {
    fn default() -> Self {
        Self {
            max_count: 1_000,
            percentage_range: (0.0, 100.0),
            concept_len: (1, 120),
            question_list_len: (1, 30),
        }
    }
}
