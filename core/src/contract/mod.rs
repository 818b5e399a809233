//! # Analysis Contract Vocabulary
//!
//! The closed vocabulary the generative model must speak: risk levels,
//! misconception kinds, intervention kinds, identifier patterns, and the
//! cardinality bounds every payload is held to. Pure data and total
//! predicates; no validation logic lives here.
//!
//! Declared enum order is load-bearing: risk distribution entries are emitted
//! in `RiskLevel::ALL` order, and heatmap dominance ties are broken by
//! `MisconceptionKind::ALL` order.

pub mod derived;
pub mod model;

pub use self::derived::*;
pub use self::model::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound on students per payload.
pub const MIN_STUDENTS_PER_PAYLOAD: usize = 1;

/// Upper bound on students per payload.
pub const MAX_STUDENTS_PER_PAYLOAD: usize = 60;

/// Misconception list bounds per student.
pub const MIN_MISCONCEPTIONS_PER_STUDENT: usize = 1;
pub const MAX_MISCONCEPTIONS_PER_STUDENT: usize = 6;

/// Affected-question list bounds per misconception.
pub const MIN_AFFECTED_QUESTIONS: usize = 1;
pub const MAX_AFFECTED_QUESTIONS: usize = 10;

/// Intervention list bounds per student.
pub const MIN_INTERVENTIONS_PER_STUDENT: usize = 1;
pub const MAX_INTERVENTIONS_PER_STUDENT: usize = 4;

/// Per-student risk classification asserted by the model.
///
/// Declared in reporting order: distribution aggregates list `critical`
/// first and `low` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Immediate intervention required
    Critical,

    /// Significant gaps, trending downward
    High,

    /// Some gaps, manageable with targeted practice
    Medium,

    /// On track
    Low,
}

impl RiskLevel {
    /// All levels in declared reporting order.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Wire name as emitted by the model.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    /// Parse a wire name; `None` for anything outside the vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "critical" => Some(RiskLevel::Critical),
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of error behind a misconception.
///
/// Declared in canonical order; heatmap dominance ties resolve to the
/// earliest kind whose count is not exceeded by a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MisconceptionKind {
    /// Misunderstanding of the underlying idea
    Conceptual,

    /// Correct idea, wrong procedure
    Procedural,

    /// Slip; the student likely knows better
    Careless,
}

impl MisconceptionKind {
    /// All kinds in canonical order.
    pub const ALL: [MisconceptionKind; 3] = [
        MisconceptionKind::Conceptual,
        MisconceptionKind::Procedural,
        MisconceptionKind::Careless,
    ];

    /// Wire name as emitted by the model.
    pub fn as_str(self) -> &'static str {
        match self {
            MisconceptionKind::Conceptual => "conceptual",
            MisconceptionKind::Procedural => "procedural",
            MisconceptionKind::Careless => "careless",
        }
    }

    /// Parse a wire name; `None` for anything outside the vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "conceptual" => Some(MisconceptionKind::Conceptual),
            "procedural" => Some(MisconceptionKind::Procedural),
            "careless" => Some(MisconceptionKind::Careless),
            _ => None,
        }
    }

    /// Position in canonical order, used for dominance tie-breaking.
    pub fn canonical_rank(self) -> usize {
        match self {
            MisconceptionKind::Conceptual => 0,
            MisconceptionKind::Procedural => 1,
            MisconceptionKind::Careless => 2,
        }
    }
}

impl fmt::Display for MisconceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of remedial intervention the model may propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionKind {
    Worksheet,
    Video,
    #[serde(rename = "mini-quiz")]
    MiniQuiz,
}

impl InterventionKind {
    /// Wire name as emitted by the model.
    pub fn as_str(self) -> &'static str {
        match self {
            InterventionKind::Worksheet => "worksheet",
            InterventionKind::Video => "video",
            InterventionKind::MiniQuiz => "mini-quiz",
        }
    }

    /// Parse a wire name; `None` for anything outside the vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "worksheet" => Some(InterventionKind::Worksheet),
            "video" => Some(InterventionKind::Video),
            "mini-quiz" => Some(InterventionKind::MiniQuiz),
            _ => None,
        }
    }
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `raw` matches the student identifier pattern
/// `student-` followed by one or more of `[a-z0-9-]`.
pub fn is_valid_student_id(raw: &str) -> bool {
    match raw.strip_prefix("student-") {
        Some(slug) if !slug.is_empty() => slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'),
        _ => false,
    }
}

/// Whether `raw` matches the public question identifier pattern
/// `Q` followed by one or more digits.
pub fn is_valid_question_id(raw: &str) -> bool {
    match raw.strip_prefix('Q') {
        Some(digits) if !digits.is_empty() => digits.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}
