//! # Quiz Fixture
//!
//! The caller-supplied ground truth an analysis run is anchored to: the quiz
//! identity, its question bank, and the roster with raw scores and attempt
//! records. Every identifier the model emits must resolve into this fixture,
//! and all score/completion arithmetic reads the fixture exclusively.
//!
//! The fixture is constructed once per run from persisted quiz data and
//! treated as immutable for the duration of validation. Nothing here is
//! validated by this crate; a fixture is trusted by definition.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Trusted snapshot of one quiz: identity, question bank, roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizFixture {
    /// Persisted quiz identifier
    pub quiz_id: String,

    /// Display title
    pub title: String,

    /// Question bank for this quiz
    pub questions: Vec<QuizQuestion>,

    /// Roster with raw results
    pub students: Vec<StudentRecord>,
}

/// One question of the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Internal item identifier from the source system
    pub item_id: String,

    /// Public identifier the model cites, pattern `Q[0-9]+`
    pub question_id: String,

    /// Concept label this question exercises
    pub concept: String,

    /// Question text
    pub text: String,

    /// Question type tag, e.g. `multiple-choice`
    pub question_type: String,

    /// Answer options, empty for free-response questions
    pub options: Vec<String>,

    /// Correct answers
    pub correct_answers: Vec<String>,

    /// Maximum score attainable on this question
    pub max_score: f64,
}

/// One roster entry with raw results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Roster identifier, pattern `student-[a-z0-9-]+`
    pub student_id: String,

    /// Display name
    pub display_name: String,

    /// Raw score achieved
    pub score: f64,

    /// Maximum score attainable
    pub max_score: f64,

    /// Question IDs the student attempted
    pub attempted_question_ids: Vec<String>,

    /// Question IDs the student answered incorrectly
    pub incorrect_question_ids: Vec<String>,
}

impl QuizFixture {
    /// Roster identifiers as a lookup set.
    pub fn student_id_set(&self) -> HashSet<&str> {
        self.students.iter().map(|s| s.student_id.as_str()).collect()
    }

    /// Public question identifiers as a lookup set.
    pub fn question_id_set(&self) -> HashSet<&str> {
        self.questions
            .iter()
            .map(|q| q.question_id.as_str())
            .collect()
    }

    /// Look up a roster entry by identifier.
    pub fn student(&self, student_id: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.student_id == student_id)
    }
}
