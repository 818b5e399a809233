//! Typed shape of validated model output.
//!
//! These types exist only on the far side of the shape validator: a value of
//! type [`ModelOutput`] is a witness that every field of the raw payload
//! passed its contract check. Construction from untrusted JSON goes through
//! `validation::shape`, never through `serde::Deserialize` directly, because
//! deserialization stops at the first error while the validator must report
//! all of them. Serde impls are still derived so validated output can cross
//! the persistence boundary unchanged.

use serde::{Deserialize, Serialize};

use super::{InterventionKind, MisconceptionKind, RiskLevel};

/// The complete validated payload: one analysis per roster student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Per-student analyses, in payload order
    pub students: Vec<StudentAnalysis>,
}

/// One student's qualitative analysis as asserted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnalysis {
    /// Roster identifier, pattern `student-[a-z0-9-]+`
    pub student_id: String,

    /// Overall risk classification
    pub risk_level: RiskLevel,

    /// Identified misconceptions, 1..=6
    pub misconceptions: Vec<Misconception>,

    /// Proposed interventions, 1..=4
    pub interventions: Vec<Intervention>,

    /// Free-text justification for the risk classification
    pub rationale: String,
}

/// One misconception the model attributes to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Misconception {
    /// Concept label, e.g. "fraction addition"
    pub concept: String,

    /// Kind of error behind the misconception
    #[serde(rename = "errorType")]
    pub kind: MisconceptionKind,

    /// Question IDs cited as evidence, 1..=10, pattern `Q[0-9]+`
    pub affected_questions: Vec<String>,

    /// Free-text evidence drawn from the student's answers
    pub evidence: String,
}

/// One remedial intervention the model proposes for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    /// Intervention kind
    #[serde(rename = "type")]
    pub kind: InterventionKind,

    /// Concept or skill the intervention targets
    pub focus_area: String,

    /// Concrete action for the teacher to take
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let output = ModelOutput {
            students: vec![StudentAnalysis {
                student_id: "student-ada".to_string(),
                risk_level: RiskLevel::Low,
                misconceptions: vec![Misconception {
                    concept: "recursion".to_string(),
                    kind: MisconceptionKind::Conceptual,
                    affected_questions: vec!["Q1".to_string()],
                    evidence: "answered the base case incorrectly".to_string(),
                }],
                interventions: vec![Intervention {
                    kind: InterventionKind::MiniQuiz,
                    focus_area: "recursion".to_string(),
                    action: "assign a 5-question base-case drill".to_string(),
                }],
                rationale: "solid overall, one isolated gap".to_string(),
            }],
        };

        let json = serde_json::to_value(&output).unwrap();
        let student = &json["students"][0];
        assert_eq!(student["studentId"], "student-ada");
        assert_eq!(student["riskLevel"], "low");
        assert_eq!(student["misconceptions"][0]["errorType"], "conceptual");
        assert_eq!(student["misconceptions"][0]["affectedQuestions"][0], "Q1");
        assert_eq!(student["interventions"][0]["type"], "mini-quiz");
        assert_eq!(student["interventions"][0]["focusArea"], "recursion");
    }
}
