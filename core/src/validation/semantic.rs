//! # Semantic Validator
//!
//! Cross-referential checks the shape stage cannot express: shape validation
//! only proves local well-formedness, it cannot know that `student-042` does
//! not exist for *this* quiz or that the model silently dropped a roster
//! entry. Keeping the stage separate also keeps the failure class separate:
//! a shape failure means the model ignored format instructions, a semantic
//! failure means it ignored the input content, and the retry strategy
//! upstream differs between the two.
//!
//! All checks are independent and every violation is collected.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::contract::{
    ModelOutput, StudentAnalysis, MAX_INTERVENTIONS_PER_STUDENT, MIN_INTERVENTIONS_PER_STUDENT,
};
use crate::diagnostics::{Diagnostic, DiagnosticPath};
use crate::fixture::QuizFixture;

/// Caller-tunable knobs for the semantic stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticOptions {
    /// Permit one student to report the same normalized concept twice
    pub allow_duplicate_concept_per_student: bool,

    /// Minimum interventions required per student
    pub min_interventions_per_student: usize,

    /// Maximum interventions permitted per student
    pub max_interventions_per_student: usize,
}

impl Default for SemanticOptions {
    fn default() -> Self {
        Self {
            allow_duplicate_concept_per_student: false,
            min_interventions_per_student: MIN_INTERVENTIONS_PER_STUDENT,
            max_interventions_per_student: MAX_INTERVENTIONS_PER_STUDENT,
        }
    }
}

/// Cross-check a shape-valid output against the trusted fixture.
///
/// Returns every violation found; an empty list means the output is
/// semantically consistent with the fixture.
pub fn validate_semantics(
    output: &ModelOutput,
    fixture: &QuizFixture,
    options: &SemanticOptions,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let known_students = fixture.student_id_set();
    let known_questions = fixture.question_id_set();
    let students_path = DiagnosticPath::root().key("students");

    let mut seen_ids: HashSet<&str> = HashSet::new();

    for (i, student) in output.students.iter().enumerate() {
        let entry_path = students_path.index(i);
        let id_path = entry_path.key("studentId");

        if !known_students.contains(student.student_id.as_str()) {
            diags.push(Diagnostic::with_detail(
                id_path.as_str(),
                "student is not on this quiz's roster",
                "a roster student ID",
                format!("{:?}", student.student_id),
            ));
        }

        // First occurrence claims the ID; later ones are the duplicates.
        if !seen_ids.insert(student.student_id.as_str()) {
            diags.push(Diagnostic::with_detail(
                id_path.as_str(),
                "student appears more than once in the payload",
                "exactly one entry per student",
                format!("{:?}", student.student_id),
            ));
        }

        let intervention_count = student.interventions.len();
        if intervention_count < options.min_interventions_per_student
            || intervention_count > options.max_interventions_per_student
        {
            diags.push(Diagnostic::with_detail(
                entry_path.key("interventions").as_str(),
                "intervention count outside the configured window",
                format!(
                    "between {} and {} interventions",
                    options.min_interventions_per_student,
                    options.max_interventions_per_student
                ),
                format!("{intervention_count} interventions"),
            ));
        }

        if !options.allow_duplicate_concept_per_student {
            flag_duplicate_concepts(student, &entry_path, &mut diags);
        }

        for (j, misconception) in student.misconceptions.iter().enumerate() {
            let questions_path = entry_path.key("misconceptions").index(j).key("affectedQuestions");
            for (k, question_id) in misconception.affected_questions.iter().enumerate() {
                if !known_questions.contains(question_id.as_str()) {
                    diags.push(Diagnostic::with_detail(
                        questions_path.index(k).as_str(),
                        "question does not exist in this quiz",
                        "a question ID from the quiz",
                        format!("{question_id:?}"),
                    ));
                }
            }
        }
    }

    // Completeness in the other direction: no roster student may be omitted.
    for record in &fixture.students {
        if !seen_ids.contains(record.student_id.as_str()) {
            diags.push(Diagnostic::with_detail(
                students_path.as_str(),
                format!("roster student {} is missing from the payload", record.student_id),
                "one entry per roster student",
                format!("no entry for {:?}", record.student_id),
            ));
        }
    }

    diags
}

fn flag_duplicate_concepts(
    student: &StudentAnalysis,
    entry_path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    // Keyed on the trimmed, case-folded label; the first occurrence wins and
    // later ones are flagged.
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (j, misconception) in student.misconceptions.iter().enumerate() {
        let normalized = misconception.concept.trim().to_lowercase();
        if let Some(&first) = first_seen.get(&normalized) {
            diags.push(Diagnostic::with_detail(
                entry_path.key("misconceptions").index(j).key("concept").as_str(),
                format!("concept already reported for this student at misconceptions[{first}]"),
                "distinct concepts per student",
                format!("{:?}", misconception.concept),
            ));
        } else {
            first_seen.insert(normalized, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{
        Intervention, InterventionKind, Misconception, MisconceptionKind, RiskLevel,
        StudentAnalysis,
    };
    use crate::fixture::{QuizQuestion, StudentRecord};

    fn question(question_id: &str, concept: &str) -> QuizQuestion {
        QuizQuestion {
            item_id: format!("item-{question_id}"),
            question_id: question_id.to_string(),
            concept: concept.to_string(),
            text: format!("{concept}?"),
            question_type: "multiple-choice".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answers: vec!["a".to_string()],
            max_score: 10.0,
        }
    }

    fn record(student_id: &str) -> StudentRecord {
        StudentRecord {
            student_id: student_id.to_string(),
            display_name: student_id.to_string(),
            score: 15.0,
            max_score: 20.0,
            attempted_question_ids: vec!["Q1".to_string(), "Q2".to_string()],
            incorrect_question_ids: vec!["Q2".to_string()],
        }
    }

    fn fixture() -> QuizFixture {
        QuizFixture {
            quiz_id: "quiz-1".to_string(),
            title: "Unit check".to_string(),
            questions: vec![question("Q1", "loops"), question("Q2", "recursion")],
            students: vec![record("student-ada"), record("student-bob")],
        }
    }

    fn analysis(student_id: &str) -> StudentAnalysis {
        StudentAnalysis {
            student_id: student_id.to_string(),
            risk_level: RiskLevel::Medium,
            misconceptions: vec![Misconception {
                concept: "recursion".to_string(),
                kind: MisconceptionKind::Conceptual,
                affected_questions: vec!["Q2".to_string()],
                evidence: "missed the base case".to_string(),
            }],
            interventions: vec![Intervention {
                kind: InterventionKind::Video,
                focus_area: "recursion".to_string(),
                action: "watch the base-case walkthrough".to_string(),
            }],
            rationale: "struggles with recursion only".to_string(),
        }
    }

    fn output(ids: &[&str]) -> ModelOutput {
        ModelOutput {
            students: ids.iter().map(|id| analysis(id)).collect(),
        }
    }

    #[test]
    fn consistent_output_yields_no_diagnostics() {
        let diags = validate_semantics(
            &output(&["student-ada", "student-bob"]),
            &fixture(),
            &SemanticOptions::default(),
        );
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn unknown_student_is_flagged_with_value() {
        let diags = validate_semantics(
            &output(&["student-ada", "student-eve"]),
            &fixture(),
            &SemanticOptions::default(),
        );
        // unknown student-eve, plus student-bob missing
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].path, "$.students[1].studentId");
        assert_eq!(diags[0].received.as_deref(), Some("\"student-eve\""));
        assert!(diags[1].message.contains("student-bob"));
    }

    #[test]
    fn second_and_later_occurrences_are_the_duplicates() {
        let diags = validate_semantics(
            &output(&["student-ada", "student-ada", "student-bob", "student-ada"]),
            &fixture(),
            &SemanticOptions::default(),
        );
        let dup_paths: Vec<&str> = diags
            .iter()
            .filter(|d| d.message.contains("more than once"))
            .map(|d| d.path.as_str())
            .collect();
        assert_eq!(dup_paths, vec!["$.students[1].studentId", "$.students[3].studentId"]);
    }

    #[test]
    fn missing_roster_student_is_cited_by_id() {
        let diags = validate_semantics(
            &output(&["student-ada"]),
            &fixture(),
            &SemanticOptions::default(),
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "$.students");
        assert!(diags[0].message.contains("student-bob"));
    }

    #[test]
    fn intervention_window_can_be_tightened() {
        let options = SemanticOptions {
            min_interventions_per_student: 2,
            ..SemanticOptions::default()
        };
        let diags = validate_semantics(
            &output(&["student-ada", "student-bob"]),
            &fixture(),
            &options,
        );
        assert_eq!(diags.len(), 2);
        assert!(diags
            .iter()
            .all(|d| d.path.ends_with(".interventions")
                && d.received.as_deref() == Some("1 interventions")));
    }

    #[test]
    fn duplicate_concept_is_case_and_whitespace_insensitive() {
        let mut payload = output(&["student-ada", "student-bob"]);
        payload.students[0].misconceptions.push(Misconception {
            concept: "  Recursion ".to_string(),
            kind: MisconceptionKind::Procedural,
            affected_questions: vec!["Q1".to_string()],
            evidence: "unwinds the stack by hand".to_string(),
        });

        let diags =
            validate_semantics(&payload, &fixture(), &SemanticOptions::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "$.students[0].misconceptions[1].concept");
        assert!(diags[0].message.contains("misconceptions[0]"));

        let permissive = SemanticOptions {
            allow_duplicate_concept_per_student: true,
            ..SemanticOptions::default()
        };
        assert!(validate_semantics(&payload, &fixture(), &permissive).is_empty());
    }

    #[test]
    fn unknown_question_reference_names_its_index() {
        let mut payload = output(&["student-ada", "student-bob"]);
        payload.students[1].misconceptions[0]
            .affected_questions
            .push("Q999".to_string());

        let diags =
            validate_semantics(&payload, &fixture(), &SemanticOptions::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].path,
            "$.students[1].misconceptions[0].affectedQuestions[1]"
        );
        assert_eq!(diags[0].received.as_deref(), Some("\"Q999\""));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let mut payload = output(&["student-ada", "student-ada"]);
        payload.students[1].misconceptions[0]
            .affected_questions
            .push("Q77".to_string());

        let diags =
            validate_semantics(&payload, &fixture(), &SemanticOptions::default());
        // duplicate student, unknown question, missing student-bob
        assert_eq!(diags.len(), 3);
    }
}
