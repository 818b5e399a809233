//! # Analysis Pipeline
//!
//! The single entry point callers use: raw response text plus a fixture in,
//! a tagged outcome out. Stages run strictly in sequence
//! (`parsing → shape-checking → semantic-checking → deriving →
//! derived-checking → done`), and the first failing stage terminates the run
//! with its error class and diagnostics, skipping everything after it.
//!
//! There is no retry, backoff, or loop here; the pipeline only classifies
//! failures so an upstream caller can decide whether another generation
//! attempt is worth making. Every invocation is a pure function of its
//! arguments: no I/O, no global state, no panics for malformed input.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::analytics::derive_analysis;
use crate::contract::{DerivedAnalysis, DerivedContract, ModelOutput};
use crate::diagnostics::Diagnostic;
use crate::fixture::QuizFixture;
use crate::validation::{validate_derived, validate_semantics, validate_shape, SemanticOptions};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    Parsing,
    ShapeChecking,
    SemanticChecking,
    Deriving,
    DerivedChecking,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Parsing => "parsing",
            PipelineStage::ShapeChecking => "shape-checking",
            PipelineStage::SemanticChecking => "semantic-checking",
            PipelineStage::Deriving => "deriving",
            PipelineStage::DerivedChecking => "derived-checking",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Failure classification, the contract the caller's retry logic depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Response text was not valid JSON
    ParseFail,

    /// Parsed JSON violated the model-output contract
    SchemaFail,

    /// Output was well-formed but inconsistent with the fixture
    SemanticFail,

    /// Internal derivation or self-validation failure; a bug, not bad output
    RuntimeFail,
}

impl ErrorClass {
    /// Wire name of this class.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::ParseFail => "parse_fail",
            ErrorClass::SchemaFail => "schema_fail",
            ErrorClass::SemanticFail => "semantic_fail",
            ErrorClass::RuntimeFail => "runtime_fail",
        }
    }

    /// Whether a caller should consider another generation attempt.
    ///
    /// True for every class attributable to the generative source. A runtime
    /// failure is a bug on our side; retrying reproduces it.
    pub fn is_retryable(self) -> bool {
        match self {
            ErrorClass::ParseFail | ErrorClass::SchemaFail | ErrorClass::SemanticFail => true,
            ErrorClass::RuntimeFail => false,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an error class warrants another generation attempt.
pub fn is_retryable(class: ErrorClass) -> bool {
    class.is_retryable()
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// All stages passed
    #[serde(rename_all = "camelCase")]
    Pass {
        /// The validated model output
        model_output: ModelOutput,

        /// Aggregates derived from the output and the fixture
        derived_analysis: DerivedAnalysis,
    },

    /// A stage failed
    #[serde(rename_all = "camelCase")]
    Fail {
        /// Which failure class the run terminated with
        error_class: ErrorClass,

        /// Every violation the failing stage found; never empty
        diagnostics: Vec<Diagnostic>,
    },
}

impl AnalysisOutcome {
    /// Whether the run passed.
    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisOutcome::Pass { .. })
    }

    /// Failure class, if the run failed.
    pub fn error_class(&self) -> Option<ErrorClass> {
        match self {
            AnalysisOutcome::Pass { .. } => None,
            AnalysisOutcome::Fail { error_class, .. } => Some(*error_class),
        }
    }

    /// Diagnostics of a failed run; empty for a pass.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            AnalysisOutcome::Pass { .. } => &[],
            AnalysisOutcome::Fail { diagnostics, .. } => diagnostics,
        }
    }
}

/// The composed validation-and-derivation pipeline.
///
/// Owns the precompiled derived-analysis bounds table; construct once and
/// share freely, every method is `&self` over immutable data.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    derived_contract: DerivedContract,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisPipeline {
    /// Pipeline with the default derived-analysis bounds.
    pub fn new() -> Self {
        Self {
            derived_contract: DerivedContract::default(),
        }
    }

    /// Pipeline with custom derived-analysis bounds.
    pub fn with_contract(derived_contract: DerivedContract) -> Self {
        Self { derived_contract }
    }

    /// Run all stages over one raw response.
    pub fn run(
        &self,
        raw: &str,
        fixture: &QuizFixture,
        options: &SemanticOptions,
    ) -> AnalysisOutcome {
        debug!("stage {}: {} bytes of response text", PipelineStage::Parsing, raw.len());
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                return self.fail(
                    PipelineStage::Parsing,
                    ErrorClass::ParseFail,
                    vec![Diagnostic::new("$", format!("response is not valid JSON: {err}"))],
                );
            }
        };

        debug!("stage {}", PipelineStage::ShapeChecking);
        let (typed, diags) = validate_shape(&value);
        if !diags.is_empty() {
            return self.fail(PipelineStage::ShapeChecking, ErrorClass::SchemaFail, diags);
        }
        let Some(output) = typed else {
            // validate_shape guarantees Some on empty diagnostics; reaching
            // this arm is a bug in the validator itself
            return self.fail(
                PipelineStage::ShapeChecking,
                ErrorClass::RuntimeFail,
                vec![Diagnostic::new("$", "shape validator returned no output without diagnostics")],
            );
        };

        debug!(
            "stage {}: {} students against quiz {}",
            PipelineStage::SemanticChecking,
            output.students.len(),
            fixture.quiz_id
        );
        let diags = validate_semantics(&output, fixture, options);
        if !diags.is_empty() {
            return self.fail(PipelineStage::SemanticChecking, ErrorClass::SemanticFail, diags);
        }

        debug!("stage {}", PipelineStage::Deriving);
        let derived = match derive_analysis(&output, fixture) {
            Ok(derived) => derived,
            Err(err) => {
                return self.fail(
                    PipelineStage::Deriving,
                    ErrorClass::RuntimeFail,
                    vec![Diagnostic::new("$", err.to_string())],
                );
            }
        };

        debug!("stage {}", PipelineStage::DerivedChecking);
        let diags = validate_derived(&derived, &self.derived_contract);
        if !diags.is_empty() {
            return self.fail(PipelineStage::DerivedChecking, ErrorClass::RuntimeFail, diags);
        }

        debug!("stage {}", PipelineStage::Done);
        AnalysisOutcome::Pass {
            model_output: output,
            derived_analysis: derived,
        }
    }

    fn fail(
        &self,
        stage: PipelineStage,
        error_class: ErrorClass,
        diagnostics: Vec<Diagnostic>,
    ) -> AnalysisOutcome {
        warn!(
            "stage {stage} failed as {error_class} with {} diagnostic(s)",
            diagnostics.len()
        );
        AnalysisOutcome::Fail {
            error_class,
            diagnostics,
        }
    }
}

/// Run the pipeline once with default semantic options.
pub fn analyze(raw: &str, fixture: &QuizFixture) -> AnalysisOutcome {
    AnalysisPipeline::new().run(raw, fixture, &SemanticOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RiskLevel;
    use crate::fixture::{QuizQuestion, StudentRecord};
    use serde_json::json;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn question(question_id: &str, concept: &str) -> QuizQuestion {
        QuizQuestion {
            item_id: format!("item-{question_id}"),
            question_id: question_id.to_string(),
            concept: concept.to_string(),
            text: format!("{concept}?"),
            question_type: "multiple-choice".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answers: vec!["a".to_string()],
            max_score: 20.0,
        }
    }

    fn record(student_id: &str, score: f64) -> StudentRecord {
        StudentRecord {
            student_id: student_id.to_string(),
            display_name: student_id.to_string(),
            score,
            max_score: 40.0,
            attempted_question_ids: vec!["Q1".to_string(), "Q2".to_string()],
            incorrect_question_ids: vec!["Q2".to_string()],
        }
    }

    fn two_student_fixture() -> QuizFixture {
        QuizFixture {
            quiz_id: "quiz-1".to_string(),
            title: "Fractions unit check".to_string(),
            questions: vec![question("Q1", "fractions"), question("Q2", "fractions")],
            students: vec![record("student-ada", 20.0), record("student-bob", 30.0)],
        }
    }

    fn student_entry(student_id: &str, risk_level: &str) -> serde_json::Value {
        json!({
            "studentId": student_id,
            "riskLevel": risk_level,
            "misconceptions": [
                {
                    "concept": "fractions",
                    "errorType": "procedural",
                    "affectedQuestions": ["Q2"],
                    "evidence": "added denominators"
                }
            ],
            "interventions": [
                {
                    "type": "worksheet",
                    "focusArea": "fractions",
                    "action": "assign the common-denominator worksheet"
                }
            ],
            "rationale": "one recurring procedural slip"
        })
    }

    fn clean_response() -> String {
        json!({
            "students": [
                student_entry("student-ada", "critical"),
                student_entry("student-bob", "low"),
            ]
        })
        .to_string()
    }

    #[test]
    fn malformed_json_is_a_parse_fail() {
        init_logging();
        let outcome = analyze("{not json", &two_student_fixture());
        assert_eq!(outcome.error_class(), Some(ErrorClass::ParseFail));
        assert_eq!(outcome.diagnostics().len(), 1);
        assert_eq!(outcome.diagnostics()[0].path, "$");
    }

    #[test]
    fn contract_violations_are_a_schema_fail() {
        let raw = json!({ "students": [ { "studentId": "student-ada" } ] }).to_string();
        let outcome = analyze(&raw, &two_student_fixture());
        assert_eq!(outcome.error_class(), Some(ErrorClass::SchemaFail));
        assert!(outcome.diagnostics().len() >= 4);
    }

    #[test]
    fn missing_student_is_a_semantic_fail_citing_the_id() {
        init_logging();
        let raw = json!({ "students": [ student_entry("student-ada", "low") ] }).to_string();
        let outcome = analyze(&raw, &two_student_fixture());
        assert_eq!(outcome.error_class(), Some(ErrorClass::SemanticFail));
        assert!(outcome
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("student-bob")));
    }

    #[test]
    fn duplicated_student_is_a_semantic_fail() {
        let raw = json!({
            "students": [
                student_entry("student-ada", "low"),
                student_entry("student-ada", "low"),
            ]
        })
        .to_string();
        let outcome = analyze(&raw, &two_student_fixture());
        assert_eq!(outcome.error_class(), Some(ErrorClass::SemanticFail));
        assert!(outcome
            .diagnostics()
            .iter()
            .any(|d| d.path == "$.students[1].studentId"));
    }

    #[test]
    fn unknown_question_reference_points_at_its_index() {
        let mut entry = student_entry("student-ada", "low");
        entry["misconceptions"][0]["affectedQuestions"] = json!(["Q999"]);
        let raw = json!({
            "students": [entry, student_entry("student-bob", "low")]
        })
        .to_string();
        let outcome = analyze(&raw, &two_student_fixture());
        assert_eq!(outcome.error_class(), Some(ErrorClass::SemanticFail));
        assert_eq!(
            outcome.diagnostics()[0].path,
            "$.students[0].misconceptions[0].affectedQuestions[0]"
        );
    }

    #[test]
    fn clean_pass_yields_reference_aggregates() {
        init_logging();
        let outcome = analyze(&clean_response(), &two_student_fixture());
        let AnalysisOutcome::Pass {
            model_output,
            derived_analysis,
        } = outcome
        else {
            panic!("expected a pass, got {outcome:?}");
        };

        assert_eq!(model_output.students.len(), 2);

        let distribution = &derived_analysis.risk_distribution;
        let rendered: Vec<(RiskLevel, u32, f64)> = distribution
            .iter()
            .map(|s| (s.level, s.students, s.percentage))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (RiskLevel::Critical, 1, 50.0),
                (RiskLevel::High, 0, 0.0),
                (RiskLevel::Medium, 0, 0.0),
                (RiskLevel::Low, 1, 50.0),
            ]
        );

        assert_eq!(derived_analysis.score_metrics.average_score, 62.5);
        assert_eq!(derived_analysis.score_metrics.median_score, 62.5);
        assert_eq!(derived_analysis.score_metrics.average_completion, 100.0);
    }

    #[test]
    fn identical_inputs_produce_identical_outcomes() {
        let fixture = two_student_fixture();
        let raw = clean_response();
        assert_eq!(analyze(&raw, &fixture), analyze(&raw, &fixture));

        let bad = "{not json";
        assert_eq!(analyze(bad, &fixture), analyze(bad, &fixture));
    }

    #[test]
    fn tightened_derived_contract_turns_into_a_runtime_fail() {
        let contract = DerivedContract {
            max_count: 0,
            ..DerivedContract::default()
        };
        let pipeline = AnalysisPipeline::with_contract(contract);
        let outcome = pipeline.run(
            &clean_response(),
            &two_student_fixture(),
            &SemanticOptions::default(),
        );
        assert_eq!(outcome.error_class(), Some(ErrorClass::RuntimeFail));
        assert!(!outcome.error_class().map(is_retryable).unwrap_or(true));
    }

    #[test]
    fn retryability_follows_attribution() {
        assert!(is_retryable(ErrorClass::ParseFail));
        assert!(is_retryable(ErrorClass::SchemaFail));
        assert!(is_retryable(ErrorClass::SemanticFail));
        assert!(!is_retryable(ErrorClass::RuntimeFail));
    }

    #[test]
    fn outcome_serializes_with_tag_and_wire_names() {
        let outcome = analyze("{not json", &two_student_fixture());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "fail");
        assert_eq!(value["errorClass"], "parse_fail");
        assert!(value["diagnostics"].as_array().is_some());

        let pass = analyze(&clean_response(), &two_student_fixture());
        let value = serde_json::to_value(&pass).unwrap();
        assert_eq!(value["outcome"], "pass");
        assert_eq!(value["derivedAnalysis"]["scoreMetrics"]["averageScore"], 62.5);
    }

    #[test]
    fn semantic_options_flow_through_the_run() {
        let options = SemanticOptions {
            min_interventions_per_student: 2,
            ..SemanticOptions::default()
        };
        let outcome = AnalysisPipeline::new().run(
            &clean_response(),
            &two_student_fixture(),
            &options,
        );
        assert_eq!(outcome.error_class(), Some(ErrorClass::SemanticFail));
    }
}
