//! # QUIZSIGHT Core
//!
//! Validation-and-derivation pipeline for generative-AI classroom analytics.
//!
//! A language model is asked to analyze quiz results and returns free-form
//! JSON. That payload is untrusted: it may be malformed, cite students or
//! questions that do not exist, or assert fabricated numbers. This crate is
//! the boundary that turns such a payload into values a dashboard can render
//! safely:
//!
//! 1. **Shape validation**: the parsed JSON is checked field by field
//!    against a strict contract, collecting every violation in one pass.
//! 2. **Semantic validation**: every identifier the model produced is
//!    cross-checked against the caller-supplied quiz fixture (question bank,
//!    roster, raw scores).
//! 3. **Derivation**: classroom aggregates (risk distribution, score
//!    metrics, concept heatmap, error breakdown) are recomputed from trusted
//!    data; the model is never believed about arithmetic.
//! 4. **Self-check**: the derived aggregates are validated against their own
//!    contract before being handed to the caller.
//!
//! Every failure is classified (`parse_fail`, `schema_fail`, `semantic_fail`,
//! `runtime_fail`) and carries structured diagnostics so an upstream retry
//! loop can feed the complete violation list back to the generative source.
//! The pipeline is synchronous, deterministic, and never panics or raises for
//! malformed input.

pub mod analytics;
pub mod contract;
pub mod diagnostics;
pub mod fixture;
pub mod pipeline;
pub mod validation;

pub use self::analytics::{derive_analysis, AnalyticsError, AnalyticsResult};
pub use self::contract::{
    ConceptHotspot, DerivedAnalysis, DerivedContract, Intervention, InterventionKind, KindSlice,
    Misconception, MisconceptionKind, ModelOutput, RiskLevel, RiskSlice, ScoreMetrics,
    StudentAnalysis,
};
pub use self::diagnostics::{Diagnostic, DiagnosticPath};
pub use self::fixture::{QuizFixture, QuizQuestion, StudentRecord};
pub use self::pipeline::{
    analyze, is_retryable, AnalysisOutcome, AnalysisPipeline, ErrorClass, PipelineStage,
};
pub use self::validation::{validate_derived, validate_semantics, validate_shape, SemanticOptions};
