//! # Derived-Shape Validator
//!
//! Self-check of the analytics builders' output against the
//! [`DerivedContract`] bounds table. The builders are pure arithmetic over
//! already-validated input, so a violation here is an internal bug; the
//! pipeline classifies it as a runtime failure and never attributes it to the
//! generative source. Like every stage, all violations are collected before
//! returning.

use crate::contract::{DerivedAnalysis, DerivedContract, MisconceptionKind, RiskLevel};
use crate::diagnostics::{Diagnostic, DiagnosticPath};

/// Validate a derived analysis against the bounds table.
pub fn validate_derived(analysis: &DerivedAnalysis, contract: &DerivedContract) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let root = DiagnosticPath::root();

    check_risk_distribution(analysis, contract, &root, &mut diags);
    check_score_metrics(analysis, contract, &root, &mut diags);
    check_heatmap(analysis, contract, &root, &mut diags);
    check_breakdown(analysis, contract, &root, &mut diags);

    diags
}

fn check_risk_distribution(
    analysis: &DerivedAnalysis,
    contract: &DerivedContract,
    root: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    let path = root.key("riskDistribution");
    let levels: Vec<RiskLevel> = analysis.risk_distribution.iter().map(|s| s.level).collect();
    if levels != RiskLevel::ALL {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "risk levels must each appear exactly once in declared order",
            "critical, high, medium, low",
            format!("{levels:?}"),
        ));
    }

    for (i, slice) in analysis.risk_distribution.iter().enumerate() {
        let entry_path = path.index(i);
        check_count(slice.students, contract, &entry_path.key("students"), diags);
        check_percentage(slice.percentage, contract, &entry_path.key("percentage"), diags);
    }
}

fn check_score_metrics(
    analysis: &DerivedAnalysis,
    contract: &DerivedContract,
    root: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    let path = root.key("scoreMetrics");
    let metrics = &analysis.score_metrics;
    check_percentage(metrics.average_score, contract, &path.key("averageScore"), diags);
    check_percentage(metrics.median_score, contract, &path.key("medianScore"), diags);
    check_percentage(
        metrics.average_completion,
        contract,
        &path.key("averageCompletion"),
        diags,
    );
}

fn check_heatmap(
    analysis: &DerivedAnalysis,
    contract: &DerivedContract,
    root: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    let path = root.key("conceptHeatmap");
    let (min_len, max_len) = contract.concept_len;
    let (min_questions, max_questions) = contract.question_list_len;

    for (i, hotspot) in analysis.concept_heatmap.iter().enumerate() {
        let entry_path = path.index(i);

        let label_len = hotspot.concept.chars().count();
        if label_len < min_len || label_len > max_len {
            diags.push(Diagnostic::with_detail(
                entry_path.key("concept").as_str(),
                "concept label length outside allowed bounds",
                format!("between {min_len} and {max_len} characters"),
                format!("{label_len} characters"),
            ));
        }

        if hotspot.students_affected == 0 {
            diags.push(Diagnostic::new(
                entry_path.key("studentsAffected").as_str(),
                "hotspot cannot exist without an affected student",
            ));
        }
        check_count(hotspot.students_affected, contract, &entry_path.key("studentsAffected"), diags);

        let question_count = hotspot.question_ids.len();
        if question_count < min_questions || question_count > max_questions {
            diags.push(Diagnostic::with_detail(
                entry_path.key("questionIds").as_str(),
                "question list length outside allowed bounds",
                format!("between {min_questions} and {max_questions} entries"),
                format!("{question_count} entries"),
            ));
        }
        if hotspot.question_ids.windows(2).any(|pair| pair[0] >= pair[1]) {
            diags.push(Diagnostic::new(
                entry_path.key("questionIds").as_str(),
                "question list must be sorted ascending without duplicates",
            ));
        }
    }
}

fn check_breakdown(
    analysis: &DerivedAnalysis,
    contract: &DerivedContract,
    root: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    let path = root.key("errorBreakdown");
    let kinds: Vec<MisconceptionKind> = analysis.error_breakdown.iter().map(|s| s.kind).collect();
    if kinds != MisconceptionKind::ALL {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "misconception kinds must each appear exactly once in canonical order",
            "conceptual, procedural, careless",
            format!("{kinds:?}"),
        ));
    }

    for (i, slice) in analysis.error_breakdown.iter().enumerate() {
        let entry_path = path.index(i);
        check_count(slice.count, contract, &entry_path.key("count"), diags);
        check_percentage(slice.percentage, contract, &entry_path.key("percentage"), diags);
    }
}

fn check_count(
    count: u32,
    contract: &DerivedContract,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    if count > contract.max_count {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "count exceeds the contract ceiling",
            format!("at most {}", contract.max_count),
            count.to_string(),
        ));
    }
}

fn check_percentage(
    value: f64,
    contract: &DerivedContract,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    let (min, max) = contract.percentage_range;
    if !value.is_finite() || value < min || value > max {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "percentage outside allowed range",
            format!("{min} to {max}"),
            value.to_string(),
        ));
    }
}
