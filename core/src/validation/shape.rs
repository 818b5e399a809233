//! # Shape Validator
//!
//! Recursive, hand-rolled validation of an untyped JSON value against the
//! model-output contract. A declarative schema engine could express the same
//! checks, but the diagnostics here must be maximally specific (exact path,
//! expected form, received value) because the route layer feeds them back
//! into a retry request against the generative source, and a vague diagnostic
//! produces a vague retry.
//!
//! The walk never stops at the first problem: every violation in the tree is
//! accumulated, and the typed [`ModelOutput`] is produced only when the
//! diagnostics list comes back empty. Wrong-typed values are omitted from the
//! partially built structure, never coerced.

use serde_json::{Map, Value};

use crate::contract::{
    is_valid_question_id, is_valid_student_id, Intervention, InterventionKind, Misconception,
    MisconceptionKind, ModelOutput, RiskLevel, StudentAnalysis, MAX_AFFECTED_QUESTIONS,
    MAX_INTERVENTIONS_PER_STUDENT, MAX_MISCONCEPTIONS_PER_STUDENT, MAX_STUDENTS_PER_PAYLOAD,
    MIN_AFFECTED_QUESTIONS, MIN_INTERVENTIONS_PER_STUDENT, MIN_MISCONCEPTIONS_PER_STUDENT,
    MIN_STUDENTS_PER_PAYLOAD,
};
use crate::diagnostics::{Diagnostic, DiagnosticPath};

const ROOT_KEYS: &[&str] = &["students"];
const STUDENT_KEYS: &[&str] = &[
    "studentId",
    "riskLevel",
    "misconceptions",
    "interventions",
    "rationale",
];
const MISCONCEPTION_KEYS: &[&str] = &["concept", "errorType", "affectedQuestions", "evidence"];
const INTERVENTION_KEYS: &[&str] = &["type", "focusArea", "action"];

/// Validate a parsed JSON value against the model-output contract.
///
/// Returns the typed output together with all diagnostics found; the output
/// is `Some` exactly when the diagnostics list is empty.
pub fn validate_shape(value: &Value) -> (Option<ModelOutput>, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let root = DiagnosticPath::root();

    let Some(obj) = as_object(value, &root, "payload", &mut diags) else {
        return (None, diags);
    };
    flag_unexpected_keys(obj, ROOT_KEYS, &root, &mut diags);

    let Some(students_value) = require_key(obj, "students", &root, &mut diags) else {
        return (None, diags);
    };

    let students_path = root.key("students");
    let Some(entries) = as_array(students_value, &students_path, &mut diags) else {
        return (None, diags);
    };
    check_len(
        entries.len(),
        MIN_STUDENTS_PER_PAYLOAD,
        MAX_STUDENTS_PER_PAYLOAD,
        &students_path,
        &mut diags,
    );

    // Recurse into every entry regardless of earlier findings so the
    // diagnostics cover the whole tree in one pass.
    let students: Option<Vec<StudentAnalysis>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_student(entry, &students_path.index(i), &mut diags))
        .collect();

    match (students, diags.is_empty()) {
        (Some(students), true) => (Some(ModelOutput { students }), diags),
        (_, _) => (None, diags),
    }
}

fn parse_student(
    value: &Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<StudentAnalysis> {
    let obj = as_object(value, path, "student entry", diags)?;
    flag_unexpected_keys(obj, STUDENT_KEYS, path, diags);

    // Every field is checked independently before any early return, so one
    // bad field never hides a sibling's violations.
    let student_id = pattern_field(
        obj,
        "studentId",
        is_valid_student_id,
        "an identifier matching student-[a-z0-9-]+",
        path,
        diags,
    );
    let risk_level = enum_field(
        obj,
        "riskLevel",
        RiskLevel::parse,
        "one of critical|high|medium|low",
        path,
        diags,
    );
    let misconceptions = list_field(
        obj,
        "misconceptions",
        MIN_MISCONCEPTIONS_PER_STUDENT,
        MAX_MISCONCEPTIONS_PER_STUDENT,
        path,
        diags,
        parse_misconception,
    );
    let interventions = list_field(
        obj,
        "interventions",
        MIN_INTERVENTIONS_PER_STUDENT,
        MAX_INTERVENTIONS_PER_STUDENT,
        path,
        diags,
        parse_intervention,
    );
    let rationale = text_field(obj, "rationale", path, diags);

    Some(StudentAnalysis {
        student_id: student_id?,
        risk_level: risk_level?,
        misconceptions: misconceptions?,
        interventions: interventions?,
        rationale: rationale?,
    })
}

fn parse_misconception(
    value: &Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<Misconception> {
    let obj = as_object(value, path, "misconception entry", diags)?;
    flag_unexpected_keys(obj, MISCONCEPTION_KEYS, path, diags);

    let concept = text_field(obj, "concept", path, diags);
    let kind = enum_field(
        obj,
        "errorType",
        MisconceptionKind::parse,
        "one of conceptual|procedural|careless",
        path,
        diags,
    );
    let affected_questions = list_field(
        obj,
        "affectedQuestions",
        MIN_AFFECTED_QUESTIONS,
        MAX_AFFECTED_QUESTIONS,
        path,
        diags,
        parse_question_ref,
    );
    let evidence = text_field(obj, "evidence", path, diags);

    Some(Misconception {
        concept: concept?,
        kind: kind?,
        affected_questions: affected_questions?,
        evidence: evidence?,
    })
}

fn parse_intervention(
    value: &Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<Intervention> {
    let obj = as_object(value, path, "intervention entry", diags)?;
    flag_unexpected_keys(obj, INTERVENTION_KEYS, path, diags);

    let kind = enum_field(
        obj,
        "type",
        InterventionKind::parse,
        "one of worksheet|video|mini-quiz",
        path,
        diags,
    );
    let focus_area = text_field(obj, "focusArea", path, diags);
    let action = text_field(obj, "action", path, diags);

    Some(Intervention {
        kind: kind?,
        focus_area: focus_area?,
        action: action?,
    })
}

fn parse_question_ref(
    value: &Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<String> {
    let raw = as_string(value, path, diags)?;
    if is_valid_question_id(raw) {
        Some(raw.to_string())
    } else {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "identifier does not match the question ID pattern",
            "Q followed by one or more digits",
            format!("{raw:?}"),
        ));
        None
    }
}

// ---------------------------------------------------------------------------
// Field helpers. Each pushes its own diagnostics and yields None on failure.
// ---------------------------------------------------------------------------

fn as_object<'a>(
    value: &'a Value,
    path: &DiagnosticPath,
    what: &str,
    diags: &mut Vec<Diagnostic>,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            diags.push(Diagnostic::with_detail(
                path.as_str(),
                format!("{what} must be a JSON object"),
                "object",
                json_type_name(other),
            ));
            None
        }
    }
}

fn as_array<'a>(
    value: &'a Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<&'a [Value]> {
    match value {
        Value::Array(entries) => Some(entries),
        other => {
            diags.push(Diagnostic::with_detail(
                path.as_str(),
                "value must be a JSON array",
                "array",
                json_type_name(other),
            ));
            None
        }
    }
}

fn as_string<'a>(
    value: &'a Value,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<&'a str> {
    match value {
        Value::String(raw) => Some(raw),
        other => {
            diags.push(Diagnostic::with_detail(
                path.as_str(),
                "value must be a JSON string",
                "string",
                json_type_name(other),
            ));
            None
        }
    }
}

fn require_key<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    parent: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<&'a Value> {
    match obj.get(key) {
        Some(value) => Some(value),
        None => {
            diags.push(Diagnostic::new(
                parent.key(key).as_str(),
                "required key is missing",
            ));
            None
        }
    }
}

fn flag_unexpected_keys(
    obj: &Map<String, Value>,
    allowed: &[&str],
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            diags.push(Diagnostic::new(path.key(key).as_str(), "unexpected key"));
        }
    }
}

fn check_len(
    len: usize,
    min: usize,
    max: usize,
    path: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) {
    if len < min || len > max {
        diags.push(Diagnostic::with_detail(
            path.as_str(),
            "array length outside allowed bounds",
            format!("between {min} and {max} entries"),
            format!("{len} entries"),
        ));
    }
}

/// Required string field whose trimmed content must be non-empty.
fn text_field(
    obj: &Map<String, Value>,
    key: &str,
    parent: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<String> {
    let field_path = parent.key(key);
    let value = require_key(obj, key, parent, diags)?;
    let raw = as_string(value, &field_path, diags)?;
    if raw.trim().is_empty() {
        diags.push(Diagnostic::with_detail(
            field_path.as_str(),
            "value must be a non-empty string",
            "non-empty text",
            format!("{raw:?}"),
        ));
        return None;
    }
    Some(raw.to_string())
}

/// Required string field constrained by an identifier pattern.
fn pattern_field(
    obj: &Map<String, Value>,
    key: &str,
    matches: fn(&str) -> bool,
    expected: &str,
    parent: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<String> {
    let field_path = parent.key(key);
    let value = require_key(obj, key, parent, diags)?;
    let raw = as_string(value, &field_path, diags)?;
    if matches(raw) {
        Some(raw.to_string())
    } else {
        diags.push(Diagnostic::with_detail(
            field_path.as_str(),
            "identifier does not match the required pattern",
            expected,
            format!("{raw:?}"),
        ));
        None
    }
}

/// Required string field constrained to a closed vocabulary.
fn enum_field<T>(
    obj: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
    expected: &str,
    parent: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
) -> Option<T> {
    let field_path = parent.key(key);
    let value = require_key(obj, key, parent, diags)?;
    let raw = as_string(value, &field_path, diags)?;
    match parse(raw) {
        Some(parsed) => Some(parsed),
        None => {
            diags.push(Diagnostic::with_detail(
                field_path.as_str(),
                "value outside the allowed set",
                expected,
                format!("{raw:?}"),
            ));
            None
        }
    }
}

/// Required array field with length bounds and a per-entry parser.
///
/// Entries are parsed even when the length bound is violated, so entry-level
/// diagnostics are still collected alongside the bound diagnostic.
fn list_field<T>(
    obj: &Map<String, Value>,
    key: &str,
    min: usize,
    max: usize,
    parent: &DiagnosticPath,
    diags: &mut Vec<Diagnostic>,
    parse_entry: fn(&Value, &DiagnosticPath, &mut Vec<Diagnostic>) -> Option<T>,
) -> Option<Vec<T>> {
    let field_path = parent.key(key);
    let value = require_key(obj, key, parent, diags)?;
    let entries = as_array(value, &field_path, diags)?;
    check_len(entries.len(), min, max, &field_path, diags);

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_entry(entry, &field_path.index(i), diags))
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
