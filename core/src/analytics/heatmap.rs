//! Concept-level heatmap across all students' misconceptions.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::contract::{ConceptHotspot, MisconceptionKind, ModelOutput};

#[derive(Default)]
struct ConceptGroup {
    students: HashSet<String>,
    questions: BTreeSet<String>,
    kind_counts: [u32; 3],
}

/// Group misconceptions by trimmed concept label.
///
/// A student touching the same concept through several questions counts once
/// toward `students_affected`; the question list is the sorted union across
/// the group; the dominant kind is the most frequent one, ties resolved by
/// canonical declared order. Output is sorted descending by affected-student
/// count, first-seen order preserved among equals.
pub fn concept_heatmap(output: &ModelOutput) -> Vec<ConceptHotspot> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, ConceptGroup> = HashMap::new();

    for student in &output.students {
        for misconception in &student.misconceptions {
            let label = misconception.concept.trim().to_string();
            let group = groups.entry(label.clone()).or_insert_with(|| {
                order.push(label.clone());
                ConceptGroup::default()
            });
            group.students.insert(student.student_id.clone());
            group
                .questions
                .extend(misconception.affected_questions.iter().cloned());
            group.kind_counts[misconception.kind.canonical_rank()] += 1;
        }
    }

    let mut hotspots: Vec<ConceptHotspot> = order
        .into_iter()
        .filter_map(|label| {
            groups.remove(&label).map(|group| ConceptHotspot {
                concept: label,
                students_affected: group.students.len() as u32,
                question_ids: group.questions.into_iter().collect(),
                dominant_kind: dominant_kind(&group.kind_counts),
            })
        })
        .collect();

    hotspots.sort_by(|a, b| b.students_affected.cmp(&a.students_affected));
    hotspots
}

/// First kind in canonical order whose count is not exceeded by a later one.
fn dominant_kind(counts: &[u32; 3]) -> MisconceptionKind {
    let mut best = MisconceptionKind::Conceptual;
    for kind in MisconceptionKind::ALL {
        if counts[kind.canonical_rank()] > counts[best.canonical_rank()] {
            best = kind;
        }
    }
    best
}
