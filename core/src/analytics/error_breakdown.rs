//! Misconception-kind breakdown across all students.

use crate::contract::{KindSlice, MisconceptionKind, ModelOutput};

use super::share_of;

/// Count misconceptions per kind, in canonical order.
///
/// Percentages are shares of the total misconception count across all
/// students, not per-student; all three kinds are always present, and a
/// payload with no misconceptions yields all-zero slices.
pub fn error_breakdown(output: &ModelOutput) -> Vec<KindSlice> {
    let mut counts = [0usize; 3];
    for student in &output.students {
        for misconception in &student.misconceptions {
            counts[misconception.kind.canonical_rank()] += 1;
        }
    }
    let total: usize = counts.iter().sum();

    MisconceptionKind::ALL
        .iter()
        .map(|&kind| {
            let count = counts[kind.canonical_rank()];
            KindSlice {
                kind,
                count: count as u32,
                percentage: share_of(count, total),
            }
        })
        .collect()
}
