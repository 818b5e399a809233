//! Risk-level distribution across the analyzed students.

use crate::contract::{ModelOutput, RiskLevel, RiskSlice};

use super::share_of;

/// Count students per risk level, in declared order.
///
/// All four levels are always present, with count 0 and percentage 0 when no
/// student holds the level; an empty payload yields percentages of 0 rather
/// than a division error.
pub fn risk_distribution(output: &ModelOutput) -> Vec<RiskSlice> {
    let total = output.students.len();
    RiskLevel::ALL
        .iter()
        .map(|&level| {
            let students = output
                .students
                .iter()
                .filter(|s| s.risk_level == level)
                .count();
            RiskSlice {
                level,
                students: students as u32,
                percentage: share_of(students, total),
            }
        })
        .collect()
}
