//! # Classroom Analytics Builders
//!
//! Four independent pure functions compute the classroom aggregates from
//! validated model output and the trusted fixture. The model is believed only
//! for qualitative, per-student reasoning (risk levels, misconceptions,
//! interventions); every number is recomputed here. A model that asserts
//! plausible-looking summary statistics is simply never read.
//!
//! Each builder is deterministic and total over validated input. The only
//! failure mode is [`AnalyticsError`], a guard against non-finite arithmetic
//! artifacts, which the pipeline converts into a runtime-class failure rather
//! than letting it propagate.

pub mod error_breakdown;
pub mod heatmap;
pub mod risk;
pub mod score;

pub use self::error_breakdown::error_breakdown;
pub use self::heatmap::concept_heatmap;
pub use self::risk::risk_distribution;
pub use self::score::score_metrics;

use log::warn;
use thiserror::Error;

use crate::contract::{DerivedAnalysis, ModelOutput};
use crate::fixture::QuizFixture;

/// Internal aggregation failure. Unreachable when shape and semantic
/// validation passed; surfaced so the pipeline can classify it instead of
/// panicking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// An aggregate produced a non-finite number
    #[error("aggregation produced a non-finite {metric}: {value}")]
    NonFinite {
        /// Which metric went bad
        metric: &'static str,
        /// The offending value
        value: f64,
    },
}

/// Result alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Compute all four aggregates from validated output and the fixture.
pub fn derive_analysis(
    output: &ModelOutput,
    fixture: &QuizFixture,
) -> AnalyticsResult<DerivedAnalysis> {
    let analysis = DerivedAnalysis {
        risk_distribution: risk_distribution(output),
        score_metrics: score_metrics(fixture),
        concept_heatmap: concept_heatmap(output),
        error_breakdown: error_breakdown(output),
    };
    ensure_finite(&analysis)?;
    Ok(analysis)
}

fn ensure_finite(analysis: &DerivedAnalysis) -> AnalyticsResult<()> {
    let metrics = &analysis.score_metrics;
    let named: [(&'static str, f64); 3] = [
        ("average score", metrics.average_score),
        ("median score", metrics.median_score),
        ("average completion", metrics.average_completion),
    ];
    for (metric, value) in named {
        check_finite(metric, value)?;
    }
    for slice in &analysis.risk_distribution {
        check_finite("risk percentage", slice.percentage)?;
    }
    for slice in &analysis.error_breakdown {
        check_finite("breakdown percentage", slice.percentage)?;
    }
    Ok(())
}

fn check_finite(metric: &'static str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        warn!("analytics guard tripped: non-finite {metric} ({value})");
        Err(AnalyticsError::NonFinite { metric, value })
    }
}

/// Round to 2 decimals, the precision every derived percentage carries.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part` as a rounded percentage of `whole`; 0 when `whole` is 0.
pub(crate) fn share_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / whole as f64)
    }
}
