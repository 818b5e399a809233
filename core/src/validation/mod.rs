//! # Validation Stages
//!
//! Three diagnostic-accumulating validators, one per pipeline stage:
//!
//! - [`shape`] narrows an untyped `serde_json::Value` into the typed
//!   [`ModelOutput`](crate::contract::ModelOutput) contract, field by field.
//! - [`semantic`] cross-checks a shape-valid output against the trusted
//!   [`QuizFixture`](crate::fixture::QuizFixture).
//! - [`derived`] asserts the analytics builders' own output against the
//!   derived-analysis bounds table.
//!
//! All three share one discipline: every violation found anywhere is
//! collected before returning. No stage stops at the first problem, so a
//! caller sees the complete picture of a bad payload in a single pass.

pub mod derived;
pub mod semantic;
pub mod shape;

pub use self::derived::validate_derived;
pub use self::semantic::{validate_semantics, SemanticOptions};
pub use self::shape::validate_shape;
