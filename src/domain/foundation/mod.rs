//! Foundation module - Shared domain primitives.
//!
//! Contains the value types and error types that form the vocabulary
//! shared by the decision engines and the pricing adapters.

mod criterion_type;
mod errors;
mod orientation;
mod perturbation;

pub use criterion_type::CriterionType;
pub use errors::{AnalysisError, ErrorCode};
pub use orientation::Orientation;
pub use perturbation::Perturbation;
