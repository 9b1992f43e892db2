//! Domain layer containing the decision engines and program models.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (criterion types, orientation, errors)
//! - `mcdm` - AHP, TOPSIS and DEA engines plus the linear program solver
//! - `pricing` - Incentive, pricing-scenario and plan-efficiency models

pub mod foundation;
pub mod mcdm;
pub mod pricing;
