//! SESP MCDM - Multi-criteria decision engine for subscription appliance pricing
//!
//! This crate implements AHP, TOPSIS and DEA, and applies them to the
//! incentive criteria, pricing scenarios and subscription plans of the
//! program.

pub mod application;
pub mod config;
pub mod domain;
