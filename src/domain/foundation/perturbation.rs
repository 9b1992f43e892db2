//! Perturbation direction used by sensitivity analyses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a judgment or weight is scaled down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perturbation {
    Decrease,
    Increase,
}

impl Perturbation {
    /// Both directions, decrease first.
    pub const BOTH: [Perturbation; 2] = [Perturbation::Decrease, Perturbation::Increase];

    /// Multiplicative factor for a relative variation, e.g. 0.25 -> 0.75 or 1.25.
    pub fn factor(&self, variation: f64) -> f64 {
        match self {
            Perturbation::Decrease => 1.0 - variation,
            Perturbation::Increase => 1.0 + variation,
        }
    }

    /// Returns the lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Perturbation::Decrease => "decrease",
            Perturbation::Increase => "increase",
        }
    }

    /// Past-tense verb for reports.
    pub fn verb(&self) -> &'static str {
        match self {
            Perturbation::Decrease => "decreased",
            Perturbation::Increase => "increased",
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
