//! DEA model orientation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AnalysisError;

/// Direction in which a DEA model projects a unit onto the frontier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Shrink inputs, holding outputs fixed. Efficiency is θ.
    Input,
    /// Expand outputs, holding inputs fixed. Efficiency is 1/φ.
    #[default]
    Output,
}

impl Orientation {
    /// Returns the lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Input => "input",
            Orientation::Output => "output",
        }
    }
}

impl FromStr for Orientation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Ok(Orientation::Input),
            "output" => Ok(Orientation::Output),
            _ => Err(AnalysisError::UnknownOrientation(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
