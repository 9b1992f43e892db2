//! Criterion orientation for TOPSIS (benefit or cost).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AnalysisError;

/// Whether higher or lower values of a criterion are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionType {
    /// Higher is better.
    Benefit,
    /// Lower is better.
    Cost,
}

impl CriterionType {
    /// Returns the lowercase tag used in problem files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionType::Benefit => "benefit",
            CriterionType::Cost => "cost",
        }
    }

    /// Returns true if higher values are preferred.
    pub fn is_benefit(&self) -> bool {
        matches!(self, CriterionType::Benefit)
    }

    /// Parses a list of tags, failing on the first unknown one.
    pub fn parse_all<S: AsRef<str>>(tags: &[S]) -> Result<Vec<Self>, AnalysisError> {
        tags.iter().map(|t| t.as_ref().parse()).collect()
    }
}

impl FromStr for CriterionType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benefit" => Ok(CriterionType::Benefit),
            "cost" => Ok(CriterionType::Cost),
            _ => Err(AnalysisError::UnknownCriterionType(s.to_string())),
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("benefit".parse::<CriterionType>().unwrap(), CriterionType::Benefit);
        assert_eq!("COST".parse::<CriterionType>().unwrap(), CriterionType::Cost);
        assert_eq!(" Benefit ".parse::<CriterionType>().unwrap(), CriterionType::Benefit);
    }

    #[test]
    fn rejects_unknown_tag() {
        let err = "neutral".parse::<CriterionType>().unwrap_err();
        assert_eq!(err, AnalysisError::UnknownCriterionType("neutral".to_string()));
    }

    #[test]
    fn parse_all_preserves_order() {
        let types = CriterionType::parse_all(&["benefit", "cost", "Benefit"]).unwrap();
        assert_eq!(
            types,
            vec![CriterionType::Benefit, CriterionType::Cost, CriterionType::Benefit]
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&CriterionType::Cost).unwrap();
        assert_eq!(json, "\"cost\"");
    }
}
