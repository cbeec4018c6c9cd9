use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(pub i64);

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the canonical statement asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionType {
    #[default]
    Algebraic,
    Derivative,
    Integral,
    Other,
}

impl ExpressionType {
    /// Whether the statement has to be evaluated before comparison.
    pub fn is_calculus(self) -> bool {
        matches!(self, ExpressionType::Derivative | ExpressionType::Integral)
    }
}

/// A problem as stored in a problem bank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    /// Statement in answer syntax, e.g. `Derivative(x**2, x)`.
    pub canonical: String,
    /// Accepted solutions in answer syntax, tried in order.
    #[serde(default)]
    pub solutions: Vec<String>,
    #[serde(default)]
    pub expression_type: ExpressionType,
    #[serde(default)]
    pub display_problem: String,
    #[serde(default)]
    pub display_solution: String,
    /// Symbol name to predicate text, e.g. `"x": "x > 0"`.
    #[serde(default)]
    pub assumptions: BTreeMap<String, String>,
}

/// Parse a JSON array of problems.
pub fn load_problem_bank(json: &str) -> Result<Vec<Problem>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_defaults() {
        let bank = load_problem_bank(r#"[{"id": 7, "canonical": "x**2"}]"#).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].id, ProblemId(7));
        assert_eq!(bank[0].expression_type, ExpressionType::Algebraic);
        assert!(bank[0].solutions.is_empty());
        assert!(bank[0].assumptions.is_empty());
    }

    #[test]
    fn test_bank_full_entry() {
        let json = r#"[{
            "id": 1,
            "canonical": "Integral(2*x, x)",
            "solutions": ["x**2"],
            "expression_type": "integral",
            "display_problem": "\\int 2x\\,dx",
            "display_solution": "x^2",
            "assumptions": {"x": "x > 0"}
        }]"#;
        let bank = load_problem_bank(json).unwrap();
        assert_eq!(bank[0].expression_type, ExpressionType::Integral);
        assert!(bank[0].expression_type.is_calculus());
        assert_eq!(bank[0].assumptions["x"], "x > 0");
    }

    #[test]
    fn test_unknown_expression_type_is_rejected() {
        assert!(load_problem_bank(r#"[{"id": 1, "canonical": "x", "expression_type": "matrix"}]"#).is_err());
    }
}
