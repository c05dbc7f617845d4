//! Numeric comparison operators used by requirement data and modifier trees

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Comparison between a reported value and a static operand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Eq,
    Gt,
    Lt,
    #[default]
    Ge,
    Le,
}

impl ComparisonOp {
    /// Decodes the numeric operator code used by static rows
    /// (0 `==`, 1 `>`, 2 `<`, 3 `>=`, 4 `<=`).
    pub fn from_code(code: u32) -> Result<Self, DomainError> {
        match code {
            0 => Ok(ComparisonOp::Eq),
            1 => Ok(ComparisonOp::Gt),
            2 => Ok(ComparisonOp::Lt),
            3 => Ok(ComparisonOp::Ge),
            4 => Ok(ComparisonOp::Le),
            other => Err(DomainError::validation(format!(
                "unknown comparison operator code {}",
                other
            ))),
        }
    }

    /// `reported <op> operand`
    pub fn compare(self, reported: u64, operand: u64) -> bool {
        match self {
            ComparisonOp::Eq => reported == operand,
            ComparisonOp::Gt => reported > operand,
            ComparisonOp::Lt => reported < operand,
            ComparisonOp::Ge => reported >= operand,
            ComparisonOp::Le => reported <= operand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_row_codes() {
        assert_eq!(ComparisonOp::from_code(0), Ok(ComparisonOp::Eq));
        assert_eq!(ComparisonOp::from_code(3), Ok(ComparisonOp::Ge));
        assert!(ComparisonOp::from_code(5).is_err());
    }

    #[test]
    fn compares_reported_against_operand() {
        assert!(ComparisonOp::Ge.compare(10, 10));
        assert!(!ComparisonOp::Gt.compare(10, 10));
        assert!(ComparisonOp::Lt.compare(9, 10));
        assert!(ComparisonOp::Le.compare(10, 10));
        assert!(ComparisonOp::Eq.compare(4, 4));
        assert!(!ComparisonOp::Eq.compare(4, 5));
    }
}
