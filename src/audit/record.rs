//! Operation record types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arithmetic operation kinds recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Multiply,
    Divide,
    Factorial,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Factorial => "factorial",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded input or result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    /// Exact decimal rendering of an arbitrary-precision integer.
    Decimal(String),
}

/// One successful computation.
///
/// Multiply and divide record `[A, B]`; factorial records `[N]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: Uuid,
    pub operation: Operation,
    pub operands: Vec<Operand>,
    pub result: Operand,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Build a record stamped with the current time.
    pub fn new(operation: Operation, operands: Vec<Operand>, result: Operand) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            operands,
            result,
            timestamp: Utc::now(),
        }
    }

    pub fn multiply(a: f64, b: f64, result: f64) -> Self {
        Self::new(
            Operation::Multiply,
            vec![Operand::Float(a), Operand::Float(b)],
            Operand::Float(result),
        )
    }

    pub fn divide(a: f64, b: f64, result: f64) -> Self {
        Self::new(
            Operation::Divide,
            vec![Operand::Float(a), Operand::Float(b)],
            Operand::Float(result),
        )
    }

    pub fn factorial(n: i64, result: String) -> Self {
        Self::new(
            Operation::Factorial,
            vec![Operand::Integer(n)],
            Operand::Decimal(result),
        )
    }
}
