//! Arithmetic operations exposed by the API.

use num_bigint::BigUint;
use thiserror::Error;

/// Errors raised by arithmetic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// Divisor was zero (positive or negative).
    #[error("division by zero")]
    DivisionByZero,
}

/// Multiply two floats.
pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Divide `a` by `b`, rejecting a zero divisor.
pub fn divide(a: f64, b: f64) -> Result<f64, MathError> {
    if b == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

/// Exact `n!`.
pub fn factorial(n: u64) -> BigUint {
    (2..=n).fold(BigUint::from(1u32), |acc, i| acc * i)
}
