//! Arithmetic subsystem.
//!
//! # Data Flow
//! ```text
//! http handler (decoded request)
//!     → ops.rs (multiply / divide / factorial)
//!     → result value (f64 or BigUint)
//!     → audit record + JSON response
//! ```
//!
//! # Design Decisions
//! - Pure functions, no shared state
//! - Float operations follow IEEE-754 semantics (NaN/Inf pass through)
//! - Factorial uses arbitrary precision so results stay exact at any size

pub mod ops;

pub use ops::{divide, factorial, multiply, MathError};
