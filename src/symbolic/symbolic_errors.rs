//! Error taxonomy shared by the parser, the simplifier, the solver and
//! expression evaluation. Every fallible operation in the crate returns
//! `SymbolicResult` and propagates one of these variants to the caller;
//! there is no global error state and each call is independent.

use thiserror::Error;

/// Errors raised while parsing, rewriting, solving or evaluating
/// symbolic expressions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    /// A divisor was the constant zero, detected structurally during
    /// rewriting or numerically during evaluation.
    #[error("Division by Zero")]
    DivisionByZero,
    /// Right operand of a modulus was the constant zero.
    #[error("Mod by zero is undefined")]
    ModulusByZero,
    /// Logarithm of a non-positive value. Raised at evaluation time only;
    /// rewriting and solving manipulate logarithms symbolically.
    #[error("Logarithm of non-positive number")]
    LogDomain,
    /// Evaluation reached a variable other than the one a value was
    /// supplied for.
    #[error("variable '{0}' is not bound to a value")]
    UnboundVariable(String),
    /// The operation is recognized but has no closed-form handling.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// An operator or node reached a dispatch that cannot process it.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// Parser-level failure: unexpected token, missing delimiter or
    /// trailing input.
    #[error("syntax error: {0}")]
    Syntax(String),
}

pub type SymbolicResult<T> = Result<T, SymbolicError>;
