//! # Symbolic Engine Module
//!
//! This module provides the expression data model the whole crate operates on:
//! creating, combining, printing and evaluating symbolic expressions over one
//! free variable. It is the foundation for the simplifier and the equation
//! solver built on top of it.
//!
//! ## Purpose
//!
//! The symbolic engine allows users to:
//! - Build symbolic expressions from constants, variables and operators
//! - Evaluate expressions numerically for a given variable value
//! - Print expressions in fully parenthesized mathematical notation
//! - Substitute variables with values or other expressions
//! - Query expressions structurally (variable occurrence, postorder walk)
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! The core symbolic expression type supporting:
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Unary operations**: negation, absolute value, logarithm, exponential
//! - **Binary operations**: `+`, `-`, `*`, `/`, `^`, `mod`
//! - **Nary chains**: a transient flat form used while collecting like terms
//! - **Poly**: a marker wrapping a simplified single-variable expression
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses Box<Expr> for nested expressions,
//!    enabling arbitrarily deep mathematical structures
//!
//! 2. **Operator Overloading**: Implements std::ops traits (Add, Sub, Mul, Div,
//!    Neg) for natural mathematical syntax: `x + y * z`
//!
//! 3. **Collapsing Constructors**: building a negation of a negation yields the
//!    inner expression back, and an absolute value absorbs an inner negation,
//!    so those shapes never exist in any tree at all
//!
//! 4. **Immutability**: every operation returns a new tree; a node is never
//!    mutated after construction, so trees can be shared read-only

use crate::symbolic::symbolic_errors::{SymbolicError, SymbolicResult};
use itertools::Itertools;
use std::fmt;
use strum_macros::Display;

/// Unary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum UnaryKind {
    /// Arithmetic negation, printed as prefix `-`
    #[strum(serialize = "-")]
    Negate,
    /// Absolute value, printed as `|...|`
    #[strum(serialize = "|")]
    Absolute,
    /// Natural logarithm, printed as `log(...)`
    #[strum(serialize = "log")]
    Logarithm,
    /// Natural exponential, printed as `e^(...)`
    #[strum(serialize = "e")]
    Exponential,
}

/// Binary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum BinaryKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "^")]
    Pow,
    /// Remainder with the sign convention of the native `%` operator,
    /// printed as the word `mod`
    #[strum(serialize = "mod")]
    Mod,
}

/// Operator tags for the transient flat chain form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum NaryKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "*")]
    Mul,
}

/// Core symbolic expression enum representing mathematical expressions as an
/// abstract syntax tree.
///
/// Structural equality (`PartialEq`) compares constants by value, variables by
/// name, and operator nodes by tag and children elementwise; nodes of
/// different variants are never equal.
///
/// # Examples
/// ```rust, ignore
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = x + Expr::Const(2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numerical constant value
    Const(f64),
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Unary operation: negation, absolute value, logarithm, exponential
    Unary(UnaryKind, Box<Expr>),
    /// Binary operation: left op right
    Binary(BinaryKind, Box<Expr>, Box<Expr>),
    /// Flat chain of same-kind operands. Internal intermediate form used
    /// while gathering addition chains for like-term collection; never part
    /// of parser output or simplified output.
    Nary(NaryKind, Vec<Expr>),
    /// Marker for a simplified expression that is polynomial-shaped in the
    /// named variable. Printing and evaluation delegate to the inner
    /// expression; rewriting unwraps it first.
    Poly(Box<Expr>, String),
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Output is fully parenthesized infix. Modulus prints as the word `mod`,
/// negation as prefix `-`, absolute value as `|x|`, logarithm as `log(x)`
/// and the exponential as `e^(x)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Unary(kind, operand) => match kind {
                UnaryKind::Negate => write!(f, "-{}", operand),
                UnaryKind::Absolute => write!(f, "|{}|", operand),
                UnaryKind::Logarithm => write!(f, "log({})", operand),
                UnaryKind::Exponential => write!(f, "e^({})", operand),
            },
            Expr::Binary(kind, lhs, rhs) => write!(f, "({} {} {})", lhs, kind, rhs),
            Expr::Nary(kind, operands) => {
                let sep = format!(" {} ", kind);
                write!(f, "({})", operands.iter().format(&sep))
            }
            Expr::Poly(expression, _) => write!(f, "{}", expression),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryKind::Add, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryKind::Sub, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryKind::Mul, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Binary(BinaryKind::Div, self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::unary(UnaryKind::Negate, self)
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Builds a unary node, applying the structural collapses that hold for
    /// every tree in this crate: negating a negation yields the inner
    /// expression, and an absolute value absorbs an inner negation. The
    /// collapse happens here, at construction time, so no rewrite pass ever
    /// has to look for those shapes.
    pub fn unary(kind: UnaryKind, operand: Expr) -> Expr {
        if let Expr::Unary(UnaryKind::Negate, inner) = &operand {
            match kind {
                UnaryKind::Negate => return (**inner).clone(),
                UnaryKind::Absolute => return Expr::Unary(UnaryKind::Absolute, inner.clone()),
                _ => {}
            }
        }
        Expr::Unary(kind, Box::new(operand))
    }

    /// Builds a binary node.
    pub fn binary(kind: BinaryKind, left: Expr, right: Expr) -> Expr {
        Expr::Binary(kind, Box::new(left), Box::new(right))
    }

    /// Wraps an expression as polynomial-shaped in `variable`. The wrapped
    /// expression is simplified eagerly, so a `Poly` node always carries a
    /// canonical tree.
    pub fn polynomial(expression: Expr, variable: &str) -> SymbolicResult<Expr> {
        Ok(Expr::Poly(
            Box::new(expression.simplify()?),
            variable.to_string(),
        ))
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates the negation -(self), collapsing a double negation.
    pub fn neg(self) -> Expr {
        Expr::unary(UnaryKind::Negate, self)
    }

    /// Creates the absolute value |self|, absorbing an inner negation.
    pub fn abs(self) -> Expr {
        Expr::unary(UnaryKind::Absolute, self)
    }

    /// Creates natural logarithm log(self).
    pub fn ln(self) -> Expr {
        Expr::unary(UnaryKind::Logarithm, self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::unary(UnaryKind::Exponential, self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Binary(BinaryKind::Pow, self.boxed(), rhs.boxed())
    }

    /// Checks if expression is exactly the constant zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Const(val) => *val == 0.0,
            _ => false,
        }
    }

    //___________________________________EVALUATION____________________________________

    /// Evaluates the expression numerically with `variable` bound to `value`.
    ///
    /// Fails with `DivisionByZero` when a divisor evaluates to zero, with
    /// `ModulusByZero` when a modulus right operand evaluates to zero, with
    /// `LogDomain` when a logarithm argument evaluates non-positive, and with
    /// `UnboundVariable` when the tree contains a variable other than the
    /// bound one. Modulus keeps the native `%` remainder sign convention.
    pub fn eval(&self, variable: &str, value: f64) -> SymbolicResult<f64> {
        match self {
            Expr::Const(val) => Ok(*val),
            Expr::Var(name) => {
                if name == variable {
                    Ok(value)
                } else {
                    Err(SymbolicError::UnboundVariable(name.clone()))
                }
            }
            Expr::Unary(kind, operand) => {
                let v = operand.eval(variable, value)?;
                match kind {
                    UnaryKind::Negate => Ok(-v),
                    UnaryKind::Absolute => Ok(v.abs()),
                    UnaryKind::Logarithm => {
                        if v <= 0.0 {
                            Err(SymbolicError::LogDomain)
                        } else {
                            Ok(v.ln())
                        }
                    }
                    UnaryKind::Exponential => Ok(v.exp()),
                }
            }
            Expr::Binary(kind, lhs, rhs) => {
                let lv = lhs.eval(variable, value)?;
                let rv = rhs.eval(variable, value)?;
                match kind {
                    BinaryKind::Add => Ok(lv + rv),
                    BinaryKind::Sub => Ok(lv - rv),
                    BinaryKind::Mul => Ok(lv * rv),
                    BinaryKind::Div => {
                        if rv == 0.0 {
                            Err(SymbolicError::DivisionByZero)
                        } else {
                            Ok(lv / rv)
                        }
                    }
                    BinaryKind::Pow => Ok(lv.powf(rv)),
                    BinaryKind::Mod => {
                        if rv == 0.0 {
                            Err(SymbolicError::ModulusByZero)
                        } else {
                            Ok(lv % rv)
                        }
                    }
                }
            }
            Expr::Nary(kind, operands) => {
                let mut acc = match kind {
                    NaryKind::Add => 0.0,
                    NaryKind::Mul => 1.0,
                };
                for operand in operands {
                    let v = operand.eval(variable, value)?;
                    match kind {
                        NaryKind::Add => acc += v,
                        NaryKind::Mul => acc *= v,
                    }
                }
                Ok(acc)
            }
            Expr::Poly(expression, _) => expression.eval(variable, value),
        }
    }

    //___________________________________STRUCTURE QUERIES____________________________________

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Unary(_, operand) => operand.contains_variable(var_name),
            Expr::Binary(_, left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Nary(_, operands) => operands.iter().any(|op| op.contains_variable(var_name)),
            Expr::Poly(_, variable) => variable == var_name,
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    ///
    /// # Returns
    /// New expression with the variable substituted
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            Expr::Unary(kind, operand) => Expr::unary(*kind, operand.set_variable(var, value)),
            Expr::Binary(kind, lhs, rhs) => Expr::binary(
                *kind,
                lhs.set_variable(var, value),
                rhs.set_variable(var, value),
            ),
            Expr::Nary(kind, operands) => Expr::Nary(
                *kind,
                operands
                    .iter()
                    .map(|op| op.set_variable(var, value))
                    .collect(),
            ),
            // Pinning the marked variable to a number leaves nothing
            // polynomial to mark, so the wrapper is dropped
            Expr::Poly(expression, variable) => {
                if variable == var {
                    expression.set_variable(var, value)
                } else {
                    self.clone()
                }
            }
            _ => self.clone(),
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Unary(kind, operand) => {
                Expr::unary(*kind, operand.substitute_variable(var, expr))
            }
            Expr::Binary(kind, lhs, rhs) => Expr::binary(
                *kind,
                lhs.substitute_variable(var, expr),
                rhs.substitute_variable(var, expr),
            ),
            Expr::Nary(kind, operands) => Expr::Nary(
                *kind,
                operands
                    .iter()
                    .map(|op| op.substitute_variable(var, expr))
                    .collect(),
            ),
            Expr::Poly(expression, variable) => {
                if variable == var {
                    expression.substitute_variable(var, expr)
                } else {
                    self.clone()
                }
            }
            _ => self.clone(),
        }
    }

    /// Flattens the tree into a postorder token list: operands before their
    /// operator, every node contributing one token.
    pub fn tree_to_array(&self) -> Vec<String> {
        match self {
            Expr::Const(val) => vec![val.to_string()],
            Expr::Var(name) => vec![name.clone()],
            Expr::Unary(kind, operand) => {
                let mut out = operand.tree_to_array();
                out.push(kind.to_string());
                out
            }
            Expr::Binary(kind, lhs, rhs) => {
                let mut out = lhs.tree_to_array();
                out.extend(rhs.tree_to_array());
                out.push(kind.to_string());
                out
            }
            Expr::Nary(kind, operands) => {
                let mut out = Vec::new();
                for operand in operands {
                    out.extend(operand.tree_to_array());
                }
                out.push(kind.to_string());
                out
            }
            Expr::Poly(expression, _) => expression.tree_to_array(),
        }
    }
}
