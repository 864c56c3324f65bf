//! # Equation Solver Module
//!
//! Represents relations between two symbolic expressions and solves
//! equalities for a chosen variable by inverting the outermost operator of
//! the side that carries the variable, one step at a time, until the bare
//! variable is isolated.
//!
//! ## Solving Strategy
//!
//! Both sides are simplified first. The side containing the target variable
//! becomes the main branch; the other side receives the inverse of the main
//! branch's top operator and the solver recurses on the strictly smaller
//! equation. Even integer powers produce both signs of the root, so a solve
//! can return several expressions; the result list is always flat.
//!
//! Each inversion step is logged with `debug!`, so running with a logger at
//! debug level prints the whole derivation.

use crate::symbolic::symbolic_engine::{BinaryKind, Expr, UnaryKind};
use crate::symbolic::symbolic_errors::{SymbolicError, SymbolicResult};
use itertools::Itertools;
use log::debug;
use std::fmt;
use strum_macros::Display;

/// Relation operators an equation can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Relation {
    #[strum(serialize = "=")]
    Equals,
    #[strum(serialize = "≠")]
    NotEquals,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "≥")]
    GreaterEq,
    #[strum(serialize = "≤")]
    LessEq,
}

/// A relation between two expression trees. Owns both sides; solving is
/// meaningful for the `=` relation only.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub left: Expr,
    pub right: Expr,
    pub relation: Relation,
}

/// Outcome of solving an equation for a variable.
///
/// A chain of inversions normally ends in a single isolated expression;
/// even-power inversions yield two. An equation whose simplified sides are
/// equal and free of the variable is satisfied by anything; one whose sides
/// differ and are free of the variable does not mention it at all.
#[derive(Clone, Debug, PartialEq)]
pub enum Solution {
    Single(Expr),
    Multiple(Vec<Expr>),
    Tautology,
    NotFound,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Solution::Single(expr) => write!(f, "{}", expr),
            Solution::Multiple(exprs) => write!(f, "[{}]", exprs.iter().format(", ")),
            Solution::Tautology => write!(f, "Any value satisfies the equation"),
            Solution::NotFound => write!(f, "Variable not found in equation"),
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

/// The tag is transparent for solving; the inner tree is what gets rewritten.
fn unwrap_polynomial(expr: &Expr) -> &Expr {
    match expr {
        Expr::Poly(expression, _) => expression,
        other => other,
    }
}

/// Constant even integer exponents make a power two-valued when inverted.
fn is_even_integer_constant(expr: &Expr) -> bool {
    match expr {
        Expr::Const(val) => val.fract() == 0.0 && (*val as i64) % 2 == 0,
        _ => false,
    }
}

impl Equation {
    /// Builds an equality between two expressions.
    pub fn new(left: Expr, right: Expr) -> Self {
        Equation {
            left,
            right,
            relation: Relation::Equals,
        }
    }

    /// Builds an equation with an explicit relation operator.
    pub fn with_relation(left: Expr, right: Expr, relation: Relation) -> Self {
        Equation {
            left,
            right,
            relation,
        }
    }

    /// Returns the equation with both sides simplified.
    pub fn simplified(&self) -> SymbolicResult<Equation> {
        Ok(Equation {
            left: self.left.simplify()?,
            right: self.right.simplify()?,
            relation: self.relation,
        })
    }

    /// Solves the equation for `variable` by repeatedly simplifying and
    /// inverting the outermost operator of the side that carries the
    /// variable.
    ///
    /// Returns one isolated expression, a flat list of them for multi-valued
    /// branches (even powers), or the diagnostic outcomes for equations the
    /// variable does not pin down.
    ///
    /// # Errors
    /// `NotImplemented` for modulus equations, `Unsupported` for relations
    /// other than `=`, and any rewriting error raised while simplifying the
    /// intermediate sides.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let eq = Equation::parse("x ^ 2 = 9").unwrap();
    /// assert_eq!(eq.solve_for("x").unwrap().to_string(), "[3, -3]");
    /// ```
    pub fn solve_for(&self, variable: &str) -> SymbolicResult<Solution> {
        if self.relation != Relation::Equals {
            return Err(SymbolicError::Unsupported(format!(
                "solving a '{}' relation",
                self.relation
            )));
        }

        let nl = unwrap_polynomial(&self.left).simplify()?;
        let nr = unwrap_polynomial(&self.right).simplify()?;

        let left_has = nl.contains_variable(variable);
        let right_has = nr.contains_variable(variable);

        let (main_branch, other_branch) = if left_has {
            (nl, nr)
        } else if right_has {
            (nr, nl)
        } else if nl == nr {
            return Ok(Solution::Tautology);
        } else {
            return Ok(Solution::NotFound);
        };

        // base case: the main branch is the bare target variable
        if matches!(&main_branch, Expr::Var(_)) {
            if other_branch.contains_variable(variable) {
                // occurrences survived on the other side; move everything
                // over and solve against zero
                let new_left =
                    Expr::binary(BinaryKind::Sub, main_branch, other_branch).simplify()?;
                debug!("both sides carry '{}': {} = 0", variable, new_left);
                return Equation::new(new_left, Expr::Const(0.0)).solve_for(variable);
            }
            return Ok(Solution::Single(other_branch));
        }

        match &main_branch {
            Expr::Binary(kind, left, right) => match kind {
                BinaryKind::Add => {
                    let var_on_left = left.contains_variable(variable);
                    let (var_branch, const_branch) =
                        if var_on_left { (left, right) } else { (right, left) };
                    let new_right =
                        Expr::binary(BinaryKind::Sub, other_branch, (**const_branch).clone())
                            .simplify()?;
                    debug!("inverting '+': {} = {}", var_branch, new_right);
                    Equation::new((**var_branch).clone(), new_right).solve_for(variable)
                }
                BinaryKind::Sub => {
                    if left.contains_variable(variable) {
                        let new_right =
                            Expr::binary(BinaryKind::Add, other_branch, (**right).clone())
                                .simplify()?;
                        debug!("inverting '-': {} = {}", left, new_right);
                        Equation::new((**left).clone(), new_right).solve_for(variable)
                    } else {
                        let new_right =
                            Expr::binary(BinaryKind::Sub, (**left).clone(), other_branch)
                                .simplify()?;
                        debug!("inverting '-': {} = {}", right, new_right);
                        Equation::new((**right).clone(), new_right).solve_for(variable)
                    }
                }
                BinaryKind::Mul => {
                    let var_on_left = left.contains_variable(variable);
                    let (var_branch, const_branch) =
                        if var_on_left { (left, right) } else { (right, left) };
                    let new_right =
                        Expr::binary(BinaryKind::Div, other_branch, (**const_branch).clone())
                            .simplify()?;
                    debug!("inverting '*': {} = {}", var_branch, new_right);
                    Equation::new((**var_branch).clone(), new_right).solve_for(variable)
                }
                BinaryKind::Div => {
                    if left.contains_variable(variable) {
                        // variable in the numerator
                        let new_right =
                            Expr::binary(BinaryKind::Mul, other_branch, (**right).clone())
                                .simplify()?;
                        debug!("inverting '/': {} = {}", left, new_right);
                        Equation::new((**left).clone(), new_right).solve_for(variable)
                    } else {
                        // variable in the denominator
                        let new_right =
                            Expr::binary(BinaryKind::Div, (**left).clone(), other_branch)
                                .simplify()?;
                        debug!("inverting '/': {} = {}", right, new_right);
                        Equation::new((**right).clone(), new_right).solve_for(variable)
                    }
                }
                BinaryKind::Pow => {
                    if left.contains_variable(variable) {
                        // variable in the base: apply the reciprocal exponent
                        let reciprocal =
                            Expr::binary(BinaryKind::Div, Expr::Const(1.0), (**right).clone())
                                .simplify()?;
                        let new_right =
                            Expr::binary(BinaryKind::Pow, other_branch, reciprocal).simplify()?;
                        if is_even_integer_constant(right) {
                            // an even power loses the sign, so both roots
                            // count; each is already fully isolated
                            let negated = Expr::binary(
                                BinaryKind::Mul,
                                Expr::Const(-1.0),
                                new_right.clone(),
                            )
                            .simplify()?;
                            debug!("even power: ±{}", new_right);
                            return Ok(Solution::Multiple(vec![new_right, negated]));
                        }
                        debug!("inverting '^': {} = {}", left, new_right);
                        Equation::new((**left).clone(), new_right).solve_for(variable)
                    } else {
                        // variable in the exponent: take logarithms
                        let new_right = Expr::binary(
                            BinaryKind::Div,
                            other_branch.ln(),
                            (**left).clone().ln(),
                        )
                        .simplify()?;
                        debug!("inverting '^': {} = {}", right, new_right);
                        Equation::new((**right).clone(), new_right).solve_for(variable)
                    }
                }
                BinaryKind::Mod => Err(SymbolicError::NotImplemented(
                    "solving a modulus equation".to_string(),
                )),
            },
            Expr::Unary(kind, operand) => {
                let new_right = match kind {
                    UnaryKind::Negate => other_branch.neg(),
                    UnaryKind::Absolute => other_branch.abs(),
                    UnaryKind::Logarithm => other_branch.exp().simplify()?,
                    UnaryKind::Exponential => other_branch.ln().simplify()?,
                };
                debug!("inverting '{}': {} = {}", kind, operand, new_right);
                Equation::new((**operand).clone(), new_right).solve_for(variable)
            }
            other => Err(SymbolicError::Unsupported(format!(
                "cannot isolate through {}",
                other
            ))),
        }
    }
}
