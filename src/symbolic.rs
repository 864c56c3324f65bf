#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let input = "8 * x + 5 * y ^ 2 - 4 * y ^ 2 + 6 * x";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let simplified = parsed_expression.simplify().unwrap();
/// assert_eq!(simplified.to_string(), "((14 * x) + (y ^ 2))");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) defines the symbolic expression tree: constants, variables, unary and
///    binary operators, the transient flat chain and the polynomial marker
/// 2) evaluates a symbolic expression numerically for a given variable value
/// 3) prints a symbolic expression as a fully parenthesized string
///# Example#
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let input = "2 * (x + 3)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let value = parsed_expression.eval("x", 2.0).unwrap();
/// assert_eq!(value, 10.0);
/// ```
pub mod symbolic_engine;
///________________________________________________________________________________________________________________________________________________
/// error taxonomy shared by the parser, simplifier, solver and evaluation
pub mod symbolic_errors;
///________________________________________________________________________________________________________________________________________________
/// # Simplification
/// rewrites an expression into canonical form: constant folding, local
/// re-association of constants, algebraic identities and like-term
/// collection, applied repeatedly to a fixed point
///# Example#
/// ```
/// use RustedCAS::symbolic::symbolic_engine::Expr;
/// let expr = Expr::parse_expression("5 + (2 + x)").unwrap();
/// assert_eq!(expr.simplify().unwrap().to_string(), "(x + 7)");
/// ```
pub mod symbolic_simplify;
///________________________________________________________________________________________________________________________________________________
/// # Equation solver
/// solves an equality for a variable by inverting the outermost operator of
/// the side carrying it, step by step; even powers yield both roots
///# Example#
/// ```
/// use RustedCAS::symbolic::symbolic_solver::Equation;
/// let eq = Equation::parse("6 * x + 7 = 2 * x + 5").unwrap();
/// let solution = eq.solve_for("x").unwrap();
/// println!("{} solved for x: {}", eq, solution);
/// ```
pub mod symbolic_solver;

#[cfg(test)]
mod symbolic_engine_tests;
