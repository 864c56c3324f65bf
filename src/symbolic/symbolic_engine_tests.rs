use crate::symbolic::symbolic_engine::{BinaryKind, Expr, UnaryKind};
use crate::symbolic::symbolic_errors::SymbolicError;
use crate::symbolic::symbolic_solver::{Equation, Relation, Solution};
use std::f64;
//___________________________________TESTS____________________________________

mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    fn y() -> Expr {
        Expr::Var("y".to_string())
    }

    //___________________________________CONSTRUCTION____________________________________

    #[test]
    fn test_double_negation_collapses_at_construction() {
        assert_eq!(x().neg().neg(), x());
    }

    #[test]
    fn test_absolute_absorbs_negation_at_construction() {
        assert_eq!(x().neg().abs(), x().abs());
    }

    #[test]
    fn test_operator_overloads_build_trees() {
        let expr = x() + Expr::Const(2.0);
        assert_eq!(
            expr,
            Expr::binary(BinaryKind::Add, x(), Expr::Const(2.0))
        );
        let expr = x() * y() - Expr::Const(1.0);
        assert_eq!(
            expr,
            Expr::binary(
                BinaryKind::Sub,
                Expr::binary(BinaryKind::Mul, x(), y()),
                Expr::Const(1.0)
            )
        );
        assert_eq!(-x(), Expr::unary(UnaryKind::Negate, x()));
    }

    #[test]
    fn test_structural_equality_distinguishes_variants() {
        assert_ne!(Expr::Const(0.0), x());
        assert_ne!(x(), y());
        assert_ne!(
            Expr::binary(BinaryKind::Add, x(), Expr::Const(1.0)),
            Expr::binary(BinaryKind::Sub, x(), Expr::Const(1.0))
        );
    }

    //___________________________________PRINTING____________________________________

    #[test]
    fn test_display_is_fully_parenthesized() {
        let expr = Expr::binary(
            BinaryKind::Mul,
            Expr::binary(BinaryKind::Add, x(), Expr::Const(2.0)),
            Expr::Const(3.0),
        );
        assert_eq!(expr.to_string(), "((x + 2) * 3)");
    }

    #[test]
    fn test_display_modulus_prints_as_word() {
        let expr = Expr::binary(BinaryKind::Mod, x(), Expr::Const(2.0));
        assert_eq!(expr.to_string(), "(x mod 2)");
    }

    #[test]
    fn test_display_unary_forms() {
        assert_eq!(x().neg().to_string(), "-x");
        assert_eq!(x().abs().to_string(), "|x|");
        assert_eq!(x().ln().to_string(), "log(x)");
        assert_eq!(x().exp().to_string(), "e^(x)");
    }

    #[test]
    fn test_tree_to_array_postorder() {
        let expr = Expr::parse_expression("x + 2 * y").unwrap();
        assert_eq!(expr.tree_to_array(), vec!["x", "2", "y", "*", "+"]);
    }

    //___________________________________EVALUATION____________________________________

    #[test]
    fn test_eval_polynomial() {
        let expr = Expr::parse_expression("2 * x ^ 2 - 3 * x + 1").unwrap();
        assert_relative_eq!(expr.eval("x", 2.0).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eval_division_by_zero() {
        let expr = Expr::parse_expression("1 / (x - 2)").unwrap();
        assert_eq!(expr.eval("x", 2.0), Err(SymbolicError::DivisionByZero));
    }

    #[test]
    fn test_eval_modulus_by_zero() {
        let expr = Expr::binary(BinaryKind::Mod, x(), Expr::Const(0.0));
        assert_eq!(expr.eval("x", 5.0), Err(SymbolicError::ModulusByZero));
    }

    #[test]
    fn test_eval_modulus_keeps_remainder_sign() {
        let expr = Expr::binary(BinaryKind::Mod, Expr::Const(-7.0), Expr::Const(3.0));
        assert_relative_eq!(expr.eval("x", 0.0).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eval_logarithm_domain() {
        let expr = Expr::parse_expression("log(x)").unwrap();
        assert_eq!(expr.eval("x", -1.0), Err(SymbolicError::LogDomain));
        assert_eq!(expr.eval("x", 0.0), Err(SymbolicError::LogDomain));
        assert_relative_eq!(
            expr.eval("x", f64::consts::E).unwrap(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_eval_unbound_variable() {
        assert_eq!(
            y().eval("x", 1.0),
            Err(SymbolicError::UnboundVariable("y".to_string()))
        );
    }

    #[test]
    fn test_is_zero() {
        assert!(Expr::Const(0.0).is_zero());
        assert!(!Expr::Const(1.0).is_zero());
        assert!(!x().is_zero());
        assert!((x() - x()).simplify().unwrap().is_zero());
    }

    #[test]
    fn test_equation_simplified_sides() {
        let eq = Equation::new(x() + Expr::Const(0.0), Expr::Const(2.0) + Expr::Const(3.0));
        let simplified = eq.simplified().unwrap();
        assert_eq!(simplified.left, x());
        assert_eq!(simplified.right, Expr::Const(5.0));
        assert_eq!(simplified.relation, Relation::Equals);
    }

    #[test]
    fn test_set_variable_and_substitute() {
        let expr = Expr::binary(BinaryKind::Add, x(), y());
        let pinned = expr.set_variable("y", 3.0);
        assert_eq!(pinned, Expr::binary(BinaryKind::Add, x(), Expr::Const(3.0)));

        let replaced = expr.substitute_variable("y", &x().ln());
        assert_eq!(replaced, Expr::binary(BinaryKind::Add, x(), x().ln()));
    }

    //___________________________________SIMPLIFICATION____________________________________

    #[test]
    fn test_identity_zero_plus_x() {
        let expr = (Expr::Const(0.0) + x()).simplify().unwrap();
        assert_eq!(expr, x());
    }

    #[test]
    fn test_identity_x_minus_x() {
        let expr = (x() - x()).simplify().unwrap();
        assert_eq!(expr, Expr::Const(0.0));
    }

    #[test]
    fn test_identity_x_times_x() {
        let expr = (x() * x()).simplify().unwrap();
        assert_eq!(expr, Expr::binary(BinaryKind::Pow, x(), Expr::Const(2.0)));
    }

    #[test]
    fn test_identity_neg_one_times_x() {
        let expr = (Expr::Const(-1.0) * x()).simplify().unwrap();
        assert_eq!(expr, x().neg());
    }

    #[test]
    fn test_identity_x_over_x() {
        let expr = (x() / x()).simplify().unwrap();
        assert_eq!(expr, Expr::Const(1.0));
    }

    #[test]
    fn test_identity_x_to_the_zero() {
        let expr = x().pow(Expr::Const(0.0)).simplify().unwrap();
        assert_eq!(expr, Expr::Const(1.0));
    }

    #[test]
    fn test_constant_folding() {
        let expr = Expr::parse_expression("(2 + 3) * 4 - 6 / 2").unwrap();
        assert_eq!(expr.simplify().unwrap(), Expr::Const(17.0));
    }

    #[test]
    fn test_division_by_constant_pushes_constant_left() {
        // x / 4 => 0.25 * x
        let expr = (x() / Expr::Const(4.0)).simplify().unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryKind::Mul, Expr::Const(0.25), x())
        );
    }

    #[test]
    fn test_canonical_ordering_is_insensitive_to_association() {
        let a = (Expr::Const(5.0) + (Expr::Const(2.0) + x())).simplify().unwrap();
        let b = (Expr::Const(5.0) + (x() + Expr::Const(2.0))).simplify().unwrap();
        let c = ((Expr::Const(2.0) + x()) + Expr::Const(5.0)).simplify().unwrap();
        let canonical = Expr::binary(BinaryKind::Add, x(), Expr::Const(7.0));
        assert_eq!(a, canonical);
        assert_eq!(b, canonical);
        assert_eq!(c, canonical);
    }

    #[test]
    fn test_subtracting_a_sum_from_a_constant() {
        // 3 - (x + 2) => -x + 1
        let expr = (Expr::Const(3.0) - (x() + Expr::Const(2.0))).simplify().unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryKind::Add, x().neg(), Expr::Const(1.0))
        );
    }

    #[test]
    fn test_distribution_over_a_sum() {
        // 2 * (x + 3) => 2 * x + 6
        let expr = (Expr::Const(2.0) * (x() + Expr::Const(3.0))).simplify().unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryKind::Add,
                Expr::binary(BinaryKind::Mul, Expr::Const(2.0), x()),
                Expr::Const(6.0)
            )
        );
    }

    #[test]
    fn test_nested_constant_multiplication_collapses() {
        // 3 * (x * 2) => 6 * x
        let expr = (Expr::Const(3.0) * (x() * Expr::Const(2.0))).simplify().unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryKind::Mul, Expr::Const(6.0), x())
        );
    }

    #[test]
    fn test_like_term_collection() {
        let expr = Expr::parse_expression("8 * x + 5 * y ^ 2 - 4 * y ^ 2 + 6 * x").unwrap();
        let simplified = expr.simplify().unwrap();
        let expected = Expr::binary(
            BinaryKind::Add,
            Expr::binary(BinaryKind::Mul, Expr::Const(14.0), x()),
            Expr::binary(BinaryKind::Pow, y(), Expr::Const(2.0)),
        );
        assert_eq!(simplified, expected);
    }

    #[test]
    fn test_bare_powers_collect_like_variables() {
        let expr = Expr::parse_expression("y ^ 2 + x + y ^ 2").unwrap();
        let simplified = expr.simplify().unwrap();
        let expected = Expr::binary(
            BinaryKind::Add,
            x(),
            Expr::binary(
                BinaryKind::Mul,
                Expr::Const(2.0),
                Expr::binary(BinaryKind::Pow, y(), Expr::Const(2.0)),
            ),
        );
        assert_eq!(simplified, expected);
    }

    #[test]
    fn test_everything_cancels_to_zero() {
        let expr = Expr::parse_expression("x + y - x - y").unwrap();
        assert_eq!(expr.simplify().unwrap(), Expr::Const(0.0));
    }

    #[test]
    fn test_fraction_addition_with_symbolic_denominators() {
        // (a / x) + (b / y) => (a*y + b*x) / (x*y)
        let a = Expr::Var("a".to_string());
        let b = Expr::Var("b".to_string());
        let expr = (a.clone() / x() + b.clone() / y()).simplify().unwrap();
        let expected = Expr::binary(
            BinaryKind::Div,
            Expr::binary(
                BinaryKind::Add,
                Expr::binary(BinaryKind::Mul, a, y()),
                Expr::binary(BinaryKind::Mul, b, x()),
            ),
            Expr::binary(BinaryKind::Mul, x(), y()),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_fraction_addition_with_constant_denominators_reduces() {
        // x / 2 + x / 3 has the single collected coefficient 5/6
        let expr = (x() / Expr::Const(2.0) + x() / Expr::Const(3.0))
            .simplify()
            .unwrap();
        match expr {
            Expr::Binary(BinaryKind::Mul, coeff, var) => {
                assert_eq!(*var, x());
                match *coeff {
                    Expr::Const(c) => assert_relative_eq!(c, 5.0 / 6.0, epsilon = 1e-12),
                    other => panic!("expected a constant coefficient, got {}", other),
                }
            }
            other => panic!("expected a single collected term, got {}", other),
        }
    }

    #[test]
    fn test_simplify_division_by_zero() {
        let expr = Expr::parse_expression("x / 0").unwrap();
        assert_eq!(expr.simplify(), Err(SymbolicError::DivisionByZero));
    }

    #[test]
    fn test_simplify_modulus_by_zero() {
        let expr = Expr::binary(BinaryKind::Mod, x(), Expr::Const(0.0));
        assert_eq!(expr.simplify(), Err(SymbolicError::ModulusByZero));
    }

    #[test]
    fn test_divisor_that_folds_to_zero_errors() {
        // the divisor only becomes zero after folding its own subtree;
        // folding defers, and the identity pass is the one that reports it
        let expr = x() / (Expr::Const(1.0) - Expr::Const(1.0));
        assert_eq!(expr.simplify(), Err(SymbolicError::DivisionByZero));
    }

    #[test]
    fn test_fold_idempotence() {
        let cases = [
            (Expr::Const(5.0) + (Expr::Const(2.0) + x())),
            Expr::parse_expression("8 * x + 5 * y ^ 2 - 4 * y ^ 2 + 6 * x").unwrap(),
            (Expr::Const(2.0) * (x() + Expr::Const(3.0))),
            (x() - x()),
            (x() / Expr::Const(2.0) + x() / Expr::Const(3.0)),
            (Expr::Const(3.0) - (x() + Expr::Const(2.0))),
            x().pow(Expr::Const(2.0)),
        ];
        for expr in cases {
            let once = expr.simplify().unwrap();
            let twice = once.simplify().unwrap();
            assert_eq!(once, twice, "simplifying {} twice diverged", expr);
        }
    }

    #[test]
    fn test_evaluation_agreement() {
        let cases = [
            (Expr::Const(2.0) * (x() + Expr::Const(3.0))),
            (x() / Expr::Const(2.0) + x() / Expr::Const(3.0)),
            (Expr::Const(3.0) - (x() + Expr::Const(2.0))),
            (x() * x() + Expr::Const(2.0) * x()),
            (Expr::Const(5.0) + (Expr::Const(2.0) + x())),
        ];
        for expr in cases {
            let simplified = expr.simplify().unwrap();
            for value in [-3.0, -0.5, 0.0, 1.0, 2.5, 10.0] {
                assert_relative_eq!(
                    expr.eval("x", value).unwrap(),
                    simplified.eval("x", value).unwrap(),
                    epsilon = 1e-9
                );
            }
        }
    }

    //___________________________________POLYNOMIAL TAG____________________________________

    #[test]
    fn test_polynomial_tag_simplifies_eagerly() {
        let expr = Expr::parse_expression("3 * x + 2 * x + 1").unwrap();
        let Expr::Poly(inner, variable) = expr else {
            panic!("single-variable polynomial input was not tagged");
        };
        assert_eq!(variable, "x");
        assert_eq!(
            *inner,
            Expr::binary(
                BinaryKind::Add,
                Expr::binary(BinaryKind::Mul, Expr::Const(5.0), x()),
                Expr::Const(1.0)
            )
        );
    }

    #[test]
    fn test_polynomial_tag_delegates_eval_and_display() {
        let expr = Expr::parse_expression("x ^ 2 + 1").unwrap();
        assert!(matches!(expr, Expr::Poly(_, _)));
        assert_relative_eq!(expr.eval("x", 3.0).unwrap(), 10.0, epsilon = 1e-12);
        assert_eq!(expr.to_string(), "((x ^ 2) + 1)");
    }

    //___________________________________EQUATION SOLVING____________________________________

    #[test]
    fn test_solve_linear_equation() {
        let eq = Equation::parse("6 * x + 7 = 2 * x + 5").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Single(Expr::Const(c)) => {
                assert_relative_eq!(c, -0.5, epsilon = 1e-9)
            }
            other => panic!("expected one numeric solution, got {}", other),
        }
    }

    #[test]
    fn test_solve_even_power_yields_both_roots() {
        let eq = Equation::parse("x ^ 2 = 9").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Multiple(roots) => {
                assert_eq!(roots.len(), 2);
                // principal root first, negated second
                match (&roots[0], &roots[1]) {
                    (Expr::Const(principal), Expr::Const(negated)) => {
                        assert_relative_eq!(*principal, 3.0, epsilon = 1e-9);
                        assert_relative_eq!(*negated, -3.0, epsilon = 1e-9);
                    }
                    other => panic!("expected numeric roots, got {:?}", other),
                }
            }
            other => panic!("expected two roots, got {}", other),
        }
    }

    #[test]
    fn test_solve_odd_power_single_root() {
        let eq = Equation::parse("x ^ 3 = 8").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Single(Expr::Const(c)) => assert_relative_eq!(c, 2.0, epsilon = 1e-9),
            other => panic!("expected one numeric solution, got {}", other),
        }
    }

    #[test]
    fn test_solve_variable_in_exponent() {
        let eq = Equation::parse("2 ^ x = 8").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Single(expr) => {
                // log(8) / log(2) stays symbolic and evaluates to 3
                assert_eq!(
                    expr,
                    Expr::binary(
                        BinaryKind::Div,
                        Expr::Const(8.0).ln(),
                        Expr::Const(2.0).ln()
                    )
                );
                assert_relative_eq!(expr.eval("x", 0.0).unwrap(), 3.0, epsilon = 1e-9);
            }
            other => panic!("expected one solution, got {}", other),
        }
    }

    #[test]
    fn test_solve_variable_in_denominator() {
        let eq = Equation::parse("6 / x = 3").unwrap();
        assert_eq!(
            eq.solve_for("x").unwrap(),
            Solution::Single(Expr::Const(2.0))
        );
    }

    #[test]
    fn test_solve_subtraction_with_variable_on_the_right() {
        let eq = Equation::parse("10 - x = 7").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Single(expr) => {
                assert_relative_eq!(expr.eval("x", 0.0).unwrap(), 3.0, epsilon = 1e-9)
            }
            other => panic!("expected one solution, got {}", other),
        }
    }

    #[test]
    fn test_solve_negation() {
        let eq = Equation::parse("-x = 5").unwrap();
        assert_eq!(
            eq.solve_for("x").unwrap(),
            Solution::Single(Expr::Const(5.0).neg())
        );
    }

    #[test]
    fn test_solve_logarithm_inverts_to_exponential() {
        let eq = Equation::parse("log(x) = 2").unwrap();
        assert_eq!(
            eq.solve_for("x").unwrap(),
            Solution::Single(Expr::Const(2.0).exp())
        );
    }

    #[test]
    fn test_solve_exponential_inverts_to_logarithm() {
        let eq = Equation::parse("exp(x) = 5").unwrap();
        assert_eq!(
            eq.solve_for("x").unwrap(),
            Solution::Single(Expr::Const(5.0).ln())
        );
    }

    #[test]
    fn test_solve_absolute_keeps_symbolic_inverse() {
        // inverting |u| = k wraps the other side in an absolute value and
        // produces a single branch, not the ± pair
        let eq = Equation::parse("|x| = 5").unwrap();
        assert_eq!(
            eq.solve_for("x").unwrap(),
            Solution::Single(Expr::Const(5.0).abs())
        );
    }

    #[test]
    fn test_solve_tautology() {
        let eq = Equation::parse("x = x").unwrap();
        let solution = eq.solve_for("x").unwrap();
        assert_eq!(solution, Solution::Tautology);
        assert_eq!(solution.to_string(), "Any value satisfies the equation");
    }

    #[test]
    fn test_solve_variable_not_present() {
        let eq = Equation::parse("y + 1 = y").unwrap();
        let solution = eq.solve_for("x").unwrap();
        assert_eq!(solution, Solution::NotFound);
        assert_eq!(solution.to_string(), "Variable not found in equation");
    }

    #[test]
    fn test_solve_constant_tautology() {
        let eq = Equation::parse("3 = 3").unwrap();
        assert_eq!(eq.solve_for("x").unwrap(), Solution::Tautology);
    }

    #[test]
    fn test_solve_modulus_is_not_implemented() {
        let eq = Equation::parse("x mod 3 = 1").unwrap();
        assert!(matches!(
            eq.solve_for("x"),
            Err(SymbolicError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_solve_rejects_non_equality_relations() {
        let eq = Equation::parse("x + 1 > 2").unwrap();
        assert_eq!(eq.relation, Relation::Greater);
        assert!(matches!(
            eq.solve_for("x"),
            Err(SymbolicError::Unsupported(_))
        ));
    }

    #[test]
    fn test_solve_variable_on_both_sides_of_a_product() {
        // 2 * x = x + 3: both sides carry x, isolation still converges
        let eq = Equation::parse("2 * x = x + 3").unwrap();
        match eq.solve_for("x").unwrap() {
            Solution::Single(expr) => {
                assert_relative_eq!(expr.eval("x", 0.0).unwrap(), 3.0, epsilon = 1e-9)
            }
            other => panic!("expected one solution, got {}", other),
        }
    }

    #[test]
    fn test_solution_display_for_multiple_roots() {
        let solution = Solution::Multiple(vec![Expr::Const(3.0), Expr::Const(-3.0)]);
        assert_eq!(solution.to_string(), "[3, -3]");
    }
}
