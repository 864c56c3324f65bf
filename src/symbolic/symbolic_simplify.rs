//! # Symbolic Expression Simplification Module
//!
//! This module rewrites expressions into a canonical simplified form. It
//! implements a multi-layered approach, from basic constant folding to
//! like-term collection into a fixed polynomial-style term order.
//!
//! ## Simplification Strategy
//!
//! Four complementary passes are applied repeatedly until a full round
//! leaves the tree structurally unchanged (or the tree collapses to a
//! single constant):
//!
//! 1. **Constant Folding**: evaluates operators whose operands are
//!    statically constant, bottom-up
//! 2. **Peak Flattening**: local re-association and distribution that pulls
//!    a constant through a compatible inner node, e.g. `(a + k1) + k2` into
//!    `a + (k1 + k2)` and `k * (a + b)` into `(k*a + k*b)`
//! 3. **Algebraic Identities**: rules like `x + 0 = x`, `x * 1 = x`,
//!    `x / x = 1`, `x ^ 0 = 1`, `x mod x = 0`
//! 4. **Like Term Collection**: gathers an addition chain into a flat signed
//!    term list and rebuilds it in canonical order with summed coefficients,
//!    such as `3*x + 2*x = 5*x`
//!
//! ## Key Features
//!
//! - **Term Ordering Independence**: `5 + (2 + x)`, `5 + (x + 2)` and
//!   `(2 + x) + 5` all converge to the same canonical tree `(x + 7)`
//! - **Deferred Zero Division**: a division or modulus whose divisor folds to
//!   zero is left untouched by the folding pass; the identity pass is the one
//!   that reports it as an error
//! - **Nested Expression Handling**: recursively simplifies complex nested
//!   structures
//!
//! ## Termination
//!
//! Every pass either strictly shrinks the tree or produces a tree the
//! structural equality check recognizes as unchanged, so the outer loop
//! always halts.

use crate::symbolic::symbolic_engine::{BinaryKind, Expr, NaryKind, UnaryKind};
use crate::symbolic::symbolic_errors::{SymbolicError, SymbolicResult};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Rewrites the expression into its canonical simplified form.
    ///
    /// The four passes (constant folding, peak flattening, identity
    /// elimination, like-term collection) run in a loop until a full round
    /// returns a structurally equal tree or a single constant. Constants and
    /// variables are already canonical; a unary node is rebuilt around its
    /// simplified operand; a `Poly` wrapper is canonical by construction.
    ///
    /// # Errors
    /// `DivisionByZero` or `ModulusByZero` when the input contains a division
    /// or modulus whose divisor is statically the constant zero on a branch
    /// the rewrite reaches.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("8 * x + 5 * y ^ 2 - 4 * y ^ 2 + 6 * x").unwrap();
    /// assert_eq!(expr.simplify().unwrap().to_string(), "((14 * x) + (y ^ 2))");
    /// ```
    pub fn simplify(&self) -> SymbolicResult<Expr> {
        match self {
            Expr::Const(_) | Expr::Var(_) => Ok(self.clone()),
            Expr::Unary(kind, operand) => Ok(Expr::unary(*kind, operand.simplify()?)),
            Expr::Nary(_, _) | Expr::Poly(_, _) => Ok(self.clone()),
            Expr::Binary(_, _, _) => {
                let mut cur = self.clone();
                loop {
                    let mut next = cur.fold_constants();
                    if matches!(next, Expr::Const(_)) {
                        return Ok(next);
                    }
                    next = next.peak_flatten()?;
                    if matches!(next, Expr::Const(_)) {
                        return Ok(next);
                    }
                    next = next.identity_fold()?;
                    next = next.collect_terms();
                    if !matches!(next, Expr::Binary(_, _, _)) {
                        // identity elimination left the binary world, e.g.
                        // 0 - x became -x; finish the remainder directly
                        return next.simplify();
                    }
                    if next == cur {
                        return Ok(next);
                    }
                    debug!("simplify step: {} -> {}", cur, next);
                    cur = next;
                }
            }
        }
    }

    /// Folds operators whose operands are statically constant, bottom-up.
    ///
    /// A node counts as statically constant when it is a `Const` or a
    /// negation/absolute-value wrapper around one, recursively. A division
    /// or modulus whose folded divisor is zero is returned unfolded; the
    /// decision about it belongs to the identity pass.
    fn fold_constants(&self) -> Expr {
        match self {
            Expr::Binary(kind, lhs, rhs) => {
                let nl = lhs.fold_constants();
                let nr = rhs.fold_constants();
                if let (Some(lv), Some(rv)) = (const_value(&nl), const_value(&nr)) {
                    match kind {
                        BinaryKind::Add => Expr::Const(lv + rv),
                        BinaryKind::Sub => Expr::Const(lv - rv),
                        BinaryKind::Mul => Expr::Const(lv * rv),
                        BinaryKind::Div if rv == 0.0 => Expr::binary(*kind, nl, nr),
                        BinaryKind::Div => Expr::Const(lv / rv),
                        BinaryKind::Mod if rv == 0.0 => Expr::binary(*kind, nl, nr),
                        BinaryKind::Mod => Expr::Const(lv % rv),
                        BinaryKind::Pow => Expr::Const(lv.powf(rv)),
                    }
                } else {
                    Expr::binary(*kind, nl, nr)
                }
            }
            Expr::Unary(kind, operand) => Expr::unary(*kind, operand.fold_constants()),
            _ => self.clone(),
        }
    }

    /// Re-associates one constant-valued side through a compatible inner
    /// binary node and distributes constants over sums.
    ///
    /// With both sides non-constant the only rewrite is the fraction sum
    /// `(a / b) + (c / d) = (a*d + c*b) / (b*d)`; otherwise the pass recurses
    /// into binary children and reports the node unchanged when nothing
    /// moved. Inner power and modulus nodes are opaque here.
    fn peak_flatten(&self) -> SymbolicResult<Expr> {
        let Expr::Binary(kind, left, right) = self else {
            return Ok(self.clone());
        };

        let lv = const_value(left);
        let rv = const_value(right);

        if lv.is_none() && rv.is_none() {
            if *kind == BinaryKind::Add {
                if let (
                    Expr::Binary(BinaryKind::Div, a, b),
                    Expr::Binary(BinaryKind::Div, c, d),
                ) = (left.as_ref(), right.as_ref())
                {
                    // (a / b) + (c / d) => (ad + cb) / bd
                    // Constant divisors are excluded: those fractions reduce
                    // through distribution and the reciprocal rule, and
                    // re-combining them here would keep undoing that rewrite
                    if !(const_value(b).is_some() && const_value(d).is_some()) {
                        let denominator =
                            Expr::binary(BinaryKind::Mul, (**b).clone(), (**d).clone());
                        let lnum = Expr::binary(BinaryKind::Mul, (**a).clone(), (**d).clone());
                        let rnum = Expr::binary(BinaryKind::Mul, (**c).clone(), (**b).clone());
                        let numerator = Expr::binary(BinaryKind::Add, lnum, rnum);
                        return Ok(Expr::binary(BinaryKind::Div, numerator, denominator));
                    }
                }
            }

            let nl = if matches!(left.as_ref(), Expr::Binary(_, _, _)) {
                left.peak_flatten()?
            } else {
                (**left).clone()
            };
            let nr = if matches!(right.as_ref(), Expr::Binary(_, _, _)) {
                right.peak_flatten()?
            } else {
                (**right).clone()
            };
            if nl == **left && nr == **right {
                return Ok(self.clone());
            }
            return Ok(Expr::binary(*kind, nl, nr));
        }

        let mut lnode = match lv {
            Some(v) => Some(Expr::Const(v)),
            None => flat_check(left),
        };
        let mut rnode = match rv {
            Some(v) => Some(Expr::Const(v)),
            None => flat_check(right),
        };

        // a negation wrapping an inner binary node is opened up by pushing
        // the minus onto the inner left child, flipping add/sub
        if let Some(pushed) = push_negation(left) {
            lnode = Some(pushed);
        }
        if let Some(pushed) = push_negation(right) {
            rnode = Some(pushed);
        }

        let (Some(lnode), Some(rnode)) = (lnode, rnode) else {
            return Ok(self.clone());
        };

        let merged = match kind {
            BinaryKind::Add => peak_add(&lnode, &rnode),
            BinaryKind::Sub => peak_sub(&lnode, &rnode),
            BinaryKind::Mul => peak_mul(&lnode, &rnode)?,
            BinaryKind::Div => peak_div(&lnode, &rnode)?,
            _ => None,
        };
        Ok(merged.unwrap_or_else(|| self.clone()))
    }

    /// Applies the algebraic identities that hold regardless of the variable
    /// value, checked on (possibly negation-wrapped) constant or variable
    /// operands. When neither operand qualifies the pass recurses into
    /// binary children instead.
    fn identity_fold(&self) -> SymbolicResult<Expr> {
        let Expr::Binary(kind, left, right) = self else {
            return Ok(self.clone());
        };
        let lnode = left.as_ref();
        let rnode = right.as_ref();

        if !const_or_var(lnode) && !const_or_var(rnode) {
            let nl = if matches!(lnode, Expr::Binary(_, _, _)) {
                lnode.identity_fold()?
            } else {
                lnode.clone()
            };
            let nr = if matches!(rnode, Expr::Binary(_, _, _)) {
                rnode.identity_fold()?
            } else {
                rnode.clone()
            };
            return Ok(Expr::binary(*kind, nl, nr));
        }

        let folded = match kind {
            BinaryKind::Add => {
                // 0 + x => x || x + 0 => x
                if is_zero_node(lnode) {
                    rnode.clone()
                } else if is_zero_node(rnode) {
                    lnode.clone()
                // x + x => 2 * x
                } else if same_variable(lnode, rnode) {
                    Expr::binary(BinaryKind::Mul, Expr::Const(2.0), rnode.clone())
                } else {
                    self.clone()
                }
            }
            BinaryKind::Sub => {
                // 0 - x => -x
                if is_zero_node(lnode) {
                    rnode.clone().neg()
                // x - 0 => x
                } else if is_zero_node(rnode) {
                    lnode.clone()
                // x - x => 0
                } else if same_variable(lnode, rnode) {
                    Expr::Const(0.0)
                } else {
                    self.clone()
                }
            }
            BinaryKind::Mul => {
                // 0 * x => 0 || x * 0 => 0
                if is_zero_node(lnode) || is_zero_node(rnode) {
                    Expr::Const(0.0)
                // 1 * x => x || x * 1 => x
                } else if is_one_node(rnode) {
                    lnode.clone()
                } else if is_one_node(lnode) {
                    rnode.clone()
                // -1 * x => -x || x * -1 => -x
                } else if is_neg_one_node(rnode) {
                    lnode.clone().neg()
                } else if is_neg_one_node(lnode) {
                    rnode.clone().neg()
                // x * x => x ^ 2
                } else if same_variable(lnode, rnode) {
                    Expr::binary(BinaryKind::Pow, rnode.clone(), Expr::Const(2.0))
                } else {
                    self.clone()
                }
            }
            BinaryKind::Div => {
                // 0 / x => 0
                if is_zero_node(lnode) {
                    Expr::Const(0.0)
                // x / 0 => error
                } else if is_zero_node(rnode) {
                    return Err(SymbolicError::DivisionByZero);
                // x / 1 => x
                } else if is_one_node(rnode) {
                    lnode.clone()
                // x / -1 => -x
                } else if is_neg_one_node(rnode) {
                    lnode.clone().neg()
                // x / x => 1
                } else if same_variable(lnode, rnode) {
                    Expr::Const(1.0)
                // x / C => (1 / C) * x, pushing constants to the left
                } else if let Some((name, negated)) = var_core(lnode) {
                    let reciprocal = Expr::binary(
                        BinaryKind::Div,
                        Expr::Const(if negated { -1.0 } else { 1.0 }),
                        rnode.clone(),
                    );
                    Expr::binary(BinaryKind::Mul, reciprocal, Expr::Var(name.to_string()))
                } else {
                    self.clone()
                }
            }
            BinaryKind::Pow => {
                // x ^ 0 => 1
                if is_zero_node(rnode) {
                    Expr::Const(1.0)
                // x ^ 1 => x
                } else if is_one_node(rnode) {
                    lnode.clone()
                // 0 ^ x => 0
                } else if is_zero_node(lnode) {
                    Expr::Const(0.0)
                // 1 ^ x => 1
                } else if is_one_node(lnode) {
                    Expr::Const(1.0)
                } else {
                    self.clone()
                }
            }
            BinaryKind::Mod => {
                // x mod 1 => 0
                if is_one_node(rnode) {
                    Expr::Const(0.0)
                // 0 mod x => 0
                } else if is_zero_node(lnode) {
                    Expr::Const(0.0)
                // x mod 0 => error
                } else if is_zero_node(rnode) {
                    return Err(SymbolicError::ModulusByZero);
                // x mod x => 0
                } else if same_variable(lnode, rnode) {
                    Expr::Const(0.0)
                } else {
                    self.clone()
                }
            }
        };
        Ok(folded)
    }

    /// Gathers an addition/subtraction chain into a flat signed term list and
    /// rebuilds it in canonical order with summed coefficients. Other node
    /// kinds pass through unchanged.
    fn collect_terms(&self) -> Expr {
        if !matches!(
            self,
            Expr::Binary(BinaryKind::Add, _, _) | Expr::Binary(BinaryKind::Sub, _, _)
        ) {
            return self.clone();
        }
        let mut parts = Vec::new();
        gather_terms(self, 1, &mut parts);
        let chain = Expr::Nary(NaryKind::Add, parts);
        combine_terms(&chain)
    }
}

/// Statically known numeric value of a node: a constant, or a
/// negation/absolute-value wrapper around one, recursively.
fn const_value(node: &Expr) -> Option<f64> {
    match node {
        Expr::Const(val) => Some(*val),
        Expr::Unary(UnaryKind::Negate, operand) => const_value(operand).map(|v| -v),
        Expr::Unary(UnaryKind::Absolute, operand) => const_value(operand).map(f64::abs),
        _ => None,
    }
}

/// Inner binary nodes the peak-flatten pass may merge into. Power and
/// modulus chains do not re-associate with the outer operators, so they are
/// excluded.
fn flat_check(node: &Expr) -> Option<Expr> {
    match node {
        Expr::Binary(BinaryKind::Pow, _, _) | Expr::Binary(BinaryKind::Mod, _, _) => None,
        Expr::Binary(_, _, _) => Some(node.clone()),
        _ => None,
    }
}

/// Opens up `-(a op b)` for the four arithmetic operators by negating the
/// inner left child: `-(a + b)` becomes `(-a) - b`, `-(a - b)` becomes
/// `(-a) + b`, and for `*` and `/` the minus simply moves onto `a`.
fn push_negation(node: &Expr) -> Option<Expr> {
    let Expr::Unary(UnaryKind::Negate, operand) = node else {
        return None;
    };
    let Expr::Binary(kind, a, b) = operand.as_ref() else {
        return None;
    };
    let negated_left = match a.as_ref() {
        Expr::Const(v) => Expr::Const(-v),
        other => other.clone().neg(),
    };
    match kind {
        BinaryKind::Add => Some(Expr::binary(
            BinaryKind::Sub,
            negated_left,
            (**b).clone(),
        )),
        BinaryKind::Sub => Some(Expr::binary(
            BinaryKind::Add,
            negated_left,
            (**b).clone(),
        )),
        BinaryKind::Mul | BinaryKind::Div => {
            Some(Expr::binary(*kind, negated_left, (**b).clone()))
        }
        _ => None,
    }
}

/// Merge rules for an addition with one constant side and one inner
/// additive chain.
fn peak_add(lnode: &Expr, rnode: &Expr) -> Option<Expr> {
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            // (2 + x) + 5 => 7 + x || (2 - x) + 5 => 7 - x
            if let Expr::Const(av) = a.as_ref() {
                let nv = av + c;
                if nv == 0.0 {
                    return Some(if *ik == BinaryKind::Sub {
                        (**b).clone().neg()
                    } else {
                        (**b).clone()
                    });
                }
                return Some(Expr::binary(*ik, Expr::Const(nv), (**b).clone()));
            }
            // (x + 2) + 5 => x + 7 || (x - 2) + 5 => x + 3
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Sub { c - bv } else { bv + c };
                if nv == 0.0 {
                    return Some((**a).clone());
                }
                if nv > 0.0 {
                    return Some(Expr::binary(BinaryKind::Add, (**a).clone(), Expr::Const(nv)));
                }
                return Some(Expr::binary(BinaryKind::Sub, (**a).clone(), Expr::Const(-nv)));
            }
        }
    }

    if let (Expr::Const(c), Expr::Binary(ik, a, b)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            // 5 + (2 + x) => 7 + x || 5 + (2 - x) => 7 - x
            if let Expr::Const(av) = a.as_ref() {
                let nv = av + c;
                if nv == 0.0 {
                    return Some(if *ik == BinaryKind::Sub {
                        (**b).clone().neg()
                    } else {
                        (**b).clone()
                    });
                }
                return Some(Expr::binary(*ik, Expr::Const(nv), (**b).clone()));
            }
            // 5 + (x + 2) => x + 7 || 5 + (x - 2) => x + 3
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Sub { c - bv } else { bv + c };
                if nv == 0.0 {
                    return Some((**a).clone());
                }
                if nv > 0.0 {
                    return Some(Expr::binary(BinaryKind::Add, (**a).clone(), Expr::Const(nv)));
                }
                return Some(Expr::binary(BinaryKind::Sub, (**a).clone(), Expr::Const(-nv)));
            }
        }
    }

    None
}

/// Merge rules for a subtraction with one constant side and one inner
/// additive chain.
fn peak_sub(lnode: &Expr, rnode: &Expr) -> Option<Expr> {
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            // (2 + x) - 5 => x - 3 || (2 - x) - 5 => -x - 3
            if let Expr::Const(av) = a.as_ref() {
                let nv = av - c;
                let nr = if *ik == BinaryKind::Sub {
                    (**b).clone().neg()
                } else {
                    (**b).clone()
                };
                if nv == 0.0 {
                    return Some(nr);
                }
                if nv > 0.0 {
                    return Some(Expr::binary(BinaryKind::Add, Expr::Const(nv), nr));
                }
                return Some(Expr::binary(BinaryKind::Sub, nr, Expr::Const(-nv)));
            }
            // (x + 2) - 5 => x - 3 || (x - 2) - 5 => x - 7
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Sub { -bv - c } else { bv - c };
                if nv == 0.0 {
                    return Some((**a).clone());
                }
                if nv > 0.0 {
                    return Some(Expr::binary(BinaryKind::Add, (**a).clone(), Expr::Const(nv)));
                }
                return Some(Expr::binary(BinaryKind::Sub, (**a).clone(), Expr::Const(-nv)));
            }
        }
    }

    if let (Expr::Const(c), Expr::Binary(ik, a, b)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            // 5 - (2 + x) => 3 - x || 5 - (2 - x) => 3 + x
            if let Expr::Const(av) = a.as_ref() {
                let nv = c - av;
                if nv == 0.0 {
                    return Some(if *ik == BinaryKind::Sub {
                        (**b).clone()
                    } else {
                        (**b).clone().neg()
                    });
                }
                let nk = if *ik == BinaryKind::Sub {
                    BinaryKind::Add
                } else {
                    BinaryKind::Sub
                };
                return Some(Expr::binary(nk, Expr::Const(nv), (**b).clone()));
            }
            // 5 - (x + 2) => 3 - x || 5 - (x - 2) => 7 - x
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Sub { bv + c } else { c - bv };
                if nv == 0.0 {
                    return Some((**a).clone().neg());
                }
                return Some(Expr::binary(BinaryKind::Sub, Expr::Const(nv), (**a).clone()));
            }
        }
    }

    None
}

/// Merge rules for a multiplication with one constant side: combining with
/// an inner multiplicative chain, or distributing over an inner sum.
fn peak_mul(lnode: &Expr, rnode: &Expr) -> SymbolicResult<Option<Expr>> {
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Mul | BinaryKind::Div) {
            // (3 * x) * 2 => 6 * x || (3 / x) * 2 => 6 / x
            if let Expr::Const(av) = a.as_ref() {
                let nv = av * c;
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if *ik == BinaryKind::Mul {
                    if nv == 1.0 {
                        return Ok(Some((**b).clone()));
                    }
                    return Ok(Some(Expr::binary(
                        BinaryKind::Mul,
                        Expr::Const(nv),
                        (**b).clone(),
                    )));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Div,
                    Expr::Const(nv),
                    (**b).clone(),
                )));
            }
            // (x * 3) * 2 => 6 * x || (x / 3) * 2 => (2 / 3) * x
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Mul {
                    bv * c
                } else {
                    if *bv == 0.0 {
                        return Err(SymbolicError::DivisionByZero);
                    }
                    c / bv
                };
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if nv == 1.0 {
                    return Ok(Some((**a).clone()));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Mul,
                    Expr::Const(nv),
                    (**a).clone(),
                )));
            }
        }
    }

    if let (Expr::Const(c), Expr::Binary(ik, a, b)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Mul | BinaryKind::Div) {
            // 3 * (2 * x) => 6 * x || 3 * (2 / x) => 6 / x
            if let Expr::Const(av) = a.as_ref() {
                let nv = av * c;
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if *ik == BinaryKind::Mul {
                    if nv == 1.0 {
                        return Ok(Some((**b).clone()));
                    }
                    return Ok(Some(Expr::binary(
                        BinaryKind::Mul,
                        Expr::Const(nv),
                        (**b).clone(),
                    )));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Div,
                    Expr::Const(nv),
                    (**b).clone(),
                )));
            }
            // 3 * (x * 2) => 6 * x || 3 * (x / 2) => (3 / 2) * x
            if let Expr::Const(bv) = b.as_ref() {
                let nv = if *ik == BinaryKind::Mul {
                    bv * c
                } else {
                    if *bv == 0.0 {
                        return Err(SymbolicError::DivisionByZero);
                    }
                    c / bv
                };
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if nv == 1.0 {
                    return Ok(Some((**a).clone()));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Mul,
                    Expr::Const(nv),
                    (**a).clone(),
                )));
            }
        }
    }

    // (x + 5) * 3 => (3 * x) + 15
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            if *c == 0.0 {
                return Ok(Some(Expr::Const(0.0)));
            }
            let nl = distribute_factor(a, *c, BinaryKind::Mul);
            let nr = distribute_factor(b, *c, BinaryKind::Mul);
            return Ok(Some(Expr::binary(*ik, nl, nr)));
        }
    }

    // 3 * (x + 5) => (3 * x) + 15
    if let (Expr::Const(c), Expr::Binary(ik, a, b)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            if *c == 0.0 {
                return Ok(Some(Expr::Const(0.0)));
            }
            let nl = distribute_factor(a, *c, BinaryKind::Mul);
            let nr = distribute_factor(b, *c, BinaryKind::Mul);
            return Ok(Some(Expr::binary(*ik, nl, nr)));
        }
    }

    Ok(None)
}

/// Merge rules for a division with one constant side: combining with an
/// inner multiplicative chain, or distributing over an inner sum on the
/// numerator side.
fn peak_div(lnode: &Expr, rnode: &Expr) -> SymbolicResult<Option<Expr>> {
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Mul | BinaryKind::Div) {
            // (3 * x) / 5 => (3 / 5) * x || (3 / x) / 5 => (3 / 5) / x
            if let Expr::Const(av) = a.as_ref() {
                if *c == 0.0 {
                    return Err(SymbolicError::DivisionByZero);
                }
                let nv = av / c;
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if *ik == BinaryKind::Mul {
                    if nv == 1.0 {
                        return Ok(Some((**b).clone()));
                    }
                    return Ok(Some(Expr::binary(
                        BinaryKind::Mul,
                        Expr::Const(nv),
                        (**b).clone(),
                    )));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Div,
                    Expr::Const(nv),
                    (**b).clone(),
                )));
            }
            // (x * 3) / 5 => (3 / 5) * x || (x / 3) / 5 => x / 15
            if let Expr::Const(bv) = b.as_ref() {
                if *ik == BinaryKind::Mul {
                    if *c == 0.0 {
                        return Err(SymbolicError::DivisionByZero);
                    }
                    let nv = bv / c;
                    if nv == 0.0 {
                        return Ok(Some(Expr::Const(0.0)));
                    }
                    if nv == 1.0 {
                        return Ok(Some((**a).clone()));
                    }
                    return Ok(Some(Expr::binary(
                        BinaryKind::Mul,
                        Expr::Const(nv),
                        (**a).clone(),
                    )));
                }
                let nv = bv * c;
                if nv == 0.0 {
                    return Err(SymbolicError::DivisionByZero);
                }
                if nv == 1.0 {
                    return Ok(Some((**a).clone()));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Div,
                    (**a).clone(),
                    Expr::Const(nv),
                )));
            }
        }
    }

    if let (Expr::Const(c), Expr::Binary(ik, a, b)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Mul | BinaryKind::Div) {
            // 5 / (3 * x) => (5 / 3) / x || 5 / (3 / x) => (5 / 3) * x
            if let Expr::Const(av) = a.as_ref() {
                if *av == 0.0 {
                    return Err(SymbolicError::DivisionByZero);
                }
                let nv = c / av;
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                if *ik == BinaryKind::Mul {
                    return Ok(Some(Expr::binary(
                        BinaryKind::Div,
                        Expr::Const(nv),
                        (**b).clone(),
                    )));
                }
                if nv == 1.0 {
                    return Ok(Some((**b).clone()));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Mul,
                    Expr::Const(nv),
                    (**b).clone(),
                )));
            }
            // 5 / (x * 3) => (5 / 3) / x || 5 / (x / 3) => 15 / x
            if let Expr::Const(bv) = b.as_ref() {
                if *ik == BinaryKind::Mul {
                    if *bv == 0.0 {
                        return Err(SymbolicError::DivisionByZero);
                    }
                    let nv = c / bv;
                    if nv == 0.0 {
                        return Ok(Some(Expr::Const(0.0)));
                    }
                    return Ok(Some(Expr::binary(
                        BinaryKind::Div,
                        Expr::Const(nv),
                        (**a).clone(),
                    )));
                }
                let nv = c * bv;
                if nv == 0.0 {
                    return Ok(Some(Expr::Const(0.0)));
                }
                return Ok(Some(Expr::binary(
                    BinaryKind::Div,
                    Expr::Const(nv),
                    (**a).clone(),
                )));
            }
        }
    }

    // (x - 5) / 3 => (x / 3) - (5 / 3)
    if let (Expr::Binary(ik, a, b), Expr::Const(c)) = (lnode, rnode) {
        if matches!(ik, BinaryKind::Add | BinaryKind::Sub) {
            if *c == 0.0 {
                return Err(SymbolicError::DivisionByZero);
            }
            let nl = distribute_factor(a, *c, BinaryKind::Div);
            let nr = distribute_factor(b, *c, BinaryKind::Div);
            return Ok(Some(Expr::binary(*ik, nl, nr)));
        }
    }

    Ok(None)
}

/// One distributed child: a constant child merges with the factor
/// numerically, anything else gets an explicit operator node.
fn distribute_factor(child: &Expr, factor: f64, kind: BinaryKind) -> Expr {
    match (child, kind) {
        (Expr::Const(v), BinaryKind::Mul) => Expr::Const(v * factor),
        (Expr::Const(v), BinaryKind::Div) => Expr::Const(v / factor),
        (other, BinaryKind::Mul) => {
            Expr::binary(BinaryKind::Mul, Expr::Const(factor), other.clone())
        }
        (other, _) => Expr::binary(BinaryKind::Div, other.clone(), Expr::Const(factor)),
    }
}

fn is_zero_node(node: &Expr) -> bool {
    match node {
        Expr::Const(val) => *val == 0.0,
        Expr::Unary(UnaryKind::Negate, operand) => {
            matches!(operand.as_ref(), Expr::Const(val) if *val == 0.0)
        }
        _ => false,
    }
}

fn is_one_node(node: &Expr) -> bool {
    matches!(node, Expr::Const(val) if *val == 1.0)
}

fn is_neg_one_node(node: &Expr) -> bool {
    match node {
        Expr::Const(val) => *val == -1.0,
        Expr::Unary(UnaryKind::Negate, operand) => {
            matches!(operand.as_ref(), Expr::Const(val) if *val == 1.0)
        }
        _ => false,
    }
}

/// A bare variable or a negation of one, with its name and sign.
fn var_core(node: &Expr) -> Option<(&str, bool)> {
    match node {
        Expr::Var(name) => Some((name.as_str(), false)),
        Expr::Unary(UnaryKind::Negate, operand) => match operand.as_ref() {
            Expr::Var(name) => Some((name.as_str(), true)),
            _ => None,
        },
        _ => None,
    }
}

/// Both operands are the same variable with the same sign.
fn same_variable(lnode: &Expr, rnode: &Expr) -> bool {
    match (var_core(lnode), var_core(rnode)) {
        (Some((lname, lneg)), Some((rname, rneg))) => lname == rname && lneg == rneg,
        _ => false,
    }
}

fn const_or_var(node: &Expr) -> bool {
    const_value(node).is_some() || var_core(node).is_some()
}

/// Flattens a nested addition/subtraction chain into signed terms.
/// `A - B` contributes `A` with the current sign and `B` with the opposite
/// one; a negative sign materializes as a negation wrapper on the stored
/// term. Other operators are not gathered through.
fn gather_terms(node: &Expr, sign: i32, out: &mut Vec<Expr>) {
    match node {
        Expr::Binary(BinaryKind::Add, lhs, rhs) => {
            gather_terms(lhs, sign, out);
            gather_terms(rhs, sign, out);
        }
        Expr::Binary(BinaryKind::Sub, lhs, rhs) => {
            gather_terms(lhs, sign, out);
            gather_terms(rhs, -sign, out);
        }
        _ => out.push(if sign < 0 {
            node.clone().neg()
        } else {
            node.clone()
        }),
    }
}

/// A `Pow` node with a bare variable base: its name and exponent.
fn power_parts(node: &Expr) -> Option<(&str, &Expr)> {
    match node {
        Expr::Binary(BinaryKind::Pow, base, exponent) => match base.as_ref() {
            Expr::Var(name) => Some((name.as_str(), exponent.as_ref())),
            _ => None,
        },
        _ => None,
    }
}

/// Rebuilds `coeff * node`, folding coefficients 1 and -1 into the node
/// itself and carrying a negative coefficient as a negation wrapper.
fn scaled_term(node: Expr, coeff: f64) -> Expr {
    if coeff == 1.0 {
        node
    } else if coeff == -1.0 {
        node.neg()
    } else if coeff > 0.0 {
        Expr::binary(BinaryKind::Mul, Expr::Const(coeff), node)
    } else {
        Expr::binary(BinaryKind::Mul, Expr::Const(-coeff), node).neg()
    }
}

/// Collects the gathered terms of an addition chain into canonical order:
/// linear variable terms alphabetically, power terms by base then exponent
/// text, the combined constant, then uncollectable leftovers in their
/// original order. The rebuilt tree is a left-deep chain using subtraction
/// for negated terms; a fully cancelled chain yields the constant zero.
fn combine_terms(chain: &Expr) -> Expr {
    let Expr::Nary(NaryKind::Add, parts) = chain else {
        return chain.clone();
    };

    let mut coeffs: HashMap<String, f64> = HashMap::new();
    let mut powers: HashMap<(String, String), (Expr, f64)> = HashMap::new();
    let mut const_sum = 0.0;
    let mut leftovers: Vec<(Expr, f64)> = Vec::new();

    let mut add_power = |base: &str, exponent: &Expr, delta: f64| {
        let entry = powers
            .entry((base.to_string(), exponent.to_string()))
            .or_insert_with(|| (exponent.clone(), 0.0));
        entry.1 += delta;
    };

    for part in parts {
        let (node, sign) = match part {
            Expr::Unary(UnaryKind::Negate, operand) => (operand.as_ref(), -1.0),
            other => (other, 1.0),
        };

        match node {
            Expr::Const(val) => const_sum += sign * val,
            Expr::Var(name) => *coeffs.entry(name.clone()).or_insert(0.0) += sign,
            Expr::Binary(BinaryKind::Mul, lhs, rhs) => {
                let lconst = const_value(lhs);
                let rconst = const_value(rhs);

                // linear terms (k * x) or (x * k)
                if let (Some(c), Expr::Var(name)) = (lconst, rhs.as_ref()) {
                    *coeffs.entry(name.clone()).or_insert(0.0) += sign * c;
                } else if let (Some(c), Expr::Var(name)) = (rconst, lhs.as_ref()) {
                    *coeffs.entry(name.clone()).or_insert(0.0) += sign * c;
                // simple powers (k * x^n)
                } else if let (Some(c), Some((base, exponent))) = (lconst, power_parts(rhs)) {
                    add_power(base, exponent, sign * c);
                } else if let (Some(c), Some((base, exponent))) = (rconst, power_parts(lhs)) {
                    add_power(base, exponent, sign * c);
                } else {
                    leftovers.push((node.clone(), sign));
                }
            }
            other => {
                // a bare power counts with coefficient 1, like a bare variable
                if let Some((base, exponent)) = power_parts(other) {
                    add_power(base, exponent, sign);
                } else {
                    leftovers.push((other.clone(), sign));
                }
            }
        }
    }

    let mut out_terms: Vec<Expr> = Vec::new();

    // (a) plain variables, alphabetically
    for name in coeffs.keys().sorted() {
        let c = coeffs[name];
        if c == 0.0 {
            continue;
        }
        out_terms.push(scaled_term(Expr::Var(name.clone()), c));
    }

    // (b) powers, alphabetical by base then exponent
    for key in powers.keys().sorted() {
        let (exponent, c) = &powers[key];
        if *c == 0.0 {
            continue;
        }
        let power_node = Expr::binary(
            BinaryKind::Pow,
            Expr::Var(key.0.clone()),
            exponent.clone(),
        );
        out_terms.push(scaled_term(power_node, *c));
    }

    // (c) the combined constant
    if const_sum != 0.0 {
        out_terms.push(if const_sum > 0.0 {
            Expr::Const(const_sum)
        } else {
            Expr::Const(-const_sum).neg()
        });
    }

    // (d) leftovers in original order
    for (node, sign) in leftovers {
        out_terms.push(if sign < 0.0 { node.neg() } else { node });
    }

    // chain back into a left-deep tree, negated terms via subtraction;
    // a fully cancelled chain is just zero
    let mut terms = out_terms.into_iter();
    let Some(mut result) = terms.next() else {
        return Expr::Const(0.0);
    };
    for term in terms {
        result = match term {
            Expr::Unary(UnaryKind::Negate, inner) => {
                Expr::Binary(BinaryKind::Sub, result.boxed(), inner)
            }
            other => Expr::binary(BinaryKind::Add, result, other),
        };
    }
    result
}
