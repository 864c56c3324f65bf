//! a module turns a String expression or equation into a symbolic one
//!
//! Tokenizes the input and runs a recursive-descent grammar over it.
//! Precedence, low to high: relation operators, additive `+ -`,
//! multiplicative `* /` and `mod`, unary `-` and `|...|`, power `^`
//! (right-associative), then primaries (numbers, identifiers, function
//! calls, parenthesized groups).
//!
//! After a complete parse every top-level expression (and each side of an
//! equation) is checked for polynomial shape and wrapped when it qualifies.
//!
//!# Example
//! ```
//! use RustedCAS::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("(2 + x) + 5").unwrap();
//! assert_eq!(parsed_expression.simplify().unwrap().to_string(), "(x + 7)");
//! ```

use crate::symbolic::symbolic_engine::{BinaryKind, Expr};
use crate::symbolic::symbolic_errors::{SymbolicError, SymbolicResult};
use crate::symbolic::symbolic_solver::{Equation, Relation};

/// Lexical tokens of the expression language.
#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Pipe,
    Rel(Relation),
}

/// A successfully parsed input: either a bare expression or an equation
/// with a relation operator.
#[derive(Clone, Debug, PartialEq)]
pub enum Parsed {
    Expression(Expr),
    Equation(Equation),
}

fn tokenize(input: &str) -> SymbolicResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal.parse::<f64>().map_err(|_| {
                    SymbolicError::Syntax(format!("invalid number literal '{}'", literal))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphabetic() {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // the keyword 'mod' is the modulus operator, not a name
                if ident.eq_ignore_ascii_case("mod") {
                    tokens.push(Token::Percent);
                } else {
                    tokens.push(Token::Ident(ident));
                }
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Rel(Relation::Equals));
            }
            '≠' => {
                chars.next();
                tokens.push(Token::Rel(Relation::NotEquals));
            }
            '≥' => {
                chars.next();
                tokens.push(Token::Rel(Relation::GreaterEq));
            }
            '≤' => {
                chars.next();
                tokens.push(Token::Rel(Relation::LessEq));
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Rel(Relation::GreaterEq));
                } else {
                    tokens.push(Token::Rel(Relation::Greater));
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Rel(Relation::LessEq));
                } else {
                    tokens.push(Token::Rel(Relation::Less));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Rel(Relation::NotEquals));
                } else {
                    return Err(SymbolicError::Syntax(
                        "expected '=' after '!'".to_string(),
                    ));
                }
            }
            other => {
                return Err(SymbolicError::Syntax(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }

    Ok(tokens)
}

/// Maps a function-call identifier to its unary operator.
fn unary_function(name: &str, arg: Expr) -> SymbolicResult<Expr> {
    match name.to_ascii_lowercase().as_str() {
        "log" | "ln" => Ok(arg.ln()),
        "exp" => Ok(arg.exp()),
        "abs" => Ok(arg.abs()),
        _ => Err(SymbolicError::Syntax(format!("unknown function '{}'", name))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> SymbolicResult<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(SymbolicError::Syntax(format!(
                "expected {}, got {:?}",
                what, token
            ))),
            None => Err(SymbolicError::Syntax(format!(
                "expected {}, got end of input",
                what
            ))),
        }
    }

    // -------- primary --------
    fn primary(&mut self) -> SymbolicResult<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::Ident(id)) => {
                // function call: log(x), exp(x), ...
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    let arg = self.additive()?;
                    self.expect(Token::RParen, "')'")?;
                    return unary_function(&id, arg);
                }
                Ok(Expr::Var(id))
            }
            Some(Token::LParen) => {
                let inner = self.additive()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(token) => Err(SymbolicError::Syntax(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(SymbolicError::Syntax("unexpected end of input".to_string())),
        }
    }

    // -------- exponent (right-associative) --------
    fn exponent(&mut self) -> SymbolicResult<Expr> {
        let left = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.advance();
            let right = self.exponent()?;
            return Ok(Expr::binary(BinaryKind::Pow, left, right));
        }
        Ok(left)
    }

    // -------- unary minus and absolute value --------
    fn unary(&mut self) -> SymbolicResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(self.unary()?.neg())
            }
            Some(Token::Pipe) => {
                self.advance();
                let inner = self.additive()?;
                match self.advance() {
                    Some(Token::Pipe) => Ok(inner.abs()),
                    _ => Err(SymbolicError::Syntax("missing closing '|'".to_string())),
                }
            }
            _ => self.exponent(),
        }
    }

    // -------- * / mod ----------
    fn multiplicative(&mut self) -> SymbolicResult<Expr> {
        let mut node = self.unary()?;
        loop {
            let kind = match self.peek() {
                Some(Token::Star) => BinaryKind::Mul,
                Some(Token::Slash) => BinaryKind::Div,
                Some(Token::Percent) => BinaryKind::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            node = Expr::binary(kind, node, rhs);
        }
        Ok(node)
    }

    // -------- + - ----------
    fn additive(&mut self) -> SymbolicResult<Expr> {
        let mut node = self.multiplicative()?;
        loop {
            let kind = match self.peek() {
                Some(Token::Plus) => BinaryKind::Add,
                Some(Token::Minus) => BinaryKind::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplicative()?;
            node = Expr::binary(kind, node, rhs);
        }
        Ok(node)
    }

    // -------- relations (lowest precedence) --------
    fn comparison(&mut self) -> SymbolicResult<Parsed> {
        let left = self.additive()?;
        if let Some(Token::Rel(relation)) = self.peek().cloned() {
            self.advance();
            let right = self.additive()?;
            // wrap polynomial sides after both are parsed
            let left = wrap_if_polynomial(left)?;
            let right = wrap_if_polynomial(right)?;
            return Ok(Parsed::Equation(Equation::with_relation(
                left, right, relation,
            )));
        }
        Ok(Parsed::Expression(wrap_if_polynomial(left)?))
    }
}

/// Checks whether the tree is polynomial-shaped: only constant leaves and a
/// single consistently named variable, operators drawn from `+ - *` and
/// `mod`, or a power of the variable with a non-negative integer constant
/// exponent.
fn poly_check<'a>(node: &'a Expr, var: &mut Option<&'a str>) -> bool {
    match node {
        Expr::Const(_) => true,
        Expr::Var(name) => match var {
            None => {
                *var = Some(name.as_str());
                true
            }
            Some(existing) => *existing == name.as_str(),
        },
        Expr::Binary(
            BinaryKind::Add | BinaryKind::Sub | BinaryKind::Mul | BinaryKind::Mod,
            lhs,
            rhs,
        ) => poly_check(lhs, var) && poly_check(rhs, var),
        Expr::Binary(BinaryKind::Pow, base, exponent) => {
            let exponent_ok = matches!(
                exponent.as_ref(),
                Expr::Const(val) if val.fract() == 0.0 && *val >= 0.0
            );
            exponent_ok
                && matches!(base.as_ref(), Expr::Var(_))
                && poly_check(base, var)
        }
        _ => false,
    }
}

/// Tags the expression as `Poly` when it qualifies and actually mentions a
/// variable; everything else passes through untouched.
fn wrap_if_polynomial(expr: Expr) -> SymbolicResult<Expr> {
    let mut var = None;
    if poly_check(&expr, &mut var) {
        if let Some(name) = var {
            let variable = name.to_string();
            return Expr::polynomial(expr, &variable);
        }
    }
    Ok(expr)
}

/// Parses an expression or an equation from source text.
///
/// Fails with a `Syntax` error on an unexpected token, a missing delimiter
/// or trailing tokens after a complete parse.
pub fn parse(input: &str) -> SymbolicResult<Parsed> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let parsed = parser.comparison()?;
    if parser.pos < parser.tokens.len() {
        return Err(SymbolicError::Syntax(format!(
            "unexpected tokens remaining: {:?}",
            &parser.tokens[parser.pos..]
        )));
    }
    Ok(parsed)
}

impl Expr {
    /// Parses source text that must be a bare expression.
    pub fn parse_expression(input: &str) -> SymbolicResult<Expr> {
        match parse(input)? {
            Parsed::Expression(expr) => Ok(expr),
            Parsed::Equation(_) => Err(SymbolicError::Syntax(
                "expected an expression, found an equation".to_string(),
            )),
        }
    }
}

impl Equation {
    /// Parses source text that must contain a relation operator.
    pub fn parse(input: &str) -> SymbolicResult<Equation> {
        match parse(input)? {
            Parsed::Equation(equation) => Ok(equation),
            Parsed::Expression(_) => Err(SymbolicError::Syntax(
                "expected an equation with a relation operator".to_string(),
            )),
        }
    }
}
