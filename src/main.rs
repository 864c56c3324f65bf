#![allow(non_snake_case)]
use RustedCAS::symbolic::symbolic_engine::Expr;
use RustedCAS::symbolic::symbolic_solver::Equation;
use log::{error, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    // SIMPLIFICATION
    // parse expressions from strings and rewrite them into canonical form
    let expressions = [
        "(2 + x) + 5",
        "5 + (x - 2)",
        "3 - (x + 2)",
        "3 * (x * 2)",
        "(x / 3) * 2",
        "0 + x",
        "x - x",
        "x * x",
        "x / x",
        "x ^ 0",
        "8 * x + 5 * y ^ 2 - 4 * y ^ 2 + 6 * x",
    ];
    for input in expressions {
        let parsed = Expr::parse_expression(input).unwrap();
        match parsed.simplify() {
            Ok(simplified) => info!("{} simplifies to {}", input, simplified),
            Err(e) => error!("{} failed to simplify: {}", input, e),
        }
    }

    // EVALUATION
    let expr = Expr::parse_expression("2 * x ^ 2 - 3 * x + 1").unwrap();
    let value = expr.eval("x", 2.0).unwrap();
    info!("{} at x = 2 evaluates to {}", expr, value);
    info!("postorder walk: {:?}", expr.tree_to_array());

    // EQUATION SOLVING
    let equations = [
        "6 * x + 7 = 2 * x + 5",
        "x ^ 2 = 9",
        "2 ^ x = 8",
        "log(x) = 2",
        "x = x",
        "y + 1 = y",
    ];
    for input in equations {
        let equation = Equation::parse(input).unwrap();
        match equation.solve_for("x") {
            Ok(solution) => info!("{} solved for x: {}", equation, solution),
            Err(e) => error!("{} failed to solve: {}", equation, e),
        }
    }
}
