use crate::expr::{Expr, Kind};

pub fn pretty(expr: &Expr) -> String {
    fn pp(ctx: u8, expr: &Expr) -> String {
        match expr.kind() {
            Kind::Integer => {
                let body = expr.value().to_string();
                if expr.is_negative_constant() {
                    bracket(ctx, 2, body)
                } else {
                    body
                }
            }
            Kind::Fraction => bracket(
                ctx,
                2,
                format!("{}/{}", expr.operand(0).value(), expr.operand(1).value()),
            ),
            Kind::Symbol => expr.identifier().to_string(),
            Kind::Infinity => "inf".into(),
            Kind::NegativeInfinity => bracket(ctx, 2, "-inf".into()),
            Kind::Undefined => "undefined".into(),
            Kind::Fail => "fail".into(),

            Kind::Sum => bracket(ctx, 1, join(expr.operands(), 1, " + ")),

            Kind::Subtraction => {
                let body = expr
                    .operands()
                    .iter()
                    .enumerate()
                    .map(|(i, e)| pp(if i == 0 { 1 } else { 2 }, e))
                    .collect::<Vec<_>>()
                    .join(" - ");
                bracket(ctx, 1, body)
            }

            Kind::Product => bracket(ctx, 2, join(expr.operands(), 2, "*")),

            Kind::Division => bracket(
                ctx,
                2,
                format!("{} / {}", pp(2, expr.operand(0)), pp(3, expr.operand(1))),
            ),

            Kind::Power => bracket(
                ctx,
                3,
                format!("{}^{}", pp(4, expr.operand(0)), pp(3, expr.operand(1))),
            ),

            Kind::Factorial => format!("{}!", pp(4, expr.operand(0))),
            Kind::SquareRoot => format!("sqrt({})", pp(0, expr.operand(0))),
            Kind::FunctionCall => {
                format!("{}({})", expr.identifier(), join(expr.operands(), 0, ", "))
            }
        }
    }

    fn join(items: &[Expr], ctx: u8, sep: &str) -> String {
        items
            .iter()
            .map(|e| pp(ctx, e))
            .collect::<Vec<_>>()
            .join(sep)
    }

    pp(0, expr)
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, div, frac, int, mul, pow, sub, sym};

    #[test]
    fn precedence_drives_parentheses() {
        let (x, y) = (sym("x"), sym("y"));
        assert_eq!(pretty(&mul(vec![int(2), add(vec![x.clone(), y.clone()])])), "2*(x + y)");
        assert_eq!(pretty(&pow(add(vec![x.clone(), int(1)]), int(2))), "(x + 1)^2");
        assert_eq!(pretty(&pow(x.clone(), frac(1, 2))), "x^(1/2)");
        assert_eq!(pretty(&pow(int(-3), int(2))), "(-3)^2");
        assert_eq!(pretty(&pow(pow(x.clone(), y.clone()), int(2))), "(x^y)^2");
        assert_eq!(pretty(&pow(x.clone(), pow(y.clone(), int(2)))), "x^y^2");
    }

    #[test]
    fn subtraction_and_division_bracket_their_right_operands() {
        let (a, b, c) = (sym("a"), sym("b"), sym("c"));
        assert_eq!(pretty(&sub(vec![a.clone(), add(vec![b.clone(), c.clone()])])), "a - (b + c)");
        assert_eq!(pretty(&div(a.clone(), mul(vec![b.clone(), c.clone()]))), "a / (b*c)");
        assert_eq!(pretty(&div(add(vec![a, b]), c)), "(a + b) / c");
    }

    #[test]
    fn special_forms() {
        let x = sym("x");
        assert_eq!(pretty(&Expr::factorial(add(vec![x.clone(), int(1)]))), "(x + 1)!");
        assert_eq!(pretty(&Expr::sqrt(add(vec![x.clone(), int(1)]))), "sqrt(x + 1)");
        assert_eq!(pretty(&Expr::call("f", vec![x.clone(), int(2)])), "f(x, 2)");
        assert_eq!(pretty(&Expr::undefined()), "undefined");
        assert_eq!(pretty(&Expr::fail()), "fail");
        assert_eq!(pretty(&Expr::infinity()), "inf");
        assert_eq!(pretty(&Expr::negative_infinity()), "-inf");
    }
}
