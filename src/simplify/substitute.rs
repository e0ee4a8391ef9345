use crate::expr::{Expr, Kind};

/// Substitute symbol `var` with `replacement` throughout `expr`.
///
/// Subtrees that do not mention `var` are shared with `expr`, not copied. The
/// result is not reduced.
pub fn substitute(expr: &Expr, var: &str, replacement: &Expr) -> Expr {
    match expr.kind() {
        Kind::Symbol if expr.identifier() == var => replacement.clone(),
        kind if kind.is_terminal() => expr.clone(),
        _ => expr
            .clone()
            .map_operands(|child| substitute(&child, var, replacement)),
    }
}
