use crate::expr::{Expr, Kind};

/// Structural dump: one `<ast>` line per node with its reference count and
/// address, children indented by three spaces.
pub fn debug_dump(expr: &Expr) -> String {
    let mut out = String::new();
    dump(expr, 0, &mut out);
    out
}

fn dump(expr: &Expr, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    let detail = match expr.kind() {
        Kind::Integer => format!(" value=\"{}\"", expr.value()),
        Kind::Symbol | Kind::FunctionCall => format!(" id=\"{}\"", expr.identifier()),
        _ => String::new(),
    };
    out.push_str(&format!(
        "{pad}<ast ref_count=\"{}\" address=\"{:p}\" kind=\"{}\"{detail}",
        expr.ref_count(),
        expr.address(),
        expr.kind().label(),
    ));
    if expr.size() == 0 {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in expr.operands() {
        dump(child, indent + 3, out);
    }
    out.push_str(&format!("{pad}</ast>\n"));
}
