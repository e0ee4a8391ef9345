//! Shared, canonical expression trees with exact arithmetic: ordering of
//! commutative operands, reduction to a normal form and expansion of products
//! and integer powers of sums.

pub mod error;
pub mod expr;
pub mod format;
pub mod operands;
pub mod parser;
pub mod prelude;
pub mod simplify;
pub mod ui;

pub use error::{CasError, Result};
pub use expr::{Expr, Kind, Rational, add, div, frac, int, mul, one, pow, sub, sym, zero};
pub use format::{debug_dump, pretty};
pub use operands::{OPERAND_MARGIN, Operands};
pub use parser::parse_expr;
pub use simplify::{
    Context, EXPAND_EXPONENT_LIMIT, compare, expand, merge_product, merge_sum, reduce, sort,
    substitute,
};
