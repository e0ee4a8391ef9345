//! Canonical ordering, reduction, expansion and substitution.

pub mod constant;
mod expand;
mod merge;
pub mod order;
mod reduce;
mod sort;
mod substitute;

pub use expand::{EXPAND_EXPONENT_LIMIT, expand};
pub use merge::{merge_product, merge_sum};
pub use order::{Context, compare, same_base, same_term};
pub use reduce::reduce;
pub use sort::{is_sorted, sort};
pub use substitute::substitute;
