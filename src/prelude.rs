//! String-based convenience API for quick experimentation.

pub use crate::ui::{dump, expand, expd, parse, red, reduce};
