//! Formatting helpers for rendering expressions.

pub mod debug;
pub mod expr;

pub use debug::debug_dump;
pub use expr::pretty;
