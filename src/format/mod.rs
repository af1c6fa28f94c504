//! Formatting helpers for rendering expressions as ASCII and LaTeX.

pub mod expr;
pub mod tex;

pub use expr::{pretty, show_float, show_rational};
pub use tex::to_tex;
