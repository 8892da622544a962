//! Pull request comment generation.

pub mod comparison;

pub use comparison::*;
