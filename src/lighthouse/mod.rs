//! Lighthouse CI run handling.
//!
//! Loads the runs saved by Lighthouse CI and selects the representative
//! run for each audited URL.

pub mod representative;
pub mod saved_reports;

pub use representative::*;
pub use saved_reports::*;
