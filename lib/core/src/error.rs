//! Error handling foundation for parley.
//!
//! Only the `Result` alias lives here. Each crate owns its domain error
//! enum and wraps it in a rootcause `Report` at its public boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
