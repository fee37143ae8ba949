//! Core types shared across the parley workspace.
//!
//! This crate provides the `Result` alias used for layered error reporting
//! and the identifiers that tie log output for a single exchange together.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::ExchangeId;
