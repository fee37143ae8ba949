//! parley HTTP relay.
//!
//! Exposes the conversation service over three JSON endpoints:
//!
//! - `POST /chat`: submit a user message and receive the assistant reply
//! - `POST /clear`: empty the conversation history
//! - `GET /health`: report history length and window size

pub mod config;
pub mod error;
pub mod routes;

pub use routes::{AppState, router};
