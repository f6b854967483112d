//! Axum HTTP surface over the suite selector and encryption session.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Own the registry of live demo sessions (`AppState`).
//! - Translate core errors into `{code, message}` JSON bodies.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
