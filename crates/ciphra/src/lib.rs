//! Cipher suite scoring and an AES-256-GCM encryption demo.
//!
//! - [`suite`]: compose a suite from three catalogs, score it, export it.
//! - [`session`]: hold a symmetric key and run authenticated encrypt/decrypt.
//! - [`server`]: thin HTTP surface exposing both per demo session.

pub mod config;
pub mod crypto;
pub mod server;
pub mod session;
pub mod suite;
pub mod telemetry;
