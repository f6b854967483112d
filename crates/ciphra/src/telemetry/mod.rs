//! Structured logging, with OpenTelemetry span export when a collector is configured.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, or ciphertext** may appear in any span
//!   attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`) and
//!   overridable with `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
