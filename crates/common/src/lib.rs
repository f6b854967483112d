//! Common types, protocol definitions, and errors shared across `ciphra` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
