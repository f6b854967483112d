//! Cipher suite composition and scoring.
//!
//! A suite is one catalog id per [`Category`]. [`SuiteSelector`] owns and
//! validates the selection, [`score`] derives a [`CompositeScore`] from it, and
//! [`build_export_record`] snapshots both into a downloadable [`ExportRecord`].
//!
//! # Invariants
//!
//! - Every id stored by a [`SuiteSelector`] resolves in its category's catalog.
//! - Scoring never fails; unresolvable ids contribute a strength of 0.
//! - Forward secrecy is reported from the key-exchange entry alone.

pub mod catalog;
pub mod export;
pub mod score;
pub mod selector;

pub use catalog::{CatalogEntry, Category};
pub use export::{build_export_record, ExportRecord};
pub use score::{score, CompositeScore, Label, ScoreTier};
pub use selector::{SelectionState, SuiteSelector};

use thiserror::Error;

/// Errors produced by the suite layer.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The id is not present in the catalog for the named category.
    #[error("unknown {category} id: {id}")]
    UnknownCatalogId { category: Category, id: String },
}
