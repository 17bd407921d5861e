//! Error types for the migration pipeline.

use storefix_rest::RestError;
use thiserror::Error;

/// Why a selector could not produce a target shop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// No shop satisfied any tier of the predicate chain.
    #[error("no suitable record ({criteria})")]
    NotFound { criteria: String },

    /// Positional selection over an empty collection.
    #[error("collection is empty, expected exactly one shop")]
    EmptyCollection,

    /// Positional selection over a collection holding several tenants.
    #[error("collection holds {count} shops, expected exactly one")]
    AmbiguousTenant { count: usize },
}

/// Errors that abort a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The store could not be reached or answered with an error.
    #[error("transport error: {0}")]
    Transport(#[from] RestError),

    /// Selection failed in a way that is fatal for this migration.
    #[error(transparent)]
    Select(#[from] SelectError),

    /// No migration registered under this name.
    #[error("unknown migration: {0}")]
    UnknownMigration(String),
}
