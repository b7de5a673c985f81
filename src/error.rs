//! Error types for the provisioner
//!
//! Only fatal conditions live here. Individual statement failures during
//! cleanup, schema creation and seeding are recorded as
//! [`crate::report::StatementOutcome`] values instead of being raised.

use thiserror::Error;

/// Fatal provisioning errors
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Transaction error during {phase}: {source}")]
    Transaction {
        phase: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Verification query failed for table {table}: {source}")]
    Verify {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Atomic run rolled back: {failed} statement(s) failed")]
    AtomicRollback { failed: usize },

    #[error("Template '{name}' not found or inactive")]
    TemplateNotFound { name: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProvisionError {
    pub(crate) fn transaction(phase: impl std::fmt::Display, source: sqlx::Error) -> Self {
        ProvisionError::Transaction {
            phase: phase.to_string(),
            source,
        }
    }
}

/// Result alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;
