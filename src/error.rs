//! Error types for the PCD collection.

use thiserror::Error;

/// Errors raised by the collection, its package registry and its codec.
///
/// Authorization denials are deliberately absent: the permission engine
/// reports them as `false`.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("pcd with id {0} is already in this collection")]
    DuplicateId(String),

    #[error("no package matching {0}")]
    MissingPackage(String),

    #[error("malformed {pcd_type} pcd: {reason}")]
    MalformedRecord { pcd_type: String, reason: String },

    #[error("pcd {0} doesn't exist")]
    RecordNotFound(String),

    #[error("pcd with {id} already exists outside folder {folder}")]
    OutsideFolder { id: String, folder: String },

    #[error("package {0} is registered more than once")]
    DuplicatePackage(String),

    #[error("invalid serialized collection: {0}")]
    InvalidCollection(#[from] serde_json::Error),

    #[error("cannot verify {pcd_type} pcd: {reason}")]
    Verification { pcd_type: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CollectionError {
    /// Shorthand used by package implementations rejecting a payload.
    pub fn malformed(pcd_type: impl Into<String>, reason: impl ToString) -> Self {
        CollectionError::MalformedRecord {
            pcd_type: pcd_type.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<config::ConfigError> for CollectionError {
    fn from(err: config::ConfigError) -> Self {
        CollectionError::ConfigError(err.to_string())
    }
}
