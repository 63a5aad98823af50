//! Error types for the person service.
//!
//! This module defines the central `Error` enum shared by the store and the
//! gRPC handlers. It implements `From<Error>` for `tonic::Status` so handlers
//! can propagate failures with `?` and clients receive an appropriate status
//! code.
//!
//! Absence is not an error: lookups, updates and deletes of unknown ids are
//! reported through `Option`/`bool` results, never through this type.
//!
//! ## Error Cases
//! - `InvalidName`: A create or update carried an empty or whitespace-only
//!   name.
//! - `Storage`: The relational engine failed (unreachable, constraint
//!   violation, closed pool).
//! - `ServiceShutdown`: A request arrived while the service was shutting down.

use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the person service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The supplied name was empty or contained only whitespace.
    #[error("Invalid name: {name:?} must contain at least one non-whitespace character")]
    InvalidName { name: String },

    /// The underlying database operation failed.
    #[error("Storage error: {context}")]
    Storage { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidName { .. } => Status::invalid_argument(err.to_string()),
            Error::Storage { context } => Status::internal(format!("Storage error: {}", context)),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn invalid_name_maps_to_invalid_argument() {
        let status = Status::from(Error::InvalidName {
            name: "  ".to_string(),
        });
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("non-whitespace"));
    }

    #[test]
    fn storage_maps_to_internal() {
        let status = Status::from(Error::Storage {
            context: "pool closed".to_string(),
        });
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "Storage error: pool closed");
    }

    #[test]
    fn shutdown_maps_to_unavailable() {
        let status = Status::from(Error::ServiceShutdown);
        assert_eq!(status.code(), Code::Unavailable);
    }
}
